//! # Tenant Search Shared
//!
//! This crate defines the caller-facing data structures of the tenant search
//! façade: structured search requests, index settings, batch requests and the
//! results handed back to callers. They carry no backend-specific shape; the
//! repository crate compiles them into OpenSearch requests.

pub mod types;

pub use types::batch::{BatchRequest, BatchResult};
pub use types::error::RequestValidationError;
pub use types::indexed_object::{IndexedObject, OBJECT_ID_FIELD};
pub use types::search_request::{FilterSpec, SearchRequest, SortDirection, SortSpec};
pub use types::search_result::{FacetResult, FacetValue, QueryResult};
pub use types::settings::{FacetOrder, FacetSpec, SettingsSpec};
