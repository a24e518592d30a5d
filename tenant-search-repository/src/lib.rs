//! # Tenant Search Repository
//!
//! Index lifecycle and query translation engine of the tenant search façade.
//! It maps tenant-scoped logical indices onto aliased backend index
//! generations, compiles structured search requests, settings and batches
//! into backend calls, and classifies backend failures into domain errors.
//! A concrete backend client for OpenSearch is included.

pub mod batch;
pub mod config;
pub mod errors;
pub mod interfaces;
pub mod lifecycle;
pub mod naming;
pub mod opensearch;
pub mod query;
pub mod service;
pub mod settings;
pub mod types;

pub use config::TenantSearchConfig;
pub use errors::{BackendError, DomainError, NotFoundKind, SearchFacadeError};
pub use interfaces::BackendClient;
pub use lifecycle::IndexLifecycle;
pub use opensearch::OpenSearchClient;
pub use service::{TenantIndex, TenantSearchService};
pub use types::{AliasAction, DocumentWriteResult, IndexStats, SearchOptions, StoredDocument};
