//! Error types for the tenant search repository.
//!
//! This module provides the raw backend error, the unified engine error and
//! the classifier that maps one onto the other.

mod backend_error;
mod classifier;
mod search_facade_error;

pub use backend_error::BackendError;
pub use classifier::{classify, classify_backend_error, Classification};
pub use search_facade_error::{BulkItemFailure, DomainError, NotFoundKind, SearchFacadeError};
