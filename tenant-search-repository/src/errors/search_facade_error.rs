//! Unified engine error type.
//!
//! `IndexNotFound` and `ObjectNotFound` are catalogued outcomes callers branch
//! on; every other variant is fatal to the operation and is surfaced as-is.

use serde::Serialize;
use tenant_search_shared::RequestValidationError;
use thiserror::Error;

use crate::errors::BackendError;

/// Unified errors from tenant search operations.
#[derive(Debug, Clone, Error)]
pub enum SearchFacadeError {
    /// The alias for the logical index does not exist.
    #[error("Index not found: {index}")]
    IndexNotFound { index: String },

    /// The document id is absent within an existing index.
    #[error("Object not found: {object_id} in index {index}")]
    ObjectNotFound { index: String, object_id: String },

    /// Backend failure that matched no catalogued kind.
    #[error(transparent)]
    Unclassified(#[from] BackendError),

    /// Some items of an otherwise successful bulk call were rejected.
    #[error("Bulk operation had {} failed item(s)", .failures.len())]
    BulkItemFailures { failures: Vec<BulkItemFailure> },

    /// Invalid caller input.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Failed to establish connection to the search backend.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Failed to interpret a backend response.
    #[error("Parse error: {0}")]
    ParseError(String),
}

/// A rejected item within a bulk response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkItemFailure {
    /// Position of the item in the submitted bulk payload.
    pub position: usize,
    pub action: String,
    pub status: u16,
    pub reason: String,
}

/// Catalogued not-found kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NotFoundKind {
    IndexNotFound,
    ObjectNotFound,
}

/// Tagged domain error exposed to the surrounding HTTP layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainError {
    pub kind: NotFoundKind,
    pub index_found: bool,
    pub object_found: bool,
}

impl SearchFacadeError {
    /// Create an index-not-found error.
    pub fn index_not_found(index: impl Into<String>) -> Self {
        Self::IndexNotFound {
            index: index.into(),
        }
    }

    /// Create an object-not-found error.
    pub fn object_not_found(index: impl Into<String>, object_id: impl Into<String>) -> Self {
        Self::ObjectNotFound {
            index: index.into(),
            object_id: object_id.into(),
        }
    }

    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// The catalogued domain error, if this is one.
    pub fn domain_error(&self) -> Option<DomainError> {
        match self {
            Self::IndexNotFound { .. } => Some(DomainError {
                kind: NotFoundKind::IndexNotFound,
                index_found: false,
                object_found: false,
            }),
            Self::ObjectNotFound { .. } => Some(DomainError {
                kind: NotFoundKind::ObjectNotFound,
                index_found: true,
                object_found: false,
            }),
            _ => None,
        }
    }

    /// Whether this is the index-not-found kind.
    pub fn is_index_not_found(&self) -> bool {
        matches!(self, Self::IndexNotFound { .. })
    }
}

impl From<RequestValidationError> for SearchFacadeError {
    fn from(err: RequestValidationError) -> Self {
        Self::ValidationError(err.to_string())
    }
}
