//! Validation errors raised while constructing caller requests.

use thiserror::Error;

/// Errors raised when a caller request has an invalid shape.
///
/// These are produced at construction/deserialization time so that invalid
/// combinations (e.g. a filter carrying both a term and a range) never reach
/// the query compiler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestValidationError {
    /// A filter must carry exactly one of `term` or `range`.
    #[error("Filter on '{field}' must set exactly one of term or range")]
    AmbiguousFilter { field: String },

    /// A batch request has an action/objectID/body combination that is not allowed.
    #[error("Invalid {action} request: {reason}")]
    InvalidBatchRequest {
        action: &'static str,
        reason: &'static str,
    },

    /// Unknown batch action.
    #[error("Unknown batch action: {0}")]
    UnknownAction(String),

    /// Paging parameters out of range.
    #[error("Invalid paging: {0}")]
    InvalidPaging(String),

    /// A document body must be a JSON object.
    #[error("Document body must be a JSON object")]
    NonObjectBody,
}
