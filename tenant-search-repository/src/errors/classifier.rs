//! Backend error classification.
//!
//! The backend's error model is weakly typed: a missing document and a missing
//! index both answer 404 and are only told apart by the body shape. Rules are
//! evaluated in order and the first match wins:
//!
//! 1. body carries `_index` and `found: false` → object not found;
//! 2. body absent or without `_index`, status 404 → index not found;
//! 3. anything else is passed through unclassified.

use crate::errors::{BackendError, SearchFacadeError};

/// Outcome of classifying a backend error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    IndexNotFound,
    ObjectNotFound,
    Unclassified,
}

/// Classify a raw backend error.
pub fn classify_backend_error(error: &BackendError) -> Classification {
    let index_set = error
        .body
        .as_ref()
        .and_then(|body| body.get("_index"))
        .is_some_and(|index| !index.is_null());

    if index_set {
        let found = error.body.as_ref().and_then(|body| body.get("found"));
        if found.and_then(|f| f.as_bool()) == Some(false) {
            return Classification::ObjectNotFound;
        }
        return Classification::Unclassified;
    }

    if error.is_not_found_status() {
        Classification::IndexNotFound
    } else {
        Classification::Unclassified
    }
}

/// Classify a backend error into the engine error type.
///
/// `index` names the addressed index; `object_id` the addressed document, if
/// any. When the body names the document the body's id is used.
pub fn classify(error: BackendError, index: &str, object_id: Option<&str>) -> SearchFacadeError {
    match classify_backend_error(&error) {
        Classification::ObjectNotFound => {
            let id = object_id
                .map(str::to_string)
                .or_else(|| {
                    error
                        .body
                        .as_ref()
                        .and_then(|body| body.get("_id"))
                        .and_then(|id| id.as_str())
                        .map(str::to_string)
                })
                .unwrap_or_default();
            SearchFacadeError::object_not_found(index, id)
        }
        Classification::IndexNotFound => SearchFacadeError::index_not_found(index),
        Classification::Unclassified => SearchFacadeError::Unclassified(error),
    }
}
