//! Batch compilation and response correlation.
//!
//! A batch is sent as one bulk call with its operations grouped by action:
//! creates, then upserts, then deletes, each group in input order. The bulk
//! response lists one item per operation in payload order, so the groups are
//! recovered by slicing the items on the same boundaries.

use serde_json::{json, Value};
use tenant_search_shared::{BatchRequest, BatchResult};

use crate::errors::{BulkItemFailure, SearchFacadeError};

/// Compiled bulk payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkPayload {
    /// Bulk lines: an action header, followed by the document for writes.
    pub lines: Vec<Value>,
    pub creates: usize,
    pub upserts: usize,
    pub deletes: usize,
}

impl BulkPayload {
    /// Total number of operations.
    pub fn len(&self) -> usize {
        self.creates + self.upserts + self.deletes
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether any operation writes a document.
    pub fn has_writes(&self) -> bool {
        self.creates + self.upserts > 0
    }
}

/// Compile batch requests into a bulk payload.
pub fn compile(requests: &[BatchRequest]) -> BulkPayload {
    let mut creates = Vec::new();
    let mut upserts = Vec::new();
    let mut deletes = Vec::new();

    for request in requests {
        match request {
            BatchRequest::Create { body } => {
                creates.push(json!({"index": {}}));
                creates.push(Value::Object(body.clone()));
            }
            BatchRequest::Upsert { object_id, body } => {
                upserts.push(json!({"index": {"_id": object_id}}));
                upserts.push(Value::Object(body.clone()));
            }
            BatchRequest::Delete { object_id } => {
                deletes.push(json!({"delete": {"_id": object_id}}));
            }
        }
    }

    BulkPayload {
        creates: creates.len() / 2,
        upserts: upserts.len() / 2,
        deletes: deletes.len(),
        lines: creates.into_iter().chain(upserts).chain(deletes).collect(),
    }
}

/// Item body of a bulk response entry (`{"index": {...}}` or `{"delete": {...}}`).
fn item_body(item: &Value) -> Option<(&str, &Value)> {
    let (action, body) = item.as_object()?.iter().next()?;
    Some((action.as_str(), body))
}

/// Map a bulk response back to per-action id lists.
///
/// # Returns
///
/// * `Ok(BatchResult)` - Backend ids grouped per action, in input order
/// * `Err(SearchFacadeError::ParseError)` - If the response does not hold one
///   item per operation
/// * `Err(SearchFacadeError::BulkItemFailures)` - If any item was rejected
pub fn correlate(response: &Value, payload: &BulkPayload) -> Result<BatchResult, SearchFacadeError> {
    let items = response
        .get("items")
        .and_then(Value::as_array)
        .ok_or_else(|| SearchFacadeError::parse("bulk response has no items"))?;

    if items.len() != payload.len() {
        return Err(SearchFacadeError::parse(format!(
            "bulk response has {} items for {} operations",
            items.len(),
            payload.len()
        )));
    }

    let mut ids = Vec::with_capacity(items.len());
    let mut failures = Vec::new();
    for (position, item) in items.iter().enumerate() {
        let (action, body) = item_body(item)
            .ok_or_else(|| SearchFacadeError::parse(format!("malformed bulk item at {}", position)))?;

        if let Some(error) = body.get("error").filter(|e| !e.is_null()) {
            let reason = error
                .get("reason")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string());
            failures.push(BulkItemFailure {
                position,
                action: action.to_string(),
                status: body
                    .get("status")
                    .and_then(Value::as_u64)
                    .and_then(|s| u16::try_from(s).ok())
                    .unwrap_or_default(),
                reason,
            });
            continue;
        }

        let id = body
            .get("_id")
            .and_then(Value::as_str)
            .ok_or_else(|| SearchFacadeError::parse(format!("bulk item at {} has no _id", position)))?;
        ids.push(id.to_string());
    }

    if !failures.is_empty() {
        return Err(SearchFacadeError::BulkItemFailures { failures });
    }

    let mut ids = ids.into_iter();
    Ok(BatchResult {
        inserted: ids.by_ref().take(payload.creates).collect(),
        upserted: ids.by_ref().take(payload.upserts).collect(),
        deleted: ids.collect(),
    })
}
