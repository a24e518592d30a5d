//! Batch request and result types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::error::RequestValidationError;
use crate::types::indexed_object::IndexedObject;

/// One operation within a batch.
///
/// The wire shape is `{action, body?, objectID?}`; the combination is validated
/// on deserialization: `create` forbids `objectID`, `upsert` and `delete`
/// require it, and `create`/`upsert` require a body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawBatchRequest", into = "RawBatchRequest")]
pub enum BatchRequest {
    /// Insert with a backend-generated id.
    Create { body: Map<String, Value> },
    /// Insert or replace the document with the given id.
    Upsert {
        object_id: String,
        body: Map<String, Value>,
    },
    /// Delete the document with the given id.
    Delete { object_id: String },
}

impl BatchRequest {
    pub fn create(body: Map<String, Value>) -> Self {
        Self::Create { body }
    }

    pub fn upsert(object_id: impl Into<String>, body: Map<String, Value>) -> Self {
        Self::Upsert {
            object_id: object_id.into(),
            body,
        }
    }

    pub fn delete(object_id: impl Into<String>) -> Self {
        Self::Delete {
            object_id: object_id.into(),
        }
    }

    /// Wire name of the action.
    pub fn action(&self) -> &'static str {
        match self {
            Self::Create { .. } => "create",
            Self::Upsert { .. } => "upsert",
            Self::Delete { .. } => "delete",
        }
    }

    /// Whether this operation writes a document (and therefore needs storage).
    pub fn is_write(&self) -> bool {
        !matches!(self, Self::Delete { .. })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawBatchRequest {
    action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    body: Option<Value>,
    #[serde(rename = "objectID", default, skip_serializing_if = "Option::is_none")]
    object_id: Option<String>,
}

impl TryFrom<RawBatchRequest> for BatchRequest {
    type Error = RequestValidationError;

    fn try_from(raw: RawBatchRequest) -> Result<Self, Self::Error> {
        let invalid = |action, reason| RequestValidationError::InvalidBatchRequest { action, reason };
        let body = raw.body.map(IndexedObject::body_from_value).transpose()?;

        match raw.action.as_str() {
            "create" => match (raw.object_id, body) {
                (Some(_), _) => Err(invalid("create", "objectID is not allowed")),
                (None, None) => Err(invalid("create", "body is required")),
                (None, Some(body)) => Ok(Self::Create { body }),
            },
            "upsert" => match (raw.object_id, body) {
                (None, _) => Err(invalid("upsert", "objectID is required")),
                (Some(_), None) => Err(invalid("upsert", "body is required")),
                (Some(object_id), Some(body)) => Ok(Self::Upsert { object_id, body }),
            },
            "delete" => match raw.object_id {
                None => Err(invalid("delete", "objectID is required")),
                Some(object_id) => Ok(Self::Delete { object_id }),
            },
            other => Err(RequestValidationError::UnknownAction(other.to_string())),
        }
    }
}

impl From<BatchRequest> for RawBatchRequest {
    fn from(request: BatchRequest) -> Self {
        let action = request.action().to_string();
        match request {
            BatchRequest::Create { body } => Self {
                action,
                body: Some(Value::Object(body)),
                object_id: None,
            },
            BatchRequest::Upsert { object_id, body } => Self {
                action,
                body: Some(Value::Object(body)),
                object_id: Some(object_id),
            },
            BatchRequest::Delete { object_id } => Self {
                action,
                body: None,
                object_id: Some(object_id),
            },
        }
    }
}

/// Backend ids produced by a batch, grouped per action in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult {
    pub inserted: Vec<String>,
    pub upserted: Vec<String>,
    pub deleted: Vec<String>,
}
