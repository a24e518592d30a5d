//! Stored document representation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::error::RequestValidationError;

/// Name of the identity attribute exposed to callers.
pub const OBJECT_ID_FIELD: &str = "objectID";

/// A caller document together with its backend document id.
///
/// The body never contains `objectID`; it is added when the object is
/// rendered back to the caller via [`IndexedObject::into_value`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedObject {
    #[serde(rename = "objectID")]
    pub object_id: String,
    pub body: Map<String, Value>,
}

impl IndexedObject {
    pub fn new(object_id: impl Into<String>, body: Map<String, Value>) -> Self {
        Self {
            object_id: object_id.into(),
            body,
        }
    }

    /// Render the stored body with `objectID` set to the backend id.
    pub fn into_value(self) -> Value {
        let mut body = self.body;
        body.insert(OBJECT_ID_FIELD.to_string(), Value::String(self.object_id));
        Value::Object(body)
    }

    /// Extract a document body from a caller value, dropping any `objectID`
    /// attribute so it is not stored alongside the document.
    pub fn body_from_value(value: Value) -> Result<Map<String, Value>, RequestValidationError> {
        match value {
            Value::Object(mut map) => {
                map.remove(OBJECT_ID_FIELD);
                Ok(map)
            }
            _ => Err(RequestValidationError::NonObjectBody),
        }
    }
}
