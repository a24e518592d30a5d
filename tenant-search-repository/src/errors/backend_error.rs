//! Raw errors reported by the backend client.

use serde_json::Value;
use thiserror::Error;

/// An unclassified failure reported by the search backend.
///
/// Carries the HTTP status and the decoded response body when the backend
/// answered; transport failures have neither.
#[derive(Debug, Clone, Error)]
#[error("Backend error (status {status:?}): {message}")]
pub struct BackendError {
    pub status: Option<u16>,
    pub body: Option<Value>,
    pub message: String,
}

impl BackendError {
    /// Error for a non-success HTTP response.
    pub fn status(status: u16, body: Option<Value>) -> Self {
        let message = body
            .as_ref()
            .map(|b| b.to_string())
            .unwrap_or_else(|| "<empty body>".to_string());
        Self {
            status: Some(status),
            body,
            message,
        }
    }

    /// Error raised before a response was received.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self {
            status: None,
            body: None,
            message: msg.into(),
        }
    }

    /// Error decoding a response.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self {
            status: None,
            body: None,
            message: format!("failed to decode response: {}", msg.into()),
        }
    }

    /// Whether the backend answered 404.
    pub fn is_not_found_status(&self) -> bool {
        self.status == Some(404)
    }
}
