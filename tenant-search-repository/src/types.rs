//! Request and response types exchanged with the backend client.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// One action within an atomic alias update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AliasAction {
    Add { index: String, alias: String },
    Remove { index: String, alias: String },
}

impl AliasAction {
    pub fn add(index: impl Into<String>, alias: impl Into<String>) -> Self {
        Self::Add {
            index: index.into(),
            alias: alias.into(),
        }
    }

    pub fn remove(index: impl Into<String>, alias: impl Into<String>) -> Self {
        Self::Remove {
            index: index.into(),
            alias: alias.into(),
        }
    }

    /// Wire representation: `{"add": {"index": .., "alias": ..}}`.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Add { index, alias } => json!({"add": {"index": index, "alias": alias}}),
            Self::Remove { index, alias } => json!({"remove": {"index": index, "alias": alias}}),
        }
    }
}

/// Index resolution options applied to search requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    /// Disable wildcard expansion of the addressed index name.
    pub expand_wildcards_none: bool,
    /// Whether an address resolving to no index is accepted.
    pub allow_no_indices: bool,
}

impl SearchOptions {
    /// Options under which a misaddressed search fails instead of returning
    /// an empty result.
    pub fn strict() -> Self {
        Self {
            expand_wildcards_none: true,
            allow_no_indices: false,
        }
    }
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self::strict()
    }
}

/// Outcome of writing a single document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentWriteResult {
    /// Backend document id (generated when none was supplied).
    pub id: String,
    pub version: i64,
}

/// A document read back from the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    pub source: Map<String, Value>,
}

/// Document count and backing generations of an index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexStats {
    pub physical_index_id: String,
    pub generations: Vec<String>,
    pub document_count: u64,
}
