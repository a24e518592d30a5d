//! Query result types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Result of a query against a logical index.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    /// Stored documents, each carrying its `objectID`, in backend order.
    pub hits: Vec<Value>,

    /// Total number of matching documents.
    /// May be greater than the number of returned hits due to pagination.
    pub nb_hits: u64,

    /// 1-based page that was returned.
    pub page: usize,

    pub hits_per_page: usize,

    /// One entry per configured facet, in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub facets: Vec<FacetResult>,
}

impl QueryResult {
    /// Returns true if there are no hits.
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

/// Facet values for one field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FacetResult {
    pub field: String,
    pub values: Vec<FacetValue>,
}

/// A single facet bucket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FacetValue {
    pub value: Value,
    pub count: u64,
}

impl FacetValue {
    pub fn new(value: impl Into<Value>, count: u64) -> Self {
        Self {
            value: value.into(),
            count,
        }
    }
}
