//! Index settings types.

use serde::{Deserialize, Serialize};

/// Declarative settings for a logical index.
///
/// `searchable_fields` is ordered: fields declared earlier are weighted higher
/// when matching free text.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SettingsSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub searchable_fields: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facets: Option<Vec<FacetSpec>>,
}

impl SettingsSpec {
    /// Settings declaring only searchable fields.
    pub fn searchable<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            searchable_fields: Some(fields.into_iter().map(Into::into).collect()),
            facets: None,
        }
    }

    /// Add facets to the settings.
    pub fn with_facets(mut self, facets: Vec<FacetSpec>) -> Self {
        self.facets = Some(facets);
        self
    }

    /// Configured facets, or an empty slice.
    pub fn facet_specs(&self) -> &[FacetSpec] {
        self.facets.as_deref().unwrap_or_default()
    }
}

/// A faceted aggregation over a field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FacetSpec {
    pub field: String,
    pub order: FacetOrder,
}

impl FacetSpec {
    pub fn new(field: impl Into<String>, order: FacetOrder) -> Self {
        Self {
            field: field.into(),
            order,
        }
    }
}

/// Ordering applied to facet buckets.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FacetOrder {
    /// Document count, ascending.
    #[serde(rename = "count")]
    Count,
    /// Document count, descending.
    #[serde(rename = "countDESC")]
    CountDesc,
    /// Bucket value, ascending.
    #[serde(rename = "value")]
    Value,
    /// Bucket value, descending.
    #[serde(rename = "valueDESC")]
    ValueDesc,
}
