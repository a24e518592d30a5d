//! Configuration types for the TenantSearchService.

/// Configuration for the TenantSearchService.
///
/// Controls query defaults and how facets are aggregated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantSearchConfig {
    /// Page size used when a search request does not set `hitsPerPage`.
    ///
    /// Defaults to 10.
    pub default_hits_per_page: usize,

    /// Maximum number of buckets returned per facet.
    ///
    /// Defaults to 100.
    pub facet_size: usize,

    /// Name of the untokenized sub-field string fields are faceted on.
    ///
    /// Defaults to `raw`.
    pub keyword_subfield: String,
}

impl Default for TenantSearchConfig {
    fn default() -> Self {
        Self {
            default_hits_per_page: 10,
            facet_size: 100,
            keyword_subfield: "raw".to_string(),
        }
    }
}

impl TenantSearchConfig {
    /// Set the default page size.
    ///
    /// # Arguments
    ///
    /// * `hits_per_page` - Page size for requests without `hitsPerPage`; must be positive
    pub fn with_default_hits_per_page(mut self, hits_per_page: usize) -> Self {
        self.default_hits_per_page = hits_per_page;
        self
    }

    /// Set the maximum number of buckets per facet.
    pub fn with_facet_size(mut self, facet_size: usize) -> Self {
        self.facet_size = facet_size;
        self
    }

    /// Set the keyword sub-field name.
    pub fn with_keyword_subfield(mut self, keyword_subfield: impl Into<String>) -> Self {
        self.keyword_subfield = keyword_subfield.into();
        self
    }
}
