//! Structured search request types.
//!
//! A `SearchRequest` is what callers send to query a logical index. Filters are
//! a tagged union; the loosely-typed wire shape (`{field, term?, range?}`) is
//! validated when it is deserialized.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::error::RequestValidationError;

/// Search request against a logical index.
///
/// All parts are optional; an empty request matches every document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    /// Free-text query, split on whitespace and fuzzily matched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,

    /// Predicates combined with logical AND.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<Vec<FilterSpec>>,

    /// Sort clauses in priority order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<Vec<SortSpec>>,

    /// 1-based page number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,

    /// Page size. Defaults to 10 when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hits_per_page: Option<usize>,
}

impl SearchRequest {
    /// Create a free-text search request.
    ///
    /// # Example
    ///
    /// ```
    /// use tenant_search_shared::SearchRequest;
    ///
    /// let request = SearchRequest::text("red shoes").with_page(2, 20);
    /// assert_eq!(request.page, Some(2));
    /// ```
    pub fn text(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            ..Default::default()
        }
    }

    /// Add a filter.
    pub fn with_filter(mut self, filter: FilterSpec) -> Self {
        self.filters.get_or_insert_with(Vec::new).push(filter);
        self
    }

    /// Add a sort clause.
    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort.get_or_insert_with(Vec::new).push(sort);
        self
    }

    /// Set the page and page size.
    pub fn with_page(mut self, page: usize, hits_per_page: usize) -> Self {
        self.page = Some(page);
        self.hits_per_page = Some(hits_per_page);
        self
    }

    /// Validate the paging parameters.
    ///
    /// `page` is 1-based and `hitsPerPage` must be positive.
    pub fn validate(&self) -> Result<(), RequestValidationError> {
        if self.page == Some(0) {
            return Err(RequestValidationError::InvalidPaging(
                "page must be at least 1".to_string(),
            ));
        }
        if self.hits_per_page == Some(0) {
            return Err(RequestValidationError::InvalidPaging(
                "hitsPerPage must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// A filter predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawFilterSpec", into = "RawFilterSpec")]
pub enum FilterSpec {
    /// Exact match of a field against a value.
    Term { field: String, term: Value },
    /// Inclusive range; absent bounds are open.
    Range {
        field: String,
        from: Option<Value>,
        to: Option<Value>,
    },
}

impl FilterSpec {
    /// Exact-term filter.
    pub fn term(field: impl Into<String>, term: impl Into<Value>) -> Self {
        Self::Term {
            field: field.into(),
            term: term.into(),
        }
    }

    /// Range filter with optional inclusive bounds.
    pub fn range(field: impl Into<String>, from: Option<Value>, to: Option<Value>) -> Self {
        Self::Range {
            field: field.into(),
            from,
            to,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    from: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    to: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawFilterSpec {
    field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    term: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    range: Option<RawRange>,
}

impl TryFrom<RawFilterSpec> for FilterSpec {
    type Error = RequestValidationError;

    fn try_from(raw: RawFilterSpec) -> Result<Self, Self::Error> {
        match (raw.term, raw.range) {
            (Some(term), None) => Ok(Self::Term {
                field: raw.field,
                term,
            }),
            (None, Some(range)) => Ok(Self::Range {
                field: raw.field,
                from: range.from,
                to: range.to,
            }),
            _ => Err(RequestValidationError::AmbiguousFilter { field: raw.field }),
        }
    }
}

impl From<FilterSpec> for RawFilterSpec {
    fn from(filter: FilterSpec) -> Self {
        match filter {
            FilterSpec::Term { field, term } => Self {
                field,
                term: Some(term),
                range: None,
            },
            FilterSpec::Range { field, from, to } => Self {
                field,
                term: None,
                range: Some(RawRange { from, to }),
            },
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Sort clause. Without a direction the backend's default order applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<SortDirection>,
}

impl SortSpec {
    pub fn new(field: impl Into<String>, direction: Option<SortDirection>) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }
}
