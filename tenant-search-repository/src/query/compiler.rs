//! Structured search request compiler.
//!
//! Translates a `SearchRequest` into an OpenSearch query DSL body. Each part of
//! the request compiles independently; an empty request matches everything.

use serde_json::{json, Map, Value};
use tenant_search_shared::{
    FilterSpec, IndexedObject, SearchRequest, SettingsSpec, SortSpec, OBJECT_ID_FIELD,
};

use crate::errors::SearchFacadeError;
use crate::query::facets::compile_aggregations;
use crate::settings::IndexMapping;

/// Characters with meaning in the query string syntax.
const RESERVED_CHARS: &[char] = &[
    '+', '-', '=', '&', '|', '!', '(', ')', '{', '}', '[', ']', '^', '"', '~', '*', '?', ':',
    '\\', '/',
];

/// A compiled search ready to send to the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub body: Value,
    /// 1-based page requested (1 when absent).
    pub page: usize,
    pub hits_per_page: usize,
}

/// Compiles structured search requests into backend queries.
#[derive(Debug, Clone)]
pub struct QueryCompiler {
    default_hits_per_page: usize,
    keyword_subfield: String,
    facet_size: usize,
}

impl QueryCompiler {
    pub fn new(
        default_hits_per_page: usize,
        keyword_subfield: impl Into<String>,
        facet_size: usize,
    ) -> Self {
        Self {
            default_hits_per_page,
            keyword_subfield: keyword_subfield.into(),
            facet_size,
        }
    }

    /// Compile a request.
    ///
    /// # Arguments
    ///
    /// * `request` - The caller's structured request
    /// * `settings` - Index settings; `searchable_fields` restricts and weights
    ///   the text match, `facets` adds aggregations
    /// * `mapping` - Field types used to pick facet aggregation fields
    pub fn compile(
        &self,
        request: &SearchRequest,
        settings: Option<&SettingsSpec>,
        mapping: Option<&IndexMapping>,
    ) -> Result<CompiledQuery, SearchFacadeError> {
        request.validate()?;

        let hits_per_page = request.hits_per_page.unwrap_or(self.default_hits_per_page);
        let searchable = settings.and_then(|s| s.searchable_fields.as_deref());

        let must: Vec<Value> = request
            .query
            .as_deref()
            .and_then(|text| compile_text_query(text, searchable))
            .into_iter()
            .collect();
        let filter: Vec<Value> = request
            .filters
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(compile_filter)
            .collect();

        let query = if must.is_empty() && filter.is_empty() {
            json!({"match_all": {}})
        } else {
            let mut bool_query = Map::new();
            if !must.is_empty() {
                bool_query.insert("must".to_string(), Value::Array(must));
            }
            if !filter.is_empty() {
                bool_query.insert("filter".to_string(), Value::Array(filter));
            }
            json!({ "bool": bool_query })
        };

        let mut body = json!({
            "query": query,
            "size": hits_per_page,
        });

        if let Some(page) = request.page {
            let from = (page - 1).checked_mul(hits_per_page).ok_or_else(|| {
                SearchFacadeError::validation(format!(
                    "page {} with {} hits per page is out of range",
                    page, hits_per_page
                ))
            })?;
            body["from"] = json!(from);
        }

        if let Some(sort) = request.sort.as_deref().filter(|s| !s.is_empty()) {
            body["sort"] = Value::Array(sort.iter().map(compile_sort).collect());
        }

        let facets = settings.map(SettingsSpec::facet_specs).unwrap_or_default();
        if !facets.is_empty() {
            body["aggs"] =
                compile_aggregations(facets, mapping, &self.keyword_subfield, self.facet_size);
        }

        Ok(CompiledQuery {
            body,
            page: request.page.unwrap_or(1),
            hits_per_page,
        })
    }
}

/// Edit distance allowed for a token of the given length.
pub fn fuzziness(token: &str) -> u8 {
    match token.chars().count() {
        0..=3 => 0,
        4..=7 => 1,
        _ => 2,
    }
}

fn escape_token(token: &str) -> String {
    let mut escaped = String::with_capacity(token.len());
    for c in token.chars() {
        // '<' and '>' cannot be escaped in the query string syntax
        if c == '<' || c == '>' {
            continue;
        }
        if RESERVED_CHARS.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Fuzzy query string for free text: every token must match, with edit
/// distance growing with token length.
pub fn fuzzy_expression(text: &str) -> Option<String> {
    let tokens: Vec<String> = text
        .split_whitespace()
        .map(|token| {
            let escaped = escape_token(token);
            match fuzziness(token) {
                0 => escaped,
                distance => format!("{}~{}", escaped, distance),
            }
        })
        .filter(|token| !token.is_empty())
        .collect();

    (!tokens.is_empty()).then(|| tokens.join(" "))
}

/// Boosted field list: reverse declaration order, boost 1.0 for the last
/// declared field and +0.1 for each earlier one.
pub fn boosted_fields(searchable_fields: &[String]) -> Vec<String> {
    searchable_fields
        .iter()
        .rev()
        .enumerate()
        .map(|(position, field)| format!("{}^{:.1}", field, 1.0 + 0.1 * position as f64))
        .collect()
}

fn compile_text_query(text: &str, searchable_fields: Option<&[String]>) -> Option<Value> {
    let expression = fuzzy_expression(text)?;
    let mut query_string = json!({
        "query": expression,
        "default_operator": "AND",
    });
    if let Some(fields) = searchable_fields.filter(|f| !f.is_empty()) {
        query_string["fields"] = json!(boosted_fields(fields));
    }
    Some(json!({ "query_string": query_string }))
}

fn compile_filter(filter: &FilterSpec) -> Value {
    match filter {
        FilterSpec::Term { field, term } => json!({"term": { field.as_str(): term }}),
        FilterSpec::Range { field, from, to } => {
            let mut bounds = Map::new();
            if let Some(from) = from {
                bounds.insert("gte".to_string(), from.clone());
            }
            if let Some(to) = to {
                bounds.insert("lte".to_string(), to.clone());
            }
            json!({"range": { field.as_str(): bounds }})
        }
    }
}

fn compile_sort(sort: &SortSpec) -> Value {
    match sort.direction {
        Some(direction) => json!({ sort.field.as_str(): {"order": direction.as_str()} }),
        None => json!(sort.field),
    }
}

/// Hits and total of a search response, each hit rendered with its
/// `objectID`.
pub fn parse_hits(response: &Value) -> Result<(Vec<Value>, u64), SearchFacadeError> {
    let hits = response
        .get("hits")
        .ok_or_else(|| SearchFacadeError::parse("search response has no hits"))?;

    // `total` is an object on recent backends and a bare number on older ones
    let total = match hits.get("total") {
        Some(Value::Object(total)) => total.get("value").and_then(Value::as_u64).unwrap_or(0),
        Some(total) => total.as_u64().unwrap_or(0),
        None => 0,
    };

    let documents = hits
        .get("hits")
        .and_then(Value::as_array)
        .map(|items| items.iter().map(parse_hit).collect::<Result<Vec<_>, _>>())
        .transpose()?
        .unwrap_or_default();

    Ok((documents, total))
}

fn parse_hit(hit: &Value) -> Result<Value, SearchFacadeError> {
    let id = hit
        .get("_id")
        .and_then(Value::as_str)
        .ok_or_else(|| SearchFacadeError::parse("search hit has no _id"))?;
    let mut body = match hit.get("_source") {
        Some(Value::Object(source)) => source.clone(),
        _ => Map::new(),
    };
    body.remove(OBJECT_ID_FIELD);
    Ok(IndexedObject::new(id, body).into_value())
}
