//! Facet aggregations.

use std::cmp::Ordering;

use serde_json::{json, Map, Value};
use tenant_search_shared::{FacetOrder, FacetResult, FacetSpec, FacetValue};

use crate::errors::SearchFacadeError;
use crate::settings::{IndexMapping, DEFAULT_KEYWORD_SUBFIELD};

/// Field a facet aggregates on.
///
/// String fields aggregate on their untokenized sub-field: the configured
/// one when mapped, otherwise the backend's default `keyword` multi-field.
/// Everything else, including string fields with neither, aggregates on the
/// field itself.
pub fn aggregation_field(field: &str, mapping: Option<&IndexMapping>, keyword_subfield: &str) -> String {
    let Some(mapped) = mapping.and_then(|m| m.field(field)).filter(|f| f.is_string()) else {
        return field.to_string();
    };
    [keyword_subfield, DEFAULT_KEYWORD_SUBFIELD]
        .into_iter()
        .find(|subfield| mapped.has_subfield(subfield))
        .map(|subfield| format!("{}.{}", field, subfield))
        .unwrap_or_else(|| field.to_string())
}

/// One `terms` aggregation per facet, named after the facet field.
pub fn compile_aggregations(
    facets: &[FacetSpec],
    mapping: Option<&IndexMapping>,
    keyword_subfield: &str,
    size: usize,
) -> Value {
    let aggs: Map<String, Value> = facets
        .iter()
        .map(|facet| {
            let field = aggregation_field(&facet.field, mapping, keyword_subfield);
            (
                facet.field.clone(),
                json!({"terms": {"field": field, "size": size}}),
            )
        })
        .collect();
    Value::Object(aggs)
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or_default();
            let y = y.as_f64().unwrap_or_default();
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => a.to_string().cmp(&b.to_string()),
    }
}

/// Sort facet values in place. The sort is stable, so ties keep backend order.
pub fn sort_values(values: &mut [FacetValue], order: FacetOrder) {
    match order {
        FacetOrder::Count => values.sort_by(|a, b| a.count.cmp(&b.count)),
        FacetOrder::CountDesc => values.sort_by(|a, b| b.count.cmp(&a.count)),
        FacetOrder::Value => values.sort_by(|a, b| compare_values(&a.value, &b.value)),
        FacetOrder::ValueDesc => values.sort_by(|a, b| compare_values(&b.value, &a.value)),
    }
}

/// Extract facet results from a search response, in facet declaration order.
pub fn parse_facets(
    response: &Value,
    facets: &[FacetSpec],
) -> Result<Vec<FacetResult>, SearchFacadeError> {
    if facets.is_empty() {
        return Ok(Vec::new());
    }
    let aggregations = response
        .get("aggregations")
        .ok_or_else(|| SearchFacadeError::parse("search response has no aggregations"))?;

    facets
        .iter()
        .map(|facet| {
            let buckets = aggregations
                .get(&facet.field)
                .and_then(|agg| agg.get("buckets"))
                .and_then(Value::as_array)
                .ok_or_else(|| {
                    SearchFacadeError::parse(format!("missing buckets for facet '{}'", facet.field))
                })?;

            let mut values: Vec<FacetValue> = buckets
                .iter()
                .map(|bucket| {
                    FacetValue::new(
                        bucket.get("key").cloned().unwrap_or(Value::Null),
                        bucket.get("doc_count").and_then(Value::as_u64).unwrap_or(0),
                    )
                })
                .collect();
            sort_values(&mut values, facet.order);

            Ok(FacetResult {
                field: facet.field.clone(),
                values,
            })
        })
        .collect()
}
