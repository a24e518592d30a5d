//! In-memory backend emulating the alias, document, bulk, search and mapping
//! behaviour the engine relies on, including the backend's 404 body shapes,
//! dynamic field mapping and multi-field resolution for aggregations.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tenant_search_repository::{
    AliasAction, BackendClient, BackendError, DocumentWriteResult, SearchOptions, StoredDocument,
};

#[derive(Default)]
struct StoredIndex {
    documents: BTreeMap<String, Map<String, Value>>,
    mappings: Map<String, Value>,
}

impl StoredIndex {
    /// Store a document, mapping its unseen fields the way the backend's
    /// dynamic mapping does.
    fn insert(&mut self, id: String, source: Map<String, Value>) {
        for (field, value) in &source {
            self.map_new_field(field, value);
        }
        self.documents.insert(id, source);
    }

    fn property(&self, field: &str) -> Option<&Value> {
        self.mappings.get("properties").and_then(|p| p.get(field))
    }

    fn map_new_field(&mut self, field: &str, value: &Value) {
        let Some((match_type, default_type)) = detected_type(value) else {
            return;
        };
        if self.property(field).is_some() {
            return;
        }

        let templated = self
            .mappings
            .get("dynamic_templates")
            .and_then(Value::as_array)
            .and_then(|templates| {
                templates.iter().find_map(|entry| {
                    let template = entry.as_object()?.values().next()?;
                    let pattern = template.get("match").and_then(Value::as_str).unwrap_or("*");
                    let mapping_type = template
                        .get("match_mapping_type")
                        .and_then(Value::as_str)
                        .unwrap_or("*");
                    let applies = (pattern == "*" || pattern == field)
                        && (mapping_type == "*" || mapping_type == match_type);
                    applies.then(|| template.get("mapping").cloned().unwrap_or(json!({})))
                })
            });

        let mut mapping = templated.unwrap_or_else(|| default_mapping(default_type));
        if mapping.get("type").and_then(Value::as_str) == Some("{dynamic_type}") {
            mapping["type"] = json!(default_type);
        }
        let properties = self
            .mappings
            .entry("properties")
            .or_insert_with(|| json!({}));
        if let Some(properties) = properties.as_object_mut() {
            properties.insert(field.to_string(), mapping);
        }
    }

    /// Values a `terms` aggregation sees for `field`, which may name a
    /// multi-field as `<field>.<subfield>`.
    fn aggregatable(&self, field: &str) -> Result<Option<String>, BackendError> {
        let (source, subfield) = match field.split_once('.') {
            Some((source, subfield)) => (source, Some(subfield)),
            None => (field, None),
        };
        let Some(property) = self.property(source) else {
            return Ok(None);
        };
        match subfield {
            Some(subfield) => Ok(property
                .pointer(&format!("/fields/{}", subfield))
                .map(|_| source.to_string())),
            None if property.get("type").and_then(Value::as_str) == Some("text") => {
                Err(BackendError::status(
                    400,
                    Some(json!({
                        "error": {"type": "illegal_argument_exception", "reason": "fielddata is disabled on text fields"},
                        "status": 400
                    })),
                ))
            }
            None => Ok(Some(source.to_string())),
        }
    }
}

/// Detected mapping type for template matching and the type `{dynamic_type}`
/// resolves to.
fn detected_type(value: &Value) -> Option<(&'static str, &'static str)> {
    match value {
        Value::String(_) => Some(("string", "text")),
        Value::Bool(_) => Some(("boolean", "boolean")),
        Value::Number(n) if n.is_f64() => Some(("double", "float")),
        Value::Number(_) => Some(("long", "long")),
        _ => None,
    }
}

fn default_mapping(default_type: &str) -> Value {
    if default_type == "text" {
        json!({"type": "text", "fields": {"keyword": {"type": "keyword", "ignore_above": 256}}})
    } else {
        json!({ "type": default_type })
    }
}

#[derive(Default)]
struct State {
    indices: BTreeMap<String, StoredIndex>,
    aliases: BTreeMap<String, BTreeSet<String>>,
    next_id: u64,
    calls: Vec<String>,
}

impl State {
    /// Concrete index addressed by `name` (an alias or an index).
    fn resolve(&self, name: &str) -> Option<String> {
        if let Some(indices) = self.aliases.get(name) {
            return indices.iter().next().cloned();
        }
        self.indices.contains_key(name).then(|| name.to_string())
    }

    fn resolve_or_missing(&self, name: &str) -> Result<String, BackendError> {
        self.resolve(name).ok_or_else(|| index_not_found(name))
    }
}

fn index_not_found(name: &str) -> BackendError {
    BackendError::status(
        404,
        Some(json!({
            "error": {"type": "index_not_found_exception", "index": name},
            "status": 404
        })),
    )
}

#[derive(Default)]
pub struct FakeBackend {
    state: Mutex<State>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Concrete indices aliased as `alias`.
    pub fn generations(&self, alias: &str) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state
            .aliases
            .get(alias)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn index_count(&self) -> usize {
        self.state.lock().unwrap().indices.len()
    }

    /// Names of the backend calls made so far.
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    fn record(state: &mut State, call: &str) {
        state.calls.push(call.to_string());
    }
}

fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

fn text_matches(document: &Map<String, Value>, query_string: &Value) -> bool {
    let fields: Option<Vec<String>> = query_string
        .get("fields")
        .and_then(Value::as_array)
        .map(|fields| {
            fields
                .iter()
                .filter_map(Value::as_str)
                .map(|f| f.split('^').next().unwrap_or(f).to_string())
                .collect()
        });
    let haystack: Vec<String> = document
        .iter()
        .filter(|(name, _)| fields.as_ref().map_or(true, |f| f.contains(name)))
        .filter_map(|(_, value)| value.as_str().map(str::to_lowercase))
        .collect();

    query_string
        .get("query")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .split_whitespace()
        .map(|token| {
            let token = token.split('~').next().unwrap_or(token);
            token.replace('\\', "").to_lowercase()
        })
        .all(|token| haystack.iter().any(|text| text.contains(&token)))
}

fn matches(id: &str, document: &Map<String, Value>, query: &Value) -> bool {
    let Some((kind, clause)) = query.as_object().and_then(|q| q.iter().next()) else {
        return true;
    };
    match kind.as_str() {
        "match_all" => true,
        "ids" => clause
            .get("values")
            .and_then(Value::as_array)
            .is_some_and(|ids| ids.iter().any(|v| v.as_str() == Some(id))),
        "bool" => ["must", "filter"].iter().all(|occur| {
            clause
                .get(*occur)
                .and_then(Value::as_array)
                .map_or(true, |clauses| clauses.iter().all(|c| matches(id, document, c)))
        }),
        "query_string" => text_matches(document, clause),
        "term" => clause
            .as_object()
            .and_then(|c| c.iter().next())
            .is_some_and(|(field, term)| document.get(field) == Some(term)),
        "range" => clause
            .as_object()
            .and_then(|c| c.iter().next())
            .is_some_and(|(field, bounds)| {
                let Some(value) = document.get(field).and_then(Value::as_f64) else {
                    return false;
                };
                let above = bounds
                    .get("gte")
                    .and_then(Value::as_f64)
                    .map_or(true, |gte| value >= gte);
                let below = bounds
                    .get("lte")
                    .and_then(Value::as_f64)
                    .map_or(true, |lte| value <= lte);
                above && below
            }),
        _ => false,
    }
}

fn aggregate(
    stored: &StoredIndex,
    documents: &[(&String, &Map<String, Value>)],
    aggs: &Map<String, Value>,
) -> Result<Value, BackendError> {
    let mut result = Map::new();
    for (name, agg) in aggs {
        let field = agg
            .pointer("/terms/field")
            .and_then(Value::as_str)
            .unwrap_or_default();

        let mut counts: Vec<(Value, u64)> = Vec::new();
        if let Some(source_field) = stored.aggregatable(field)? {
            for (_, document) in documents {
                if let Some(value) = document.get(&source_field) {
                    match counts.iter_mut().find(|(key, _)| key == value) {
                        Some((_, count)) => *count += 1,
                        None => counts.push((value.clone(), 1)),
                    }
                }
            }
        }
        counts.sort_by(|a, b| b.1.cmp(&a.1));

        let buckets: Vec<Value> = counts
            .into_iter()
            .map(|(key, count)| json!({"key": key, "doc_count": count}))
            .collect();
        result.insert(name.clone(), json!({ "buckets": buckets }));
    }
    Ok(Value::Object(result))
}

#[async_trait]
impl BackendClient for FakeBackend {
    async fn index_create(&self, name: &str) -> Result<(), BackendError> {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, "index_create");
        if state.indices.contains_key(name) {
            return Err(BackendError::status(
                400,
                Some(json!({"error": {"type": "resource_already_exists_exception"}, "status": 400})),
            ));
        }
        state.indices.insert(name.to_string(), StoredIndex::default());
        Ok(())
    }

    async fn index_delete(&self, name: &str) -> Result<(), BackendError> {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, "index_delete");
        if state.indices.remove(name).is_none() {
            return Err(index_not_found(name));
        }
        for indices in state.aliases.values_mut() {
            indices.remove(name);
        }
        state.aliases.retain(|_, indices| !indices.is_empty());
        Ok(())
    }

    async fn alias_get(&self, name: &str) -> Result<Value, BackendError> {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, "alias_get");
        match state.aliases.get(name) {
            Some(indices) => {
                let response: Map<String, Value> = indices
                    .iter()
                    .map(|index| (index.clone(), json!({"aliases": { name: {} }})))
                    .collect();
                Ok(Value::Object(response))
            }
            None => Err(BackendError::status(
                404,
                Some(json!({"error": format!("alias [{}] missing", name), "status": 404})),
            )),
        }
    }

    async fn alias_put(&self, index_name: &str, alias_name: &str) -> Result<(), BackendError> {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, "alias_put");
        if !state.indices.contains_key(index_name) {
            return Err(index_not_found(index_name));
        }
        state
            .aliases
            .entry(alias_name.to_string())
            .or_default()
            .insert(index_name.to_string());
        Ok(())
    }

    async fn aliases_update(&self, actions: &[AliasAction]) -> Result<(), BackendError> {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, "aliases_update");

        let mut aliases = state.aliases.clone();
        for action in actions {
            match action {
                AliasAction::Add { index, alias } => {
                    if !state.indices.contains_key(index) {
                        return Err(index_not_found(index));
                    }
                    aliases.entry(alias.clone()).or_default().insert(index.clone());
                }
                AliasAction::Remove { index, alias } => {
                    let removed = aliases
                        .get_mut(alias)
                        .is_some_and(|indices| indices.remove(index));
                    if !removed {
                        return Err(BackendError::status(
                            404,
                            Some(json!({"error": format!("aliases [{}] missing", alias), "status": 404})),
                        ));
                    }
                }
            }
        }
        aliases.retain(|_, indices| !indices.is_empty());
        state.aliases = aliases;
        Ok(())
    }

    async fn document_index(
        &self,
        index: &str,
        id: Option<&str>,
        body: &Value,
    ) -> Result<DocumentWriteResult, BackendError> {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, "document_index");
        let concrete = state.resolve_or_missing(index)?;

        let id = match id {
            Some(id) => id.to_string(),
            None => {
                state.next_id += 1;
                format!("auto-{}", state.next_id)
            }
        };
        let source = body.as_object().cloned().unwrap_or_default();
        if let Some(stored) = state.indices.get_mut(&concrete) {
            stored.insert(id.clone(), source);
        }
        Ok(DocumentWriteResult { id, version: 1 })
    }

    async fn document_get(&self, index: &str, id: &str) -> Result<StoredDocument, BackendError> {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, "document_get");
        let concrete = state.resolve_or_missing(index)?;

        match state.indices.get(&concrete).and_then(|i| i.documents.get(id)) {
            Some(source) => Ok(StoredDocument {
                id: id.to_string(),
                source: source.clone(),
            }),
            None => Err(BackendError::status(
                404,
                Some(json!({"_index": concrete, "_id": id, "found": false})),
            )),
        }
    }

    async fn document_delete(&self, index: &str, id: &str) -> Result<(), BackendError> {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, "document_delete");
        let concrete = state.resolve_or_missing(index)?;

        let removed = state
            .indices
            .get_mut(&concrete)
            .and_then(|i| i.documents.remove(id));
        match removed {
            Some(_) => Ok(()),
            None => Err(BackendError::status(
                404,
                Some(json!({"_index": concrete, "_id": id, "result": "not_found", "found": false})),
            )),
        }
    }

    async fn bulk(&self, index: &str, operations: &[Value]) -> Result<Value, BackendError> {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, "bulk");
        let concrete = state.resolve_or_missing(index)?;

        let mut items = Vec::new();
        let mut lines = operations.iter();
        while let Some(header) = lines.next() {
            if let Some(meta) = header.get("index") {
                let source = lines
                    .next()
                    .and_then(Value::as_object)
                    .cloned()
                    .unwrap_or_default();
                let id = match meta.get("_id").and_then(Value::as_str) {
                    Some(id) => id.to_string(),
                    None => {
                        state.next_id += 1;
                        format!("auto-{}", state.next_id)
                    }
                };
                if let Some(stored) = state.indices.get_mut(&concrete) {
                    stored.insert(id.clone(), source);
                }
                items.push(json!({"index": {"_index": concrete, "_id": id, "status": 201}}));
            } else if let Some(meta) = header.get("delete") {
                let id = meta.get("_id").and_then(Value::as_str).unwrap_or_default();
                let removed = state
                    .indices
                    .get_mut(&concrete)
                    .and_then(|i| i.documents.remove(id))
                    .is_some();
                let status = if removed { 200 } else { 404 };
                items.push(json!({"delete": {"_index": concrete, "_id": id, "status": status}}));
            }
        }
        Ok(json!({"errors": false, "items": items}))
    }

    async fn search(
        &self,
        index: &str,
        body: &Value,
        options: SearchOptions,
    ) -> Result<Value, BackendError> {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, "search");
        if options.expand_wildcards_none && index.contains('*') {
            return Err(index_not_found(index));
        }
        let concrete = state.resolve_or_missing(index)?;
        let Some(stored) = state.indices.get(&concrete) else {
            return Err(index_not_found(index));
        };

        let query = body.get("query").cloned().unwrap_or(json!({"match_all": {}}));
        let mut matched: Vec<(&String, &Map<String, Value>)> = stored
            .documents
            .iter()
            .filter(|(id, document)| matches(id, document, &query))
            .collect();

        if let Some(sort) = body.get("sort").and_then(Value::as_array) {
            for clause in sort.iter().rev() {
                let (field, descending) = match clause {
                    Value::String(field) => (field.clone(), false),
                    Value::Object(map) => match map.iter().next() {
                        Some((field, spec)) => (
                            field.clone(),
                            spec.get("order").and_then(Value::as_str) == Some("desc"),
                        ),
                        None => continue,
                    },
                    _ => continue,
                };
                matched.sort_by(|a, b| {
                    let ordering = compare(a.1.get(&field), b.1.get(&field));
                    if descending {
                        ordering.reverse()
                    } else {
                        ordering
                    }
                });
            }
        }

        let aggregations = body
            .get("aggs")
            .and_then(Value::as_object)
            .map(|aggs| aggregate(stored, &matched, aggs))
            .transpose()?;

        let total = matched.len();
        let from = body.get("from").and_then(Value::as_u64).unwrap_or(0) as usize;
        let size = body.get("size").and_then(Value::as_u64).unwrap_or(10) as usize;
        let hits: Vec<Value> = matched
            .into_iter()
            .skip(from)
            .take(size)
            .map(|(id, document)| json!({"_index": concrete, "_id": id, "_source": document}))
            .collect();

        let mut response = json!({
            "hits": {"total": {"value": total, "relation": "eq"}, "hits": hits}
        });
        if let Some(aggregations) = aggregations {
            response["aggregations"] = aggregations;
        }
        Ok(response)
    }

    async fn mapping_get(&self, index: &str) -> Result<Value, BackendError> {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, "mapping_get");
        let concrete = state.resolve_or_missing(index)?;
        let mappings = state
            .indices
            .get(&concrete)
            .map(|i| i.mappings.clone())
            .unwrap_or_default();
        Ok(json!({ concrete: {"mappings": mappings} }))
    }

    async fn mapping_put(&self, index: &str, body: &Value) -> Result<(), BackendError> {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, "mapping_put");
        let concrete = state.resolve_or_missing(index)?;
        let Some(stored) = state.indices.get_mut(&concrete) else {
            return Err(index_not_found(index));
        };

        let Some(update) = body.as_object() else {
            return Err(BackendError::status(400, Some(json!({"status": 400}))));
        };
        for (key, value) in update {
            match (key.as_str(), value) {
                ("properties", Value::Object(properties)) => {
                    let existing = stored
                        .mappings
                        .entry("properties")
                        .or_insert_with(|| json!({}));
                    if let Some(existing) = existing.as_object_mut() {
                        for (field, mapping) in properties {
                            // parameters merge into an existing field mapping
                            match (existing.get_mut(field), mapping) {
                                (Some(Value::Object(current)), Value::Object(update)) => {
                                    for (key, value) in update {
                                        current.insert(key.clone(), value.clone());
                                    }
                                }
                                _ => {
                                    existing.insert(field.clone(), mapping.clone());
                                }
                            }
                        }
                    }
                }
                _ => {
                    stored.mappings.insert(key.clone(), value.clone());
                }
            }
        }
        Ok(())
    }

    async fn stats(&self, index: &str) -> Result<Value, BackendError> {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, "stats");
        let concrete = state.resolve_or_missing(index)?;
        let count = state
            .indices
            .get(&concrete)
            .map(|i| i.documents.len())
            .unwrap_or_default();
        Ok(json!({"_all": {"primaries": {"docs": {"count": count}}}}))
    }
}
