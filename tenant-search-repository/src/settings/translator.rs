//! Translation of declarative index settings into mapping updates.
//!
//! Searchability is expressed through the mapping: a dynamic template per
//! searchable field, a catch-all template disabling indexing for everything
//! else, and explicit property entries for fields whose mapping already
//! exists. Declaration order and facets are kept in the mapping `_meta`.

use std::sync::Arc;

use serde_json::{json, Map, Value};
use tenant_search_shared::{FacetSpec, SettingsSpec};
use tracing::{debug, info, instrument};

use crate::errors::{classify, SearchFacadeError};
use crate::interfaces::BackendClient;
use crate::lifecycle::IndexLifecycle;
use crate::settings::mapping::{IndexMapping, CATCH_ALL_TEMPLATE, UNSEARCHABLE_STRINGS_TEMPLATE};

/// `ignore_above` for the keyword sub-field added to searchable fields.
const KEYWORD_IGNORE_ABOVE: u32 = 256;

/// A single mapping update computed from a settings change.
#[derive(Debug, Clone, PartialEq)]
pub struct MappingUpdate {
    /// Fields becoming searchable.
    pub added: Vec<String>,
    /// Fields no longer searchable.
    pub removed: Vec<String>,
    /// Body of the `mapping_put` call.
    pub body: Value,
}

impl MappingUpdate {
    /// Compute the update turning `current` into the state `spec` declares.
    ///
    /// Returns `None` when `spec` declares nothing.
    pub fn plan(spec: &SettingsSpec, current: &IndexMapping, keyword_subfield: &str) -> Option<Self> {
        match (&spec.searchable_fields, &spec.facets) {
            (None, None) => None,
            (None, Some(facets)) => Some(Self {
                added: Vec::new(),
                removed: Vec::new(),
                body: json!({ "_meta": meta(&current.declared_searchable, facets) }),
            }),
            (Some(requested), facets) => {
                let facets = facets.as_deref().unwrap_or(&current.facets);
                Some(Self::searchable_update(requested, facets, current, keyword_subfield))
            }
        }
    }

    fn searchable_update(
        requested: &[String],
        facets: &[FacetSpec],
        current: &IndexMapping,
        keyword_subfield: &str,
    ) -> Self {
        let searchable = current.searchable_fields();
        let added: Vec<String> = requested
            .iter()
            .filter(|f| !searchable.contains(f))
            .cloned()
            .collect();
        let removed: Vec<String> = searchable
            .iter()
            .filter(|f| !requested.contains(f))
            .cloned()
            .collect();

        // put_mapping replaces dynamic_templates wholesale, so every requested
        // field without a searchable property keeps or gains its template
        let mut templates: Vec<Value> = requested
            .iter()
            .filter(|f| !current.field(f).is_some_and(|m| m.is_searchable()))
            .map(|f| searchable_template(f, keyword_subfield))
            .collect();
        templates.push(unsearchable_strings_template(keyword_subfield));
        templates.push(catch_all_template());

        let mut properties = Map::new();
        for field in requested {
            if let Some(existing) = current.field(field).filter(|m| m.is_disabled()) {
                properties.insert(field.clone(), property_entry(existing.field_type.as_deref(), true));
            }
        }
        for field in &removed {
            if let Some(existing) = current.field(field) {
                properties.insert(field.clone(), property_entry(existing.field_type.as_deref(), false));
            }
        }

        let mut body = json!({
            "dynamic_templates": templates,
            "_meta": meta(requested, facets),
        });
        if !properties.is_empty() {
            body["properties"] = Value::Object(properties);
        }

        Self {
            added,
            removed,
            body,
        }
    }
}

fn meta(searchable_fields: &[String], facets: &[FacetSpec]) -> Value {
    json!({
        "searchable_fields": searchable_fields,
        "facets": facets,
    })
}

fn searchable_template(field: &str, keyword_subfield: &str) -> Value {
    json!({
        field: {
            "match": field,
            "match_mapping_type": "*",
            "mapping": {
                "type": "{dynamic_type}",
                "index": true,
                "fields": {
                    keyword_subfield: {"type": "keyword", "ignore_above": KEYWORD_IGNORE_ABOVE}
                }
            }
        }
    })
}

/// Strings outside the searchable set stay unindexed but keep the keyword
/// sub-field facets aggregate on.
fn unsearchable_strings_template(keyword_subfield: &str) -> Value {
    json!({
        UNSEARCHABLE_STRINGS_TEMPLATE: {
            "match": "*",
            "match_mapping_type": "string",
            "mapping": {
                "type": "text",
                "index": false,
                "fields": {
                    keyword_subfield: {"type": "keyword", "ignore_above": KEYWORD_IGNORE_ABOVE}
                }
            }
        }
    })
}

fn catch_all_template() -> Value {
    json!({
        CATCH_ALL_TEMPLATE: {
            "match": "*",
            "match_mapping_type": "*",
            "mapping": {"type": "{dynamic_type}", "index": false}
        }
    })
}

fn property_entry(field_type: Option<&str>, index: bool) -> Value {
    let mut entry = json!({ "index": index });
    if let Some(field_type) = field_type {
        entry["type"] = json!(field_type);
    }
    entry
}

/// Settings as currently reflected by a mapping.
pub fn settings_from_mapping(mapping: &IndexMapping) -> SettingsSpec {
    SettingsSpec {
        searchable_fields: Some(mapping.searchable_fields()),
        facets: (!mapping.facets.is_empty()).then(|| mapping.facets.clone()),
    }
}

/// Reads and writes index settings through the backend mapping.
#[derive(Clone)]
pub struct SettingsTranslator {
    client: Arc<dyn BackendClient>,
    lifecycle: IndexLifecycle,
    keyword_subfield: String,
}

impl SettingsTranslator {
    pub fn new(
        client: Arc<dyn BackendClient>,
        lifecycle: IndexLifecycle,
        keyword_subfield: impl Into<String>,
    ) -> Self {
        Self {
            client,
            lifecycle,
            keyword_subfield: keyword_subfield.into(),
        }
    }

    /// Current mapping of the index behind `physical_index_id`.
    pub async fn read_mapping(&self, physical_index_id: &str) -> Result<IndexMapping, SearchFacadeError> {
        let response = self
            .client
            .mapping_get(physical_index_id)
            .await
            .map_err(|e| classify(e, physical_index_id, None))?;
        IndexMapping::from_response(&response)
    }

    /// Apply `spec` to the index, provisioning it first if needed.
    ///
    /// Issues at most one mapping update and returns `spec` unchanged. When
    /// `spec` carries facets but no searchable fields, that update writes the
    /// mapping `_meta` only and leaves templates and properties untouched.
    #[instrument(skip(self, spec))]
    pub async fn save_settings(
        &self,
        physical_index_id: &str,
        spec: &SettingsSpec,
    ) -> Result<SettingsSpec, SearchFacadeError> {
        self.lifecycle.ensure_exists(physical_index_id).await?;
        let current = self.read_mapping(physical_index_id).await?;

        let Some(update) = MappingUpdate::plan(spec, &current, &self.keyword_subfield) else {
            debug!(index = %physical_index_id, "Empty settings, nothing to update");
            return Ok(spec.clone());
        };

        self.client
            .mapping_put(physical_index_id, &update.body)
            .await
            .map_err(|e| classify(e, physical_index_id, None))?;

        info!(
            index = %physical_index_id,
            added = ?update.added,
            removed = ?update.removed,
            "Saved index settings"
        );
        Ok(spec.clone())
    }

    /// Settings currently in effect for the index.
    pub async fn get_settings(&self, physical_index_id: &str) -> Result<SettingsSpec, SearchFacadeError> {
        let mapping = self.read_mapping(physical_index_id).await?;
        Ok(settings_from_mapping(&mapping))
    }
}
