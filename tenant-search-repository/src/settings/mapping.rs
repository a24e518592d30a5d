//! Typed view of a backend mapping response.
//!
//! The backend answers `GET _mapping` with loosely-typed JSON keyed by the
//! concrete index name. `IndexMapping::from_response` parses it once into a
//! fixed structure so the settings translator and facet compiler never look
//! at raw JSON.

use std::collections::BTreeMap;

use serde_json::Value;
use tenant_search_shared::FacetSpec;

use crate::errors::SearchFacadeError;

/// Name of the catch-all dynamic template that disables indexing for every
/// field not explicitly handled.
pub const CATCH_ALL_TEMPLATE: &str = "unsearchable_fields";

/// Name of the template that disables indexing for string fields while still
/// giving them an untokenized sub-field to aggregate on.
pub const UNSEARCHABLE_STRINGS_TEMPLATE: &str = "unsearchable_strings";

/// Keyword sub-field the backend adds to dynamically mapped strings.
pub const DEFAULT_KEYWORD_SUBFIELD: &str = "keyword";

/// Indexing state of a mapped field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMapping {
    /// Mapping type (`text`, `long`, `keyword`, ...), if declared.
    pub field_type: Option<String>,
    /// `Some(true)` when indexing is explicitly enabled, `Some(false)` when
    /// explicitly disabled, `None` when the mapping leaves it implicit.
    pub index: Option<bool>,
    /// Names of multi-fields declared under `fields`.
    pub subfields: Vec<String>,
}

impl FieldMapping {
    /// Explicitly indexed for full-text search.
    pub fn is_searchable(&self) -> bool {
        self.index == Some(true)
    }

    /// Explicitly excluded from indexing.
    pub fn is_disabled(&self) -> bool {
        self.index == Some(false)
    }

    /// Whether the field holds strings (and therefore aggregates on an
    /// untokenized sub-field).
    pub fn is_string(&self) -> bool {
        matches!(self.field_type.as_deref(), Some("text") | Some("string"))
    }

    pub fn has_subfield(&self, name: &str) -> bool {
        self.subfields.iter().any(|subfield| subfield == name)
    }
}

/// A dynamic template entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamicTemplate {
    pub name: String,
    pub match_pattern: Option<String>,
    pub index: Option<bool>,
}

impl DynamicTemplate {
    /// Applies to every field name rather than to one declared field.
    pub fn is_catch_all(&self) -> bool {
        matches!(self.match_pattern.as_deref(), None | Some("*"))
    }
}

/// Typed intermediate representation of an index mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexMapping {
    /// Concrete index the mapping was read from.
    pub index_name: Option<String>,
    pub properties: BTreeMap<String, FieldMapping>,
    pub dynamic_templates: Vec<DynamicTemplate>,
    /// Searchable fields in the order they were last declared.
    pub declared_searchable: Vec<String>,
    /// Facets recorded with the settings.
    pub facets: Vec<FacetSpec>,
}

impl IndexMapping {
    /// Parse a raw `GET <index>/_mapping` response.
    ///
    /// The response holds one entry per concrete index behind the alias; the
    /// first entry (by name) is used.
    pub fn from_response(response: &Value) -> Result<Self, SearchFacadeError> {
        let indices = response
            .as_object()
            .ok_or_else(|| SearchFacadeError::parse("mapping response is not an object"))?;

        let Some((index_name, entry)) = indices.iter().next() else {
            return Ok(Self::default());
        };

        let mut mapping = match entry.get("mappings") {
            Some(mappings) => Self::from_mappings(mappings)?,
            None => Self::default(),
        };
        mapping.index_name = Some(index_name.clone());
        Ok(mapping)
    }

    /// Parse the `mappings` object of a single index.
    pub fn from_mappings(mappings: &Value) -> Result<Self, SearchFacadeError> {
        let properties = match mappings.get("properties") {
            Some(Value::Object(props)) => props
                .iter()
                .map(|(name, field)| (name.clone(), parse_field(field)))
                .collect(),
            Some(_) => return Err(SearchFacadeError::parse("mapping properties is not an object")),
            None => BTreeMap::new(),
        };

        let dynamic_templates = match mappings.get("dynamic_templates") {
            Some(Value::Array(templates)) => templates.iter().filter_map(parse_template).collect(),
            Some(_) => {
                return Err(SearchFacadeError::parse(
                    "mapping dynamic_templates is not an array",
                ))
            }
            None => Vec::new(),
        };

        let meta = mappings.get("_meta");
        let declared_searchable = meta
            .and_then(|m| m.get("searchable_fields"))
            .and_then(Value::as_array)
            .map(|fields| {
                fields
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        let facets = match meta.and_then(|m| m.get("facets")) {
            Some(facets) => serde_json::from_value(facets.clone())
                .map_err(|e| SearchFacadeError::parse(format!("invalid stored facets: {}", e)))?,
            None => Vec::new(),
        };

        Ok(Self {
            index_name: None,
            properties,
            dynamic_templates,
            declared_searchable,
            facets,
        })
    }

    /// Fields currently searchable: properties with indexing explicitly
    /// enabled plus fields named by dynamic templates, excluding catch-all
    /// templates.
    ///
    /// Ordered by last declaration, then by name for fields never declared
    /// through settings.
    pub fn searchable_fields(&self) -> Vec<String> {
        let mut fields: Vec<String> = self
            .properties
            .iter()
            .filter(|(_, field)| field.is_searchable())
            .map(|(name, _)| name.clone())
            .collect();
        for template in &self.dynamic_templates {
            if !template.is_catch_all() && !fields.contains(&template.name) {
                fields.push(template.name.clone());
            }
        }

        let position = |field: &String| {
            self.declared_searchable
                .iter()
                .position(|declared| declared == field)
                .unwrap_or(usize::MAX)
        };
        fields.sort_by(|a, b| position(a).cmp(&position(b)).then_with(|| a.cmp(b)));
        fields
    }

    /// Mapping of a top-level field, if present.
    pub fn field(&self, name: &str) -> Option<&FieldMapping> {
        self.properties.get(name)
    }
}

fn parse_index_flag(value: Option<&Value>) -> Option<bool> {
    match value? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.as_str() {
            "true" | "analyzed" => Some(true),
            "false" | "no" | "not_analyzed" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn parse_field(field: &Value) -> FieldMapping {
    FieldMapping {
        field_type: field.get("type").and_then(Value::as_str).map(str::to_string),
        index: parse_index_flag(field.get("index")),
        subfields: field
            .get("fields")
            .and_then(Value::as_object)
            .map(|subfields| subfields.keys().cloned().collect())
            .unwrap_or_default(),
    }
}

fn parse_template(entry: &Value) -> Option<DynamicTemplate> {
    let (name, template) = entry.as_object()?.iter().next()?;
    Some(DynamicTemplate {
        name: name.clone(),
        match_pattern: template.get("match").and_then(Value::as_str).map(str::to_string),
        index: parse_index_flag(template.get("mapping").and_then(|m| m.get("index"))),
    })
}
