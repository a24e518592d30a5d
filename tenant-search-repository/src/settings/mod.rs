//! Index settings: the typed mapping view and the translation of declarative
//! settings into mapping updates.

pub mod mapping;
pub mod translator;

pub use mapping::{
    DynamicTemplate, FieldMapping, IndexMapping, CATCH_ALL_TEMPLATE, DEFAULT_KEYWORD_SUBFIELD,
    UNSEARCHABLE_STRINGS_TEMPLATE,
};
pub use translator::{settings_from_mapping, MappingUpdate, SettingsTranslator};
