//! Physical index naming.
//!
//! A logical index `(tenant_id, name)` is addressed on the backend through the
//! alias `<tenant_id>_<name>`. Each concrete index behind that alias is a
//! timestamped generation `<alias>_<year>.<month>.<day>.<epoch-millis>`.

use chrono::{DateTime, Datelike, Utc};

/// Separator between tenant id and logical name.
pub const TENANT_SEPARATOR: char = '_';

/// Derive the physical, tenant-scoped index id from a logical name.
///
/// # Example
///
/// ```
/// use tenant_search_repository::naming::resolve;
///
/// assert_eq!(resolve("a1b2", "products"), "a1b2_products");
/// ```
pub fn resolve(tenant_id: &str, logical_name: &str) -> String {
    format!("{}{}{}", tenant_id, TENANT_SEPARATOR, logical_name)
}

/// Name of a new physical generation for `physical_index_id`.
///
/// Millisecond resolution keeps consecutive generations of one index distinct.
pub fn generation_name(physical_index_id: &str, at: DateTime<Utc>) -> String {
    format!(
        "{}_{}.{}.{}.{}",
        physical_index_id,
        at.year(),
        at.month(),
        at.day(),
        at.timestamp_millis()
    )
}
