//! Stable row identity

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::model::Record;

/// Stable string identity for a record, independent of its position.
///
/// Derived either from a configured identity field or, when the record has
/// no such field, from a 32-bit hash of its canonical serialization. The hash
/// fallback can collide; two distinct keyless records with the same hash
/// share a `RowId`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(String);

impl RowId {
    /// Creates a row id from any string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RowId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for RowId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Derives the [`RowId`] of a record.
///
/// If `id_field` is set and the record holds a non-null value there, the id
/// is that value's string form. Otherwise it is [`content_hash`] of the
/// record's canonical bytes, in decimal.
///
/// # Example
///
/// ```
/// use datagrid_lib::identity::identify;
/// use datagrid_lib::model::Record;
///
/// let record = Record::new().set("id", 42).set("name", "a");
/// assert_eq!(identify(&record, Some("id")).as_str(), "42");
/// ```
pub fn identify(record: &Record, id_field: Option<&str>) -> RowId {
    match id_field.and_then(|field| record.get(field)) {
        Some(value) if !value.is_null() => RowId(value.to_string()),
        _ => RowId(content_hash(&record.canonical_bytes()).to_string()),
    }
}

/// Returns `true` if the record's id comes from `id_field` rather than a hash.
pub fn has_explicit_id(record: &Record, id_field: Option<&str>) -> bool {
    id_field
        .and_then(|field| record.get(field))
        .is_some_and(|value| !value.is_null())
}

/// 32-bit rolling hash (`h = h * 31 + b`, wrapping).
pub fn content_hash(bytes: &[u8]) -> u32 {
    bytes
        .iter()
        .fold(0u32, |h, &b| h.wrapping_mul(31).wrapping_add(u32::from(b)))
}
