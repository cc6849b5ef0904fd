//! Dynamic grid record

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use super::Value;

/// One row of grid data: an opaque mapping of field name to value.
///
/// Fields are kept in a `BTreeMap`, so iteration and serialization are
/// ordered by field name. Position in the dataset is never part of a record.
///
/// # Example
///
/// ```
/// use datagrid_lib::model::Record;
///
/// let record = Record::new()
///     .set("id", 7)
///     .set("name", "Contoso");
///
/// assert_eq!(record.get("name").and_then(|v| v.as_str()), Some("Contoso"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, Value>,
}

impl Record {
    /// Creates a new empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field value (builder pattern).
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Sets a field value in place, returning the previous value.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(field.into(), value.into())
    }

    /// Returns a reference to the field value, if it exists.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Returns the field value, treating a missing field as null.
    pub fn get_or_null(&self, field: &str) -> &Value {
        self.fields.get(field).unwrap_or(&Value::Null)
    }

    /// Returns `true` if the record contains the given field.
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Returns a reference to all fields.
    pub fn fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }

    /// Returns the number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Serializes the record to its canonical JSON bytes.
    ///
    /// Field order is sorted, so equal records always produce equal bytes.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        serde_json::to_vec(&self.fields).unwrap_or_else(|_| format!("{:?}", self.fields).into_bytes())
    }
}

impl From<BTreeMap<String, Value>> for Record {
    fn from(fields: BTreeMap<String, Value>) -> Self {
        Self { fields }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_record() {
        let json = r#"{"name": "Contoso", "revenue": 1000000, "active": true}"#;
        let record: Record = serde_json::from_str(json).unwrap();

        assert_eq!(record.get("name"), Some(&Value::from("Contoso")));
        assert_eq!(record.get("revenue"), Some(&Value::Int(1_000_000)));
        assert_eq!(record.len(), 3);
    }

    #[test]
    fn test_canonical_bytes_ignore_insertion_order() {
        let a = Record::new().set("b", 2).set("a", 1);
        let b = Record::new().set("a", 1).set("b", 2);
        assert_eq!(a.canonical_bytes(), b.canonical_bytes());
        assert_eq!(a.canonical_bytes(), br#"{"a":1,"b":2}"#.to_vec());
    }

    #[test]
    fn test_missing_field_is_null() {
        let record = Record::new();
        assert!(record.get_or_null("anything").is_null());
    }
}
