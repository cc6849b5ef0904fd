//! Per-column filter descriptions.

use serde::Deserialize;
use serde::Serialize;

use crate::model::Value;

/// A filter condition on one column.
///
/// Filters live in the operation state keyed by column, so the column name is
/// not stored on the filter itself. All filters on a grid are combined with AND.
///
/// Serialized adjacently tagged, which is the shape remote sources receive:
///
/// ```
/// use datagrid_lib::query::FilterSpec;
///
/// let json = serde_json::to_string(&FilterSpec::gt(10)).unwrap();
/// assert_eq!(json, r#"{"op":"gt","value":10}"#);
///
/// let json = serde_json::to_string(&FilterSpec::IsNull).unwrap();
/// assert_eq!(json, r#"{"op":"isNull"}"#);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "value", rename_all = "camelCase")]
pub enum FilterSpec {
    /// Equality: `column == value`
    Eq(Value),
    /// Not equal: `column != value`
    Ne(Value),
    /// Greater than: `column > value`
    Gt(Value),
    /// Greater than or equal: `column >= value`
    Ge(Value),
    /// Less than: `column < value`
    Lt(Value),
    /// Less than or equal: `column <= value`
    Le(Value),
    /// Case-insensitive substring match.
    Contains(String),
    /// Case-insensitive prefix match.
    StartsWith(String),
    /// Case-insensitive suffix match.
    EndsWith(String),
    /// Column is null or missing.
    IsNull,
    /// Column is present and not null.
    IsNotNull,
    /// Named predicate registered by the application.
    Custom {
        /// Registered predicate name.
        name: String,
        /// Operand handed to the predicate.
        value: Value,
    },
}

impl FilterSpec {
    /// Creates an equality filter.
    pub fn eq(value: impl Into<Value>) -> Self {
        FilterSpec::Eq(value.into())
    }

    /// Creates a not-equal filter.
    pub fn ne(value: impl Into<Value>) -> Self {
        FilterSpec::Ne(value.into())
    }

    /// Creates a greater-than filter.
    pub fn gt(value: impl Into<Value>) -> Self {
        FilterSpec::Gt(value.into())
    }

    /// Creates a greater-than-or-equal filter.
    pub fn ge(value: impl Into<Value>) -> Self {
        FilterSpec::Ge(value.into())
    }

    /// Creates a less-than filter.
    pub fn lt(value: impl Into<Value>) -> Self {
        FilterSpec::Lt(value.into())
    }

    /// Creates a less-than-or-equal filter.
    pub fn le(value: impl Into<Value>) -> Self {
        FilterSpec::Le(value.into())
    }

    /// Creates a substring filter.
    pub fn contains(value: impl Into<String>) -> Self {
        FilterSpec::Contains(value.into())
    }

    /// Creates a prefix filter.
    pub fn starts_with(value: impl Into<String>) -> Self {
        FilterSpec::StartsWith(value.into())
    }

    /// Creates a suffix filter.
    pub fn ends_with(value: impl Into<String>) -> Self {
        FilterSpec::EndsWith(value.into())
    }

    /// Creates a filter backed by a registered predicate.
    pub fn custom(name: impl Into<String>, value: impl Into<Value>) -> Self {
        FilterSpec::Custom {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_shapes() {
        assert_eq!(
            serde_json::to_value(FilterSpec::contains("Corp")).unwrap(),
            serde_json::json!({"op": "contains", "value": "Corp"})
        );
        assert_eq!(
            serde_json::to_value(FilterSpec::custom("between", 5)).unwrap(),
            serde_json::json!({"op": "custom", "value": {"name": "between", "value": 5}})
        );
    }

    #[test]
    fn test_deserialize() {
        let spec: FilterSpec = serde_json::from_str(r#"{"op":"startsWith","value":"A"}"#).unwrap();
        assert_eq!(spec, FilterSpec::starts_with("A"));
        let spec: FilterSpec = serde_json::from_str(r#"{"op":"isNotNull"}"#).unwrap();
        assert_eq!(spec, FilterSpec::IsNotNull);
    }
}
