//! In-memory filter, search and sort.
//!
//! Used by local mode directly and by [`MemoryDataSource`] to emulate a
//! server. Any failure is contained to the row it happened on: a row whose
//! filter cannot be evaluated does not match, and a row whose sort value
//! cannot be compared is placed after all orderable rows.
//!
//! [`MemoryDataSource`]: crate::source::MemoryDataSource

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::collections::HashMap;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::error::TransformError;
use crate::model::Record;
use crate::model::Value;
use crate::query::Direction;
use crate::query::FilterSpec;
use crate::query::SortSpec;

/// Predicate behind [`FilterSpec::Custom`]: `(row value, operand) -> matches`.
pub type Predicate = Arc<dyn Fn(&Value, &Value) -> Result<bool, TransformError> + Send + Sync>;

/// Column comparator overriding the default value order.
pub type Comparator = Arc<dyn Fn(&Value, &Value) -> Result<Ordering, TransformError> + Send + Sync>;

/// Application-supplied predicates and comparators.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use datagrid_lib::transform::Transforms;
/// use datagrid_lib::model::Value;
///
/// let transforms = Transforms::new()
///     .with_predicate("even", Arc::new(|v: &Value, _: &Value| {
///         Ok(v.as_f64().is_some_and(|n| n % 2.0 == 0.0))
///     }));
/// ```
#[derive(Clone, Default)]
pub struct Transforms {
    predicates: HashMap<String, Predicate>,
    comparators: HashMap<String, Comparator>,
}

impl fmt::Debug for Transforms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transforms")
            .field("predicates", &self.predicates.keys().collect::<Vec<_>>())
            .field("comparators", &self.comparators.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Transforms {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a named predicate for [`FilterSpec::Custom`].
    pub fn with_predicate(mut self, name: impl Into<String>, predicate: Predicate) -> Self {
        self.predicates.insert(name.into(), predicate);
        self
    }

    /// Registers a comparator for sorting one column.
    pub fn with_comparator(mut self, column: impl Into<String>, comparator: Comparator) -> Self {
        self.comparators.insert(column.into(), comparator);
        self
    }

    /// Evaluates one filter against one record.
    pub fn matches(&self, column: &str, spec: &FilterSpec, record: &Record) -> Result<bool, TransformError> {
        let value = record.get_or_null(column);
        let ordered = |operand: &Value, accept: fn(Ordering) -> bool| {
            value
                .partial_compare(operand)
                .map(accept)
                .ok_or_else(|| TransformError::TypeMismatch {
                    column: column.to_string(),
                    expected: operand.type_name(),
                    found: value.type_name(),
                })
        };

        match spec {
            FilterSpec::Eq(operand) => Ok(value.partial_compare(operand) == Some(Ordering::Equal)),
            FilterSpec::Ne(operand) => Ok(value.partial_compare(operand) != Some(Ordering::Equal)),
            FilterSpec::Gt(operand) => ordered(operand, |o| o == Ordering::Greater),
            FilterSpec::Ge(operand) => ordered(operand, |o| o != Ordering::Less),
            FilterSpec::Lt(operand) => ordered(operand, |o| o == Ordering::Less),
            FilterSpec::Le(operand) => ordered(operand, |o| o != Ordering::Greater),
            FilterSpec::Contains(needle) => Ok(text_of(value).is_some_and(|t| t.contains(&needle.to_lowercase()))),
            FilterSpec::StartsWith(prefix) => {
                Ok(text_of(value).is_some_and(|t| t.starts_with(&prefix.to_lowercase())))
            }
            FilterSpec::EndsWith(suffix) => Ok(text_of(value).is_some_and(|t| t.ends_with(&suffix.to_lowercase()))),
            FilterSpec::IsNull => Ok(value.is_null()),
            FilterSpec::IsNotNull => Ok(!value.is_null()),
            FilterSpec::Custom { name, value: operand } => {
                let predicate = self
                    .predicates
                    .get(name)
                    .ok_or_else(|| TransformError::UnknownPredicate(name.clone()))?;
                predicate(value, operand)
            }
        }
    }

    /// Compares two records on `column`, honoring a registered comparator.
    pub fn compare(&self, column: &str, a: &Record, b: &Record) -> Result<Ordering, TransformError> {
        let (a, b) = (a.get_or_null(column), b.get_or_null(column));
        match self.comparators.get(column) {
            Some(comparator) => comparator(a, b),
            None => Ok(a.total_cmp(b)),
        }
    }
}

/// Lowercased cell text for string matching; null has none.
fn text_of(value: &Value) -> Option<String> {
    (!value.is_null()).then(|| value.to_string().to_lowercase())
}

/// Returns `true` if `record` passes every filter.
pub fn passes_filters(record: &Record, filters: &BTreeMap<String, FilterSpec>, transforms: &Transforms) -> bool {
    filters
        .iter()
        .all(|(column, spec)| match transforms.matches(column, spec, record) {
            Ok(matched) => matched,
            Err(e) => {
                log::debug!("filter on {:?} treated as non-match: {}", column, e);
                false
            }
        })
}

/// Returns `true` if `record` contains `search` (case-insensitive).
///
/// Searches `columns`, or every field when `columns` is empty. An empty
/// search matches everything.
pub fn matches_search(record: &Record, search: &str, columns: &[String]) -> bool {
    let needle = search.to_lowercase();
    if needle.is_empty() {
        return true;
    }
    let hit = |value: &Value| text_of(value).is_some_and(|t| t.contains(&needle));
    if columns.is_empty() {
        record.fields().values().any(hit)
    } else {
        columns.iter().any(|c| record.get(c).is_some_and(hit))
    }
}

/// Sorts `indices` (into `records`) by `sort`. Stable.
///
/// Rows whose value the comparator cannot handle keep their relative order
/// and go after all orderable rows, for either direction.
///
/// A row is unorderable if it cannot be compared with itself, or if it is
/// the row failing against the most others when two rows cannot be
/// compared. Such rows are set aside and the rest sorted again until a
/// pass completes without failures.
pub fn sort_indices(indices: &mut Vec<usize>, records: &[Record], sort: &SortSpec, transforms: &Transforms) {
    let column = sort.column.as_str();
    let compare = |a: usize, b: usize| transforms.compare(column, &records[a], &records[b]);
    let mut unorderable: HashSet<usize> = indices.iter().copied().filter(|&i| compare(i, i).is_err()).collect();

    loop {
        let mut orderable: Vec<usize> = indices.iter().copied().filter(|i| !unorderable.contains(i)).collect();
        let mut failed = BTreeSet::new();
        merge_sort(&mut orderable, &mut |a, b| match compare(a, b) {
            Ok(ordering) => match sort.direction {
                Direction::Asc => ordering,
                Direction::Desc => ordering.reverse(),
            },
            Err(_) => {
                failed.insert(a);
                failed.insert(b);
                Ordering::Equal
            }
        });

        if failed.is_empty() {
            if !unorderable.is_empty() {
                log::debug!("{} rows unorderable on {:?}", unorderable.len(), column);
            }
            orderable.extend(indices.iter().copied().filter(|i| unorderable.contains(i)));
            *indices = orderable;
            return;
        }

        let failures: Vec<(usize, usize)> = failed
            .iter()
            .map(|&row| {
                let count = orderable
                    .iter()
                    .filter(|&&other| other != row && (compare(row, other).is_err() || compare(other, row).is_err()))
                    .count();
                (row, count)
            })
            .collect();
        let worst = failures.iter().map(|&(_, count)| count).max().unwrap_or(0);
        unorderable.extend(failures.iter().filter(|&&(_, count)| count == worst).map(|&(row, _)| row));
    }
}

/// Stable top-down merge sort. Unlike `slice::sort_by` it never panics on a
/// comparator that is not a total order.
fn merge_sort(items: &mut [usize], compare: &mut impl FnMut(usize, usize) -> Ordering) {
    if items.len() < 2 {
        return;
    }
    let mid = items.len() / 2;
    merge_sort(&mut items[..mid], compare);
    merge_sort(&mut items[mid..], compare);

    let mut merged = Vec::with_capacity(items.len());
    let (mut left, mut right) = (0, mid);
    while left < mid && right < items.len() {
        if compare(items[right], items[left]) == Ordering::Less {
            merged.push(items[right]);
            right += 1;
        } else {
            merged.push(items[left]);
            left += 1;
        }
    }
    merged.extend_from_slice(&items[left..mid]);
    merged.extend_from_slice(&items[right..]);
    items.copy_from_slice(&merged);
}

/// Computes the local view: indices of the records that pass filters and
/// search, in sort order.
pub fn apply_local(
    records: &[Record],
    filters: &BTreeMap<String, FilterSpec>,
    sort: Option<&SortSpec>,
    search: &str,
    search_columns: &[String],
    transforms: &Transforms,
) -> Vec<usize> {
    let mut indices: Vec<usize> = records
        .iter()
        .enumerate()
        .filter(|(_, r)| passes_filters(r, filters, transforms) && matches_search(r, search, search_columns))
        .map(|(i, _)| i)
        .collect();

    if let Some(sort) = sort {
        sort_indices(&mut indices, records, sort, transforms);
    }
    indices
}

#[cfg(test)]
mod tests {
    use super::*;

    fn people() -> Vec<Record> {
        vec![
            Record::new().set("id", 1).set("name", "Alice").set("age", 34),
            Record::new().set("id", 2).set("name", "bob").set("age", 27),
            Record::new().set("id", 3).set("name", "Carol").set("age", "unknown"),
            Record::new().set("id", 4).set("name", "Dave").set("age", 41),
            Record::new().set("id", 5).set("name", "Eve"),
        ]
    }

    fn ids(records: &[Record], indices: &[usize]) -> Vec<i64> {
        indices
            .iter()
            .map(|&i| match records[i].get("id") {
                Some(Value::Int(n)) => *n,
                _ => -1,
            })
            .collect()
    }

    #[test]
    fn test_type_mismatch_is_non_match() {
        let records = people();
        let filters = BTreeMap::from([("age".to_string(), FilterSpec::gt(30))]);
        let view = apply_local(&records, &filters, None, "", &[], &Transforms::new());
        assert_eq!(ids(&records, &view), vec![1, 4]);
    }

    #[test]
    fn test_string_filters_are_case_insensitive() {
        let records = people();
        let filters = BTreeMap::from([("name".to_string(), FilterSpec::starts_with("B"))]);
        let view = apply_local(&records, &filters, None, "", &[], &Transforms::new());
        assert_eq!(ids(&records, &view), vec![2]);
    }

    #[test]
    fn test_null_filters() {
        let records = people();
        let transforms = Transforms::new();
        assert!(transforms.matches("age", &FilterSpec::IsNull, &records[4]).unwrap());
        assert!(transforms.matches("age", &FilterSpec::IsNotNull, &records[0]).unwrap());
    }

    #[test]
    fn test_unknown_predicate_is_contained() {
        let records = people();
        let filters = BTreeMap::from([("age".to_string(), FilterSpec::custom("missing", 1))]);
        let view = apply_local(&records, &filters, None, "", &[], &Transforms::new());
        assert!(view.is_empty());
    }

    #[test]
    fn test_custom_predicate() {
        let records = people();
        let transforms = Transforms::new().with_predicate(
            "older_than",
            Arc::new(|v: &Value, operand: &Value| match (v.as_f64(), operand.as_f64()) {
                (Some(a), Some(b)) => Ok(a > b),
                _ => Err(TransformError::failed("age", "not a number")),
            }),
        );
        let filters = BTreeMap::from([("age".to_string(), FilterSpec::custom("older_than", 30))]);
        let view = apply_local(&records, &filters, None, "", &[], &transforms);
        assert_eq!(ids(&records, &view), vec![1, 4]);
    }

    #[test]
    fn test_search_all_fields_and_columns() {
        let records = people();
        let view = apply_local(&records, &BTreeMap::new(), None, "AL", &[], &Transforms::new());
        assert_eq!(ids(&records, &view), vec![1]);

        let view = apply_local(&records, &BTreeMap::new(), None, "4", &["age".to_string()], &Transforms::new());
        assert_eq!(ids(&records, &view), vec![1, 4]);
    }

    #[test]
    fn test_search_keeps_surrounding_whitespace() {
        let records = vec![
            Record::new().set("id", 1).set("name", "item"),
            Record::new().set("id", 2).set("name", "item two"),
        ];
        let view = apply_local(&records, &BTreeMap::new(), None, "item ", &[], &Transforms::new());
        assert_eq!(ids(&records, &view), vec![2]);
    }

    #[test]
    fn test_failing_comparator_sorts_row_last() {
        let records = people();
        let numeric_only: Comparator = Arc::new(|a: &Value, b: &Value| match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => Ok(x.total_cmp(&y)),
            _ => Err(TransformError::failed("age", "not numeric")),
        });
        let transforms = Transforms::new().with_comparator("age", numeric_only);

        let view = apply_local(&records, &BTreeMap::new(), Some(&SortSpec::asc("age")), "", &[], &transforms);
        assert_eq!(ids(&records, &view), vec![2, 1, 4, 3, 5]);

        let view = apply_local(&records, &BTreeMap::new(), Some(&SortSpec::desc("age")), "", &[], &transforms);
        assert_eq!(ids(&records, &view), vec![4, 1, 2, 3, 5]);
    }

    #[test]
    fn test_cross_kind_failures_keep_orderable_rows_sorted() {
        // every third row holds text; the comparator only fails across kinds
        let records: Vec<Record> = (0..200i64)
            .map(|i| {
                let record = Record::new().set("id", i);
                if i % 3 == 0 {
                    record.set("key", format!("text {}", i))
                } else {
                    record.set("key", (i * 37) % 101)
                }
            })
            .collect();
        let same_kind: Comparator = Arc::new(|a: &Value, b: &Value| match (a, b) {
            (Value::Int(x), Value::Int(y)) => Ok(x.cmp(y)),
            (Value::String(x), Value::String(y)) => Ok(x.cmp(y)),
            _ => Err(TransformError::failed("key", "mixed kinds")),
        });
        let transforms = Transforms::new().with_comparator("key", same_kind);

        for sort in [SortSpec::asc("key"), SortSpec::desc("key")] {
            let view = apply_local(&records, &BTreeMap::new(), Some(&sort), "", &[], &transforms);
            assert_eq!(view.len(), 200);

            let (head, tail) = view.split_at(133);
            let keys: Vec<i64> = head
                .iter()
                .map(|&i| match records[i].get("key") {
                    Some(Value::Int(n)) => *n,
                    other => panic!("text row {:?} sorted among numbers", other),
                })
                .collect();
            let mut expected = keys.clone();
            expected.sort();
            if sort.direction == Direction::Desc {
                expected.reverse();
            }
            assert_eq!(keys, expected);

            let text_rows: Vec<usize> = (0..200).filter(|i| i % 3 == 0).collect();
            assert_eq!(tail, text_rows.as_slice());
        }
    }

    #[test]
    fn test_default_sort_is_total() {
        let records = people();
        let view = apply_local(&records, &BTreeMap::new(), Some(&SortSpec::asc("age")), "", &[], &Transforms::new());
        // null < numbers < strings
        assert_eq!(ids(&records, &view), vec![5, 2, 1, 4, 3]);
    }
}
