//! Normalized remote request payload.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use super::Direction;
use super::FilterSpec;
use super::SortSpec;

/// The one request shape sent to a remote data source.
///
/// Built from the whole operation state on every fetch. `sort`, `filters`
/// and `search` are never null: no sort is `{}`, no filters is `{}`, no
/// search is `""`.
///
/// ```
/// use datagrid_lib::query::OperationState;
///
/// let params = OperationState::new(25).to_params();
/// assert_eq!(
///     serde_json::to_string(&params).unwrap(),
///     r#"{"page":1,"pageSize":25,"sort":{},"filters":{},"search":""}"#
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestParams {
    pub page: usize,
    pub page_size: usize,
    #[serde(default)]
    pub sort: SortParam,
    #[serde(default)]
    pub filters: BTreeMap<String, FilterSpec>,
    #[serde(default)]
    pub search: String,
}

impl RequestParams {
    /// Zero-based index of the first row of the requested page.
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }
}

/// Sort part of the payload: `{}` or `{"column": ..., "direction": ...}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortParam {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
}

impl SortParam {
    /// Returns `true` for the empty `{}` sort.
    pub fn is_empty(&self) -> bool {
        self.column.is_none()
    }

    /// Converts back to a sort spec. A column without direction sorts ascending.
    pub fn to_spec(&self) -> Option<SortSpec> {
        self.column.as_ref().map(|column| SortSpec {
            column: column.clone(),
            direction: self.direction.unwrap_or(Direction::Asc),
        })
    }
}

impl From<Option<&SortSpec>> for SortParam {
    fn from(sort: Option<&SortSpec>) -> Self {
        match sort {
            Some(spec) => Self {
                column: Some(spec.column.clone()),
                direction: Some(spec.direction),
            },
            None => Self::default(),
        }
    }
}
