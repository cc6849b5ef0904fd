//! Lifecycle events

use crate::selection::SelectionChange;

/// Signals raised by a [`Grid`](crate::Grid).
///
/// Delivered over a broadcast channel; see [`Grid::subscribe`](crate::Grid::subscribe).
#[derive(Debug, Clone, PartialEq)]
pub enum GridEvent {
    /// The buffer contents were replaced (local load or remote fetch).
    DataReplaced { total_rows: usize },
    /// The displayed view changed (page, sort, filters or search).
    ViewUpdated { page: usize, total_pages: usize, total_rows: usize },
    /// The selected set or the anchor changed.
    SelectionChanged(SelectionChange),
    /// A remote fetch failed; the previous data is still shown.
    FetchFailed { generation: u64, message: String },
}
