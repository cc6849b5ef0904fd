//! User actions.

use super::Direction;
use super::FilterSpec;
use super::SortSpec;

/// A user action that may change which rows the grid shows.
///
/// Every action writes through the operation state. Actions that change
/// sort, filters or search send the grid back to page 1.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Go to a page (1-based, clamped to the last page).
    SetPage(usize),
    /// Go to the next page, if any.
    NextPage,
    /// Go to the previous page, if any.
    PrevPage,
    /// Change the page size and return to page 1.
    SetPageSize(usize),
    /// Sort on a column.
    Sort(SortSpec),
    /// Header click: cycle a column through none, asc, desc.
    ToggleSort(String),
    /// Remove the sort.
    ClearSort,
    /// Set or replace the filter on a column.
    SetFilter {
        /// The filtered column.
        column: String,
        /// The condition.
        spec: FilterSpec,
    },
    /// Remove the filter on a column.
    ClearFilter(String),
    /// Remove all filters.
    ClearFilters,
    /// Set the free-text search.
    Search(String),
    /// Fetch or recompute the current view again.
    Reload,
}

impl Action {
    /// Creates a sort action.
    pub fn sort(column: impl Into<String>, direction: Direction) -> Self {
        Action::Sort(SortSpec {
            column: column.into(),
            direction,
        })
    }

    /// Creates a filter action.
    pub fn filter(column: impl Into<String>, spec: FilterSpec) -> Self {
        Action::SetFilter {
            column: column.into(),
            spec,
        }
    }

    /// Creates a search action.
    pub fn search(text: impl Into<String>) -> Self {
        Action::Search(text.into())
    }

    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Action::SetPage(_) => "set_page",
            Action::NextPage => "next_page",
            Action::PrevPage => "prev_page",
            Action::SetPageSize(_) => "set_page_size",
            Action::Sort(_) => "sort",
            Action::ToggleSort(_) => "toggle_sort",
            Action::ClearSort => "clear_sort",
            Action::SetFilter { .. } => "set_filter",
            Action::ClearFilter(_) => "clear_filter",
            Action::ClearFilters => "clear_filters",
            Action::Search(_) => "search",
            Action::Reload => "reload",
        }
    }
}
