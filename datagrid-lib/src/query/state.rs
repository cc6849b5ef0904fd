//! The canonical operation state.

use std::collections::BTreeMap;

use super::Action;
use super::FilterSpec;
use super::RequestParams;
use super::SortParam;
use super::SortSpec;
use crate::error::ConfigError;

/// Default number of rows per page.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// What an applied action requires from the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Effect {
    /// Same view, different page.
    Page,
    /// Sort, filters, search or page size changed.
    View,
    /// Nothing changed in the state; recompute or refetch anyway.
    Reload,
}

/// Current page, sort, filters and search of a grid.
///
/// This is the only place these four concerns are stored. Readers get shared
/// references; only the request coordinator applies actions to it.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationState {
    page: usize,
    page_size: usize,
    sort: Option<SortSpec>,
    filters: BTreeMap<String, FilterSpec>,
    search: String,
}

impl Default for OperationState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl OperationState {
    /// Creates a state on page 1 with no sort, filters or search.
    pub fn new(page_size: usize) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            sort: None,
            filters: BTreeMap::new(),
            search: String::new(),
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Current page (1-based).
    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn sort(&self) -> Option<&SortSpec> {
        self.sort.as_ref()
    }

    pub fn filters(&self) -> &BTreeMap<String, FilterSpec> {
        &self.filters
    }

    /// Filter on one column, if any.
    pub fn filter(&self, column: &str) -> Option<&FilterSpec> {
        self.filters.get(column)
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    /// Zero-based index of the first row of the current page.
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }

    /// Number of pages for `total_rows` rows. Never less than 1.
    pub fn total_pages(&self, total_rows: usize) -> usize {
        total_rows.div_ceil(self.page_size).max(1)
    }

    /// Builds the normalized request payload from the whole state.
    pub fn to_params(&self) -> RequestParams {
        RequestParams {
            page: self.page,
            page_size: self.page_size,
            sort: SortParam::from(self.sort.as_ref()),
            filters: self.filters.clone(),
            search: self.search.clone(),
        }
    }

    // -------------------------------------------------------------------------
    // Mutation (coordinator only)
    // -------------------------------------------------------------------------

    /// Applies an action.
    ///
    /// `known_total` is the last known row count; page moves are clamped to
    /// it when present. Sort, filter and search changes reset to page 1.
    pub(crate) fn apply(&mut self, action: &Action, known_total: Option<usize>) -> Result<Effect, ConfigError> {
        let effect = match action {
            Action::SetPage(page) => {
                self.page = (*page).max(1);
                Effect::Page
            }
            Action::NextPage => {
                self.page = self.page.saturating_add(1);
                Effect::Page
            }
            Action::PrevPage => {
                self.page = self.page.saturating_sub(1).max(1);
                Effect::Page
            }
            Action::SetPageSize(size) => {
                if *size == 0 {
                    return Err(ConfigError::InvalidPageSize(0));
                }
                self.page_size = *size;
                Effect::View
            }
            Action::Sort(spec) => {
                self.sort = Some(spec.clone());
                Effect::View
            }
            Action::ToggleSort(column) => {
                self.sort = SortSpec::cycle(self.sort.as_ref(), column);
                Effect::View
            }
            Action::ClearSort => {
                self.sort = None;
                Effect::View
            }
            Action::SetFilter { column, spec } => {
                self.filters.insert(column.clone(), spec.clone());
                Effect::View
            }
            Action::ClearFilter(column) => {
                self.filters.remove(column);
                Effect::View
            }
            Action::ClearFilters => {
                self.filters.clear();
                Effect::View
            }
            Action::Search(text) => {
                self.search = text.clone();
                Effect::View
            }
            Action::Reload => Effect::Reload,
        };

        match effect {
            Effect::View => self.page = 1,
            Effect::Page => {
                if let Some(total) = known_total {
                    self.clamp_page(total);
                }
            }
            Effect::Reload => {}
        }
        Ok(effect)
    }

    /// Clamps the page into `1..=total_pages`. Returns `true` if it moved.
    pub(crate) fn clamp_page(&mut self, total_rows: usize) -> bool {
        let clamped = self.page.clamp(1, self.total_pages(total_rows));
        let moved = clamped != self.page;
        self.page = clamped;
        moved
    }
}
