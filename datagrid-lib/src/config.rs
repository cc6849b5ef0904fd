//! Grid configuration

use serde::Deserialize;

use crate::coordinator::Mode;
use crate::error::ConfigError;
use crate::query::DEFAULT_PAGE_SIZE;
use crate::selection::SelectionMode;
use crate::selection::DEFAULT_DRAG_THRESHOLD;
use crate::window::WindowConfig;

/// Configuration for a [`Grid`](crate::Grid).
///
/// Every field has a default, so a JSON config only needs the keys it
/// changes.
///
/// # Example
///
/// ```
/// use datagrid_lib::GridConfig;
/// use datagrid_lib::selection::SelectionMode;
///
/// let config = GridConfig::default()
///     .with_id_field("id")
///     .with_page_size(25)
///     .with_selection_mode(SelectionMode::Multi);
/// assert!(config.validate().is_ok());
///
/// let parsed = GridConfig::from_json(r#"{"idField": "id", "pageSize": 25, "selectionMode": "multi"}"#).unwrap();
/// assert_eq!(parsed, config);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GridConfig {
    /// Local or remote data.
    ///
    /// Default: local
    pub mode: Mode,

    /// Field that identifies a record. Records without it are identified by
    /// a hash of their content.
    pub id_field: Option<String>,

    /// Rows per page.
    ///
    /// Default: 10
    pub page_size: usize,

    /// When off, local mode renders the whole view instead of one page.
    ///
    /// Default: true
    pub pagination: bool,

    /// Default: none
    pub selection_mode: SelectionMode,

    /// Columns searched by local search. Empty searches every field.
    pub search_columns: Vec<String>,

    pub window: WindowConfig,

    /// Pointer travel (logical units) before a press becomes a drag.
    ///
    /// Default: 5.0
    pub drag_threshold: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Local,
            id_field: None,
            page_size: DEFAULT_PAGE_SIZE,
            pagination: true,
            selection_mode: SelectionMode::None,
            search_columns: Vec::new(),
            window: WindowConfig::default(),
            drag_threshold: DEFAULT_DRAG_THRESHOLD,
        }
    }
}

impl GridConfig {
    /// Parses and validates a JSON config.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets local or remote mode.
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the identity field.
    pub fn with_id_field(mut self, field: impl Into<String>) -> Self {
        self.id_field = Some(field.into());
        self
    }

    /// Sets the page size.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Turns pagination on or off.
    pub fn with_pagination(mut self, pagination: bool) -> Self {
        self.pagination = pagination;
        self
    }

    /// Sets the selection mode.
    pub fn with_selection_mode(mut self, mode: SelectionMode) -> Self {
        self.selection_mode = mode;
        self
    }

    /// Restricts search to these columns.
    pub fn with_search_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the window configuration.
    pub fn with_window(mut self, window: WindowConfig) -> Self {
        self.window = window;
        self
    }

    /// Sets the drag threshold.
    pub fn with_drag_threshold(mut self, threshold: f64) -> Self {
        self.drag_threshold = threshold;
        self
    }

    /// Checks that all values are in range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::InvalidPageSize(self.page_size));
        }
        if !(self.drag_threshold.is_finite() && self.drag_threshold >= 0.0) {
            return Err(ConfigError::InvalidWindow(format!(
                "drag threshold must be non-negative, got {}",
                self.drag_threshold
            )));
        }
        self.window.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GridConfig::default();
        assert_eq!(config.mode, Mode::Local);
        assert_eq!(config.page_size, 10);
        assert!(config.pagination);
        assert_eq!(config.selection_mode, SelectionMode::None);
        assert_eq!(config.drag_threshold, 5.0);
        assert_eq!(config.window.buffer, 5);
    }

    #[test]
    fn test_from_json_partial() {
        let config = GridConfig::from_json(
            r#"{"mode": "remote", "selectionMode": "multiple", "window": {"rowHeight": 30}}"#,
        )
        .unwrap();
        assert_eq!(config.mode, Mode::Remote);
        assert_eq!(config.selection_mode, SelectionMode::Multi);
        assert_eq!(config.window.row_height, Some(30.0));
        assert_eq!(config.window.buffer, 5);
    }

    #[test]
    fn test_from_json_rejects_bad_values() {
        assert!(matches!(
            GridConfig::from_json(r#"{"pageSize": 0}"#),
            Err(ConfigError::InvalidPageSize(0))
        ));
        assert!(matches!(
            GridConfig::from_json(r#"{"selectionMode": "many"}"#),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            GridConfig::from_json(r#"{"mode": "hybrid"}"#),
            Err(ConfigError::Parse(_))
        ));
    }
}
