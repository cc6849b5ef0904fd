//! Configuration error types

/// Errors raised synchronously when the grid is misconfigured or misused.
///
/// The mutation that triggered the error is never applied.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Unknown selection mode string.
    #[error("Invalid selection mode: {0:?} (expected \"none\", \"single\" or \"multi\")")]
    InvalidSelectionMode(String),

    /// The configured identity field does not identify records uniquely.
    #[error("Identity field {field:?} is ambiguous: value {value:?} appears more than once")]
    DuplicateIdentity {
        /// The configured identity field.
        field: String,
        /// The repeated value.
        value: String,
    },

    /// Page size must be positive.
    #[error("Invalid page size: {0}")]
    InvalidPageSize(usize),

    /// Window configuration is out of range.
    #[error("Invalid window configuration: {0}")]
    InvalidWindow(String),

    /// Remote mode needs a data source.
    #[error("Remote mode requires a data source")]
    MissingSource,

    /// The operation is not available in the current mode.
    #[error("{operation} is not supported in {mode} mode")]
    UnsupportedInMode {
        /// The rejected operation.
        operation: &'static str,
        /// The active mode.
        mode: &'static str,
    },

    /// Configuration could not be parsed.
    #[error("Config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
