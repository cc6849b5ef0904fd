//! CLI error type

use std::path::PathBuf;

use datagrid_lib::error::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{path} is not a JSON array of records: {source}")]
    Data {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Grid(#[from] datagrid_lib::Error),

    #[error("Failed to initialize logger: {0}")]
    Logger(#[from] log::SetLoggerError),
}
