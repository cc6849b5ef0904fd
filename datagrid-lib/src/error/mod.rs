//! Error types

mod config;
mod source;
mod transform;

pub use config::*;
pub use source::*;
pub use transform::*;

/// Top-level error returned by grid operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The grid was configured or used incorrectly.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The remote data source failed.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// A local transform could not be evaluated.
    #[error(transparent)]
    Transform(#[from] TransformError),
}

impl Error {
    /// Returns `true` if this error came from the remote data source.
    pub fn is_source(&self) -> bool {
        matches!(self, Self::Source(_))
    }
}
