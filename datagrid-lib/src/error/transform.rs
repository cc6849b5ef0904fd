//! Local transform error types

/// Errors raised while evaluating a filter, search or sort against one row.
///
/// These are always contained to the offending row: the row is treated as
/// non-matching (filters) or unorderable (sort).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransformError {
    /// The row value cannot be compared with the filter operand.
    #[error("Cannot compare {found} with {expected} in column {column:?}")]
    TypeMismatch {
        /// The filtered column.
        column: String,
        /// Type of the filter operand.
        expected: &'static str,
        /// Type of the row value.
        found: &'static str,
    },

    /// A custom filter names a predicate that was never registered.
    #[error("Unknown filter predicate: {0:?}")]
    UnknownPredicate(String),

    /// A collaborator-supplied predicate or comparator failed.
    #[error("Transform failed on column {column:?}: {message}")]
    Failed {
        /// The column being transformed.
        column: String,
        /// Description of the failure.
        message: String,
    },
}

impl TransformError {
    /// Creates a failure for a collaborator-supplied predicate or comparator.
    pub fn failed(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failed {
            column: column.into(),
            message: message.into(),
        }
    }
}
