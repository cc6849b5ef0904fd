//! Sort types.

use serde::Deserialize;
use serde::Serialize;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Ascending order (A-Z, 0-9).
    Asc,
    /// Descending order (Z-A, 9-0).
    Desc,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }
}

/// Sort on a single column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub column: String,
    pub direction: Direction,
}

impl SortSpec {
    /// Creates an ascending sort on a column.
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: Direction::Asc,
        }
    }

    /// Creates a descending sort on a column.
    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: Direction::Desc,
        }
    }

    /// Next state of a header click on `column`: none -> asc -> desc -> none.
    ///
    /// Clicking a different column starts that column at ascending.
    pub fn cycle(current: Option<&SortSpec>, column: &str) -> Option<SortSpec> {
        match current {
            Some(spec) if spec.column == column => match spec.direction {
                Direction::Asc => Some(SortSpec::desc(column)),
                Direction::Desc => None,
            },
            _ => Some(SortSpec::asc(column)),
        }
    }
}
