//! Error types for the table layer.

use thiserror::Error;

use crate::grid::GridError;
use crate::migrate::MigrationStep;

/// Errors that can occur in gridtable operations
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed input (column letters, table or column definitions, versions)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Logical row indices start at 1
    #[error("Row index {0} out of range (must be >= 1)")]
    IndexOutOfRange(u32),

    /// Unknown column or table
    #[error("Not found: {0}")]
    NotFound(String),

    /// Cell text could not be read as the requested type
    #[error("Cannot read '{value}' as {expected}")]
    Format {
        value: String,
        expected: &'static str,
    },

    /// Value count does not match the table's column count
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    /// The grid refused or failed a request
    #[error("Grid error: {0}")]
    Remote(#[from] GridError),

    /// A grid failure in the middle of a migration
    #[error("Migration failed during {step}: {source}")]
    Migration {
        step: MigrationStep,
        #[source]
        source: GridError,
    },
}

impl Error {
    /// True if the failure came from the grid rather than from validation
    pub fn is_remote(&self) -> bool {
        matches!(self, Error::Remote(_) | Error::Migration { .. })
    }

    pub(crate) fn schema_mismatch(expected: usize, actual: usize) -> Self {
        Error::SchemaMismatch(format!("expected {} values, got {}", expected, actual))
    }
}

impl From<gridtable_core::Error> for Error {
    fn from(err: gridtable_core::Error) -> Self {
        Error::InvalidArgument(err.to_string())
    }
}

/// Result type alias for gridtable operations
pub type Result<T> = std::result::Result<T, Error>;
