//! The remote grid capability.
//!
//! Everything the table layer needs from a sheet-like backend is expressed by
//! [`GridService`]. A real deployment talks to an HTTP spreadsheet service;
//! [`MemoryGrid`](crate::memory::MemoryGrid) is the in-process implementation
//! bundled with this crate. Cell values always travel as text.

use gridtable_core::{CellValue, GridRange, SheetId};
use thiserror::Error;

/// Failure at the grid boundary.
///
/// These are never retried by the table layer; they reach the caller as
/// [`Error::Remote`](crate::Error::Remote).
#[derive(Debug, Error)]
pub enum GridError {
    #[error("sheet not found: {0}")]
    SheetNotFound(String),

    #[error("request rejected: {0}")]
    Rejected(String),

    #[error("grid service unavailable: {0}")]
    Unavailable(String),
}

impl From<gridtable_core::Error> for GridError {
    fn from(err: gridtable_core::Error) -> Self {
        match err {
            gridtable_core::Error::SheetNotFound(name) => GridError::SheetNotFound(name),
            other => GridError::Rejected(other.to_string()),
        }
    }
}

pub type GridResult<T> = std::result::Result<T, GridError>;

/// One mutation inside a [`GridService::batch_mutate`] envelope.
///
/// Row numbers are physical and 1-based (row 1 is the header row).
#[derive(Debug, Clone, PartialEq)]
pub enum GridOp {
    /// Append rows after the sheet's used range
    AppendRows {
        sheet: String,
        rows: Vec<Vec<CellValue>>,
    },
    /// Overwrite a range with the given rows (cells not covered are cleared)
    WriteRange {
        range: GridRange,
        rows: Vec<Vec<CellValue>>,
    },
    /// Clear the values of a range
    ClearRange(GridRange),
    /// Structurally remove `count` rows starting at `start_row`; rows below
    /// move up
    DeleteRows {
        sheet: String,
        start_row: u32,
        count: u32,
    },
    /// Change a sheet's title, keeping its id and contents
    RenameSheet { from: String, to: String },
}

impl GridOp {
    /// Short name used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            GridOp::AppendRows { .. } => "append_rows",
            GridOp::WriteRange { .. } => "write_range",
            GridOp::ClearRange(_) => "clear_range",
            GridOp::DeleteRows { .. } => "delete_rows",
            GridOp::RenameSheet { .. } => "rename_sheet",
        }
    }
}

/// Tabular remote-store capability.
///
/// Every method is one blocking round trip. Timeouts, retries and
/// authentication belong to the implementation, not to callers.
pub trait GridService: Send + Sync {
    /// Id of the sheet with this exact name, if it exists
    fn find_sheet_id(&self, name: &str) -> GridResult<Option<SheetId>>;

    /// Names of all sheets, in document order
    fn sheet_names(&self) -> GridResult<Vec<String>>;

    /// Add an empty sheet
    fn create_sheet(&self, name: &str) -> GridResult<SheetId>;

    /// Remove a sheet and its contents
    fn delete_sheet(&self, name: &str) -> GridResult<()>;

    /// Read a range as text.
    ///
    /// Rows may be shorter than the range is wide (trailing blank cells are
    /// omitted), blank rows inside the range come back empty, and trailing
    /// blank rows are not returned at all.
    fn read_range(&self, range: &GridRange) -> GridResult<Vec<Vec<String>>>;

    /// Overwrite a range
    fn write_range(&self, range: &GridRange, rows: &[Vec<CellValue>]) -> GridResult<()>;

    /// Append rows after the sheet's used range
    fn append_rows(&self, sheet: &str, rows: &[Vec<CellValue>]) -> GridResult<()>;

    /// Clear the values of a range
    fn clear_range(&self, range: &GridRange) -> GridResult<()>;

    /// Apply all operations in order as one request; either all of them take
    /// effect or none do
    fn batch_mutate(&self, ops: &[GridOp]) -> GridResult<()>;
}
