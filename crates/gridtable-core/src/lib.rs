//! # gridtable-core
//!
//! Core data structures for the gridtable library.
//!
//! This crate provides the grid-level types used throughout gridtable:
//! - [`column_letters`] / [`column_index`] - Spreadsheet column notation
//! - [`CellAddress`] and [`GridRange`] - Cell addressing and sheet-qualified ranges
//! - [`CellValue`] - Scalar cell values and their wire text form
//! - [`Workbook`], [`Worksheet`] - An in-memory grid of named sheets
//!
//! ## Example
//!
//! ```rust
//! use gridtable_core::{GridRange, Workbook};
//!
//! let mut workbook = Workbook::new();
//! workbook.add_worksheet_with_name("member").unwrap();
//!
//! let sheet = workbook.worksheet_by_name_mut("member").unwrap();
//! sheet.set_cell_value_at(0, 0, "name").unwrap();
//! sheet.set_cell_value_at(1, 0, "Aiko").unwrap();
//!
//! let range = GridRange::rows("member", 2, None, 1).unwrap();
//! assert_eq!(range.to_string(), "member!A2:A");
//! assert_eq!(sheet.read_range(&range), vec![vec!["Aiko".to_string()]]);
//! ```

pub mod cell;
pub mod error;
pub mod workbook;
pub mod worksheet;

// Re-exports for convenience
pub use cell::{column_index, column_letters, CellAddress, CellValue, GridRange};
pub use error::{Error, Result};
pub use workbook::Workbook;
pub use worksheet::Worksheet;

/// Stable identifier of a sheet within a workbook
pub type SheetId = u32;

/// Maximum number of rows in a worksheet
pub const MAX_ROWS: u32 = 10_000_000;

/// Maximum number of columns addressable with two-letter notation (ZZ)
pub const MAX_COLS: u32 = 26 * 26 + 26;

/// Maximum length of a sheet name
pub const MAX_SHEET_NAME_LEN: usize = 100;

/// Name of the sheet a fresh workbook starts with
pub const DEFAULT_SHEET_NAME: &str = "Sheet1";
