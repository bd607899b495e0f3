//! Cell-related types and utilities
//!
//! This module contains:
//! - [`CellValue`] - The value stored in a cell
//! - [`CellAddress`] - A cell's location (e.g., "A1")
//! - [`GridRange`] - A sheet-qualified range (e.g., "member!A2:D10")
//! - [`column_letters`] / [`column_index`] - Column notation

mod address;
mod value;

pub use address::{column_index, column_letters, CellAddress, GridRange};
pub use value::CellValue;
