//! Records - one row of a table

use gridtable_core::CellValue;

use crate::error::{Error, Result};

/// One row of a table.
///
/// `row_index` is the 1-based logical position of the row among the table's
/// data rows (0 for a record that has not been read from a grid). A record
/// returned by a query is a snapshot: any delete or truncate that touches
/// rows at or above its position makes the index stale.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Record {
    row_index: u32,
    values: Vec<CellValue>,
}

impl Record {
    /// Create an unplaced record, typically for insert
    pub fn new<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        Self {
            row_index: 0,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Same record placed at a logical row
    pub fn with_row_index(mut self, row_index: u32) -> Self {
        self.row_index = row_index;
        self
    }

    /// Build a record from wire text, padded with empty cells to `width`
    pub(crate) fn from_wire(row_index: u32, cells: Vec<String>, width: usize) -> Self {
        let mut values: Vec<CellValue> = cells.into_iter().map(CellValue::from_wire).collect();
        if values.len() < width {
            values.resize(width, CellValue::Empty);
        }
        Self { row_index, values }
    }

    pub fn row_index(&self) -> u32 {
        self.row_index
    }

    pub fn values(&self) -> &[CellValue] {
        &self.values
    }

    pub fn into_values(self) -> Vec<CellValue> {
        self.values
    }

    /// Replace all values; the row index is kept
    pub fn set_values<I, V>(&mut self, values: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        self.values = values.into_iter().map(Into::into).collect();
    }

    /// Set a single value
    pub fn set(&mut self, column: usize, value: impl Into<CellValue>) -> Result<()> {
        let len = self.values.len();
        let slot = self
            .values
            .get_mut(column)
            .ok_or_else(|| column_out_of_range(column, len))?;
        *slot = value.into();
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// True if every value is empty
    pub fn is_blank(&self) -> bool {
        self.values.iter().all(CellValue::is_empty)
    }

    // === Typed access ===

    /// Value at a column position
    pub fn get(&self, column: usize) -> Result<&CellValue> {
        self.values
            .get(column)
            .ok_or_else(|| column_out_of_range(column, self.values.len()))
    }

    /// Text form of a value (empty cells read as "")
    pub fn get_str(&self, column: usize) -> Result<String> {
        Ok(self.get(column)?.to_wire())
    }

    /// Parse a value as an integer
    pub fn get_int(&self, column: usize) -> Result<i64> {
        let text = self.get_str(column)?;
        text.trim().parse().map_err(|_| Error::Format {
            value: text,
            expected: "an integer",
        })
    }

    /// Parse a value as a floating point number
    pub fn get_float(&self, column: usize) -> Result<f64> {
        let text = self.get_str(column)?;
        text.trim().parse().map_err(|_| Error::Format {
            value: text,
            expected: "a number",
        })
    }
}

fn column_out_of_range(column: usize, len: usize) -> Error {
    Error::InvalidArgument(format!(
        "column {} out of range for a record with {} values",
        column, len
    ))
}
