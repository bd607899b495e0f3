//! Worksheet type

use std::collections::BTreeMap;

use crate::cell::{CellValue, GridRange};
use crate::error::{Error, Result};
use crate::{SheetId, MAX_COLS, MAX_ROWS};

/// A worksheet (single sheet in a workbook)
///
/// Cells are stored sparsely, row-major:
/// `BTreeMap<row_index, BTreeMap<col_index, CellValue>>`, both 0-based.
/// Only non-empty cells are kept, so a row key exists iff the row has data.
#[derive(Debug, Clone)]
pub struct Worksheet {
    /// Stable sheet id (survives renames)
    id: SheetId,
    /// Sheet name
    name: String,
    /// Row index → column map
    rows: BTreeMap<u32, BTreeMap<u32, CellValue>>,
}

impl Worksheet {
    /// Create a new worksheet with the given id and name
    pub fn new<S: Into<String>>(id: SheetId, name: S) -> Self {
        Self {
            id,
            name: name.into(),
            rows: BTreeMap::new(),
        }
    }

    /// Get the sheet id
    pub fn id(&self) -> SheetId {
        self.id
    }

    /// Get the sheet name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the sheet name
    pub(crate) fn set_name<S: Into<String>>(&mut self, name: S) {
        self.name = name.into();
    }

    // === Cell Access ===

    /// Get cell value by indices
    pub fn get_value_at(&self, row: u32, col: u32) -> CellValue {
        self.rows
            .get(&row)
            .and_then(|r| r.get(&col))
            .cloned()
            .unwrap_or(CellValue::Empty)
    }

    /// Set a cell value by row and column indices
    ///
    /// Setting an empty value removes the cell.
    pub fn set_cell_value_at<V: Into<CellValue>>(
        &mut self,
        row: u32,
        col: u32,
        value: V,
    ) -> Result<()> {
        self.validate_cell_position(row, col)?;

        let value = value.into();
        if value.is_empty() {
            self.clear_cell_at(row, col);
        } else {
            self.rows.entry(row).or_default().insert(col, value);
        }
        Ok(())
    }

    /// Clear a cell by indices
    pub fn clear_cell_at(&mut self, row: u32, col: u32) {
        if let Some(row_map) = self.rows.get_mut(&row) {
            row_map.remove(&col);
            if row_map.is_empty() {
                self.rows.remove(&row);
            }
        }
    }

    // === Range Operations ===

    /// Index of the last row holding any value
    pub fn last_row(&self) -> Option<u32> {
        self.rows.keys().next_back().copied()
    }

    /// Get the used bounds (min_row, min_col, max_row, max_col), or None if empty
    pub fn used_bounds(&self) -> Option<(u32, u32, u32, u32)> {
        let min_row = *self.rows.keys().next()?;
        let max_row = *self.rows.keys().next_back()?;

        let mut min_col = u32::MAX;
        let mut max_col = 0;

        for row_data in self.rows.values() {
            if let Some(&col) = row_data.keys().next() {
                min_col = min_col.min(col);
            }
            if let Some(&col) = row_data.keys().next_back() {
                max_col = max_col.max(col);
            }
        }

        Some((min_row, min_col, max_row, max_col))
    }

    /// Read the values of a range as text rows
    ///
    /// Mirrors what a remote grid returns: trailing empty cells of each row
    /// are dropped, interior empty rows come back as empty vectors, and
    /// trailing empty rows are omitted entirely.
    pub fn read_range(&self, range: &GridRange) -> Vec<Vec<String>> {
        let Some(last_row) = self.last_row() else {
            return Vec::new();
        };

        // GridRange is 1-based, storage is 0-based
        let first = range.start_row - 1;
        let last = range.end_row.map_or(last_row, |end| (end - 1).min(last_row));
        if first > last {
            return Vec::new();
        }

        let mut result: Vec<Vec<String>> = (first..=last)
            .map(|row| {
                let mut values: Vec<String> = (range.start_col - 1..range.end_col)
                    .map(|col| self.get_value_at(row, col).to_wire())
                    .collect();
                while values.last().is_some_and(String::is_empty) {
                    values.pop();
                }
                values
            })
            .collect();

        while result.last().is_some_and(Vec::is_empty) {
            result.pop();
        }

        result
    }

    /// Overwrite a range: clear it, then write `rows` from its top-left cell
    pub fn write_range(&mut self, range: &GridRange, rows: &[Vec<CellValue>]) -> Result<()> {
        let max_rows = range
            .end_row
            .map_or(u32::MAX, |end| end - range.start_row + 1) as usize;
        if rows.len() > max_rows {
            return Err(Error::InvalidRange(format!(
                "{} rows do not fit in {}",
                rows.len(),
                range
            )));
        }

        if let Some(values) = rows.iter().find(|v| v.len() > range.col_count() as usize) {
            return Err(Error::InvalidRange(format!(
                "{} values do not fit in {}",
                values.len(),
                range
            )));
        }

        self.clear_range(range);
        for (offset, values) in rows.iter().enumerate() {
            self.write_row(range.start_row - 1 + offset as u32, range.start_col - 1, values)?;
        }
        Ok(())
    }

    /// Write `values` into a row starting at `start_col` (both 0-based)
    pub fn write_row(&mut self, row: u32, start_col: u32, values: &[CellValue]) -> Result<()> {
        for (offset, value) in values.iter().enumerate() {
            self.set_cell_value_at(row, start_col + offset as u32, value.clone())?;
        }
        Ok(())
    }

    /// Clear all cells in a range
    pub fn clear_range(&mut self, range: &GridRange) {
        let first = range.start_row - 1;
        let cols = range.start_col - 1..range.end_col;

        let rows: Vec<u32> = self
            .rows
            .range(first..)
            .map(|(&row, _)| row)
            .take_while(|&row| range.contains_row(row + 1))
            .collect();

        for row in rows {
            for col in cols.clone() {
                self.clear_cell_at(row, col);
            }
        }
    }

    /// Append rows after the last used row; returns the 0-based index of the
    /// first appended row
    pub fn append_rows(&mut self, rows: &[Vec<CellValue>]) -> Result<u32> {
        let first = self.last_row().map_or(0, |last| last + 1);
        for (offset, values) in rows.iter().enumerate() {
            self.write_row(first + offset as u32, 0, values)?;
        }
        Ok(first)
    }

    // === Row Operations ===

    /// Remove rows `start..end` (0-based, end exclusive) and shift the rows
    /// below them up
    pub fn delete_rows(&mut self, start: u32, end: u32) {
        if end <= start {
            return;
        }

        let count = end - start;
        let below = self.rows.split_off(&start);
        for (row, data) in below {
            if row >= end {
                self.rows.insert(row - count, data);
            }
        }
    }

    /// Number of rows holding any value
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Check if the worksheet is empty
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Validate cell position
    fn validate_cell_position(&self, row: u32, col: u32) -> Result<()> {
        if row >= MAX_ROWS {
            return Err(Error::RowOutOfBounds(row, MAX_ROWS - 1));
        }
        if col >= MAX_COLS {
            return Err(Error::ColumnOutOfBounds(col, MAX_COLS - 1));
        }
        Ok(())
    }
}
