//! Row batches
//!
//! [`RowBatch`] collects the grid operations for one table and sends them in
//! a single [`GridService::batch_mutate`] call. Inserts, updates, deletes,
//! metadata writes and migrations all build on it.

use gridtable_core::{CellValue, GridRange};

use crate::error::{Error, Result};
use crate::grid::{GridOp, GridService};
use crate::table::{Table, HEADER_ROW};

/// Pending operations against one sheet
#[derive(Debug, Clone)]
pub struct RowBatch {
    sheet: String,
    column_count: usize,
    ops: Vec<GridOp>,
}

impl RowBatch {
    /// An empty batch for a table
    pub fn new(table: &Table) -> Self {
        Self::with_columns(table.name(), table.column_count())
    }

    /// An empty batch for a sheet of the given width
    pub fn with_columns<S: Into<String>>(sheet: S, column_count: usize) -> Self {
        Self {
            sheet: sheet.into(),
            column_count,
            ops: Vec::new(),
        }
    }

    pub fn sheet(&self) -> &str {
        &self.sheet
    }

    pub fn column_count(&self) -> usize {
        self.column_count
    }

    pub fn ops(&self) -> &[GridOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Append a row after the used range
    ///
    /// Consecutive appends are merged into one operation.
    pub fn append(&mut self, values: Vec<CellValue>) -> Result<&mut Self> {
        self.check_width(&values)?;

        if let Some(GridOp::AppendRows { sheet, rows }) = self.ops.last_mut() {
            if *sheet == self.sheet {
                rows.push(values);
                return Ok(self);
            }
        }
        self.ops.push(GridOp::AppendRows {
            sheet: self.sheet.clone(),
            rows: vec![values],
        });
        Ok(self)
    }

    /// Overwrite a whole physical row
    pub fn write_row(&mut self, row: u32, values: Vec<CellValue>) -> Result<&mut Self> {
        self.check_width(&values)?;
        let range = GridRange::row(self.sheet.as_str(), row, self.width())?;
        self.ops.push(GridOp::WriteRange {
            range,
            rows: vec![values],
        });
        Ok(self)
    }

    /// Overwrite the data row at a 1-based logical index
    pub fn overwrite(&mut self, row_index: u32, values: Vec<CellValue>) -> Result<&mut Self> {
        if row_index < 1 {
            return Err(Error::IndexOutOfRange(row_index));
        }
        let row = row_index
            .checked_add(HEADER_ROW)
            .ok_or(Error::IndexOutOfRange(row_index))?;
        self.write_row(row, values)
    }

    /// Overwrite the header row
    pub fn write_header(&mut self, columns: &[String]) -> Result<&mut Self> {
        self.write_row(HEADER_ROW, columns.iter().map(CellValue::string).collect())
    }

    /// Clear a range
    pub fn clear(&mut self, range: GridRange) -> &mut Self {
        self.ops.push(GridOp::ClearRange(range));
        self
    }

    /// Structurally remove data rows by 1-based logical index.
    ///
    /// Indices are de-duplicated and removed from the highest to the lowest,
    /// so each removal leaves the positions of the rows still to be removed
    /// unchanged.
    pub fn delete_rows(&mut self, row_indices: &[u32]) -> Result<&mut Self> {
        if let Some(&bad) = row_indices.iter().find(|&&i| i < 1) {
            return Err(Error::IndexOutOfRange(bad));
        }

        let mut rows = row_indices.to_vec();
        rows.sort_unstable_by(|a, b| b.cmp(a));
        rows.dedup();

        for row_index in rows {
            let start_row = row_index
                .checked_add(HEADER_ROW)
                .ok_or(Error::IndexOutOfRange(row_index))?;
            self.ops.push(GridOp::DeleteRows {
                sheet: self.sheet.clone(),
                start_row,
                count: 1,
            });
        }
        Ok(self)
    }

    /// Rename a sheet as part of this batch
    pub fn rename_sheet(&mut self, from: &str, to: &str) -> &mut Self {
        self.ops.push(GridOp::RenameSheet {
            from: from.to_string(),
            to: to.to_string(),
        });
        self
    }

    /// Move another batch's operations to the end of this one
    pub fn extend(&mut self, other: RowBatch) -> &mut Self {
        self.ops.extend(other.ops);
        self
    }

    /// Send every operation in one call. An empty batch sends nothing.
    pub fn execute(self, grid: &dyn GridService) -> Result<()> {
        if self.ops.is_empty() {
            return Ok(());
        }

        tracing::debug!(
            "Sending batch of {} ops for {}: {:?}",
            self.ops.len(),
            self.sheet,
            self.ops.iter().map(GridOp::kind).collect::<Vec<_>>()
        );
        grid.batch_mutate(&self.ops)?;
        Ok(())
    }

    pub(crate) fn into_ops(self) -> Vec<GridOp> {
        self.ops
    }

    fn check_width(&self, values: &[CellValue]) -> Result<()> {
        if values.len() != self.column_count {
            return Err(Error::schema_mismatch(self.column_count, values.len()));
        }
        Ok(())
    }

    fn width(&self) -> u32 {
        self.column_count as u32
    }
}
