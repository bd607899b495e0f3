//! Insert, update, delete and truncate requests
//!
//! Each request validates everything locally, then talks to the grid in at
//! most one [`batch_mutate`](crate::grid::GridService::batch_mutate) call.

use gridtable_core::{CellValue, GridRange, MAX_COLS};

use crate::batch::RowBatch;
use crate::error::{Error, Result};
use crate::grid::{GridError, GridOp, GridService};
use crate::query;
use crate::record::Record;
use crate::table::{Table, FIRST_DATA_ROW};

#[derive(Debug, Clone)]
enum Change {
    Insert(Vec<CellValue>),
    Update(u32, Vec<CellValue>),
}

/// Inserts and full-row updates, sent together in call order
pub struct UpdateRequest<'a> {
    grid: &'a dyn GridService,
    table: Table,
    changes: Vec<Change>,
}

impl<'a> UpdateRequest<'a> {
    pub fn new(grid: &'a dyn GridService, table: Table) -> Self {
        Self {
            grid,
            table,
            changes: Vec::new(),
        }
    }

    /// Append a record after the last data row; its row index is ignored
    pub fn insert(mut self, record: Record) -> Self {
        self.changes.push(Change::Insert(record.into_values()));
        self
    }

    /// Insert several records, preserving their order
    pub fn insert_all<I: IntoIterator<Item = Record>>(self, records: I) -> Self {
        records.into_iter().fold(self, Self::insert)
    }

    /// Overwrite every column of the row at `record.row_index()`.
    ///
    /// The row must already hold a record, or be inserted earlier in this
    /// request.
    pub fn update(mut self, record: Record) -> Self {
        let row_index = record.row_index();
        self.changes
            .push(Change::Update(row_index, record.into_values()));
        self
    }

    /// Number of pending changes
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Validate every change, then send them as one batch.
    ///
    /// Updates first read the table's row count; an update past the last
    /// row fails with [`Error::IndexOutOfRange`] and nothing is written.
    /// Returns the number of rows written.
    pub fn execute(self) -> Result<usize> {
        let mut batch = RowBatch::new(&self.table);
        let mut inserted = 0u32;
        let mut targets = Vec::new();

        for change in self.changes {
            match change {
                Change::Insert(values) => {
                    check_not_blank(&values)?;
                    batch.append(values)?;
                    inserted += 1;
                }
                Change::Update(row_index, values) => {
                    if row_index < 1 {
                        return Err(Error::IndexOutOfRange(row_index));
                    }
                    check_not_blank(&values)?;
                    batch.overwrite(row_index, values)?;
                    targets.push((row_index, inserted));
                }
            }
        }

        if !targets.is_empty() {
            let existing = query::row_count(self.grid, &self.table)?;
            let past_end = targets
                .iter()
                .find(|(row_index, inserted)| *row_index > existing.saturating_add(*inserted));
            if let Some(&(row_index, _)) = past_end {
                tracing::debug!(
                    "Row {} of {} does not exist ({} rows)",
                    row_index,
                    self.table.name(),
                    existing
                );
                return Err(Error::IndexOutOfRange(row_index));
            }
        }

        let written = batch.ops().iter().map(op_rows).sum();
        batch.execute(self.grid)?;
        Ok(written)
    }
}

fn op_rows(op: &GridOp) -> usize {
    match op {
        GridOp::AppendRows { rows, .. } | GridOp::WriteRange { rows, .. } => rows.len(),
        _ => 0,
    }
}

fn check_not_blank(values: &[CellValue]) -> Result<()> {
    if values.iter().all(CellValue::is_empty) {
        return Err(Error::InvalidArgument(
            "a row needs at least one non-empty value".into(),
        ));
    }
    Ok(())
}

/// Structural removal of data rows
///
/// Rows below a removed row move up, so every later logical index shifts.
pub struct DeleteRequest<'a> {
    grid: &'a dyn GridService,
    table: Table,
    rows: Vec<u32>,
}

impl<'a> DeleteRequest<'a> {
    pub fn new(grid: &'a dyn GridService, table: Table) -> Self {
        Self {
            grid,
            table,
            rows: Vec::new(),
        }
    }

    /// Delete the row a record was read from
    pub fn record(self, record: &Record) -> Self {
        self.row(record.row_index())
    }

    pub fn records<'r, I: IntoIterator<Item = &'r Record>>(self, records: I) -> Self {
        records.into_iter().fold(self, Self::record)
    }

    /// Delete by 1-based logical index
    pub fn row(mut self, row_index: u32) -> Self {
        self.rows.push(row_index);
        self
    }

    /// Remove the rows in one batch; returns how many distinct rows were
    /// targeted. Nothing is sent for an empty request, and a table without a
    /// sheet has nothing to delete.
    pub fn execute(self) -> Result<usize> {
        let mut batch = RowBatch::new(&self.table);
        batch.delete_rows(&self.rows)?;
        let count = batch.len();

        match batch.execute(self.grid) {
            Ok(()) => Ok(count),
            Err(Error::Remote(GridError::SheetNotFound(_))) => {
                tracing::debug!("Table {} has no sheet, nothing to delete", self.table.name());
                Ok(0)
            }
            Err(err) => Err(err),
        }
    }
}

/// Remove every data row, keeping the header
pub struct TruncateRequest<'a> {
    grid: &'a dyn GridService,
    sheet: String,
    width: u32,
}

impl<'a> TruncateRequest<'a> {
    pub fn new(grid: &'a dyn GridService, table: &Table) -> Self {
        Self {
            grid,
            sheet: table.name().to_string(),
            width: table.column_count() as u32,
        }
    }

    /// Truncate a sheet whose columns are not known, clearing every column
    /// below the header
    pub fn by_name<S: Into<String>>(grid: &'a dyn GridService, sheet: S) -> Self {
        Self {
            grid,
            sheet: sheet.into(),
            width: MAX_COLS,
        }
    }

    /// Returns `false` if the sheet does not exist
    pub fn execute(self) -> Result<bool> {
        let range = GridRange::rows(self.sheet.as_str(), FIRST_DATA_ROW, None, self.width)?;
        let mut batch = RowBatch::with_columns(self.sheet.as_str(), self.width as usize);
        batch.clear(range);

        match batch.execute(self.grid) {
            Ok(()) => {
                tracing::info!("Truncated table {}", self.sheet);
                Ok(true)
            }
            Err(Error::Remote(GridError::SheetNotFound(_))) => {
                tracing::debug!("Table {} has no sheet, nothing to truncate", self.sheet);
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }
}
