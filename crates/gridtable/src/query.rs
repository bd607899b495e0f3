//! Reading records back from a table

use crate::error::{Error, Result};
use crate::grid::GridService;
use crate::record::Record;
use crate::table::Table;

/// Which rows a query returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    /// Every non-empty data row
    #[default]
    All,
    /// The data row at a 1-based logical index
    Index(u32),
}

/// A read request against one table.
///
/// Logical index `i` is always physical row `i + 1`: every mutation in this
/// crate keeps data rows contiguous below the header, so [`Selection::All`]
/// and [`Selection::Index`] agree on numbering.
pub struct QueryRequest<'a> {
    grid: &'a dyn GridService,
    table: Table,
    selection: Selection,
}

impl<'a> QueryRequest<'a> {
    pub fn new(grid: &'a dyn GridService, table: Table) -> Self {
        Self {
            grid,
            table,
            selection: Selection::All,
        }
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Select every row (the default)
    pub fn all(mut self) -> Self {
        self.selection = Selection::All;
        self
    }

    /// Select the single row at a 1-based logical index
    pub fn find_by_index(mut self, row_index: u32) -> Self {
        self.selection = Selection::Index(row_index);
        self
    }

    /// Run the query. An empty result is not an error.
    pub fn execute(self) -> Result<Vec<Record>> {
        match self.selection {
            Selection::All => select_all(self.grid, &self.table),
            Selection::Index(row_index) => find_by_index(self.grid, &self.table, row_index),
        }
    }
}

/// Every non-empty data row, numbered from 1 in grid order
pub(crate) fn select_all(grid: &dyn GridService, table: &Table) -> Result<Vec<Record>> {
    let rows = grid.read_range(&table.data_range()?)?;
    let width = table.column_count();

    let records: Vec<Record> = rows
        .into_iter()
        .filter(|cells| cells.iter().any(|c| !c.is_empty()))
        .zip(1u32..)
        .map(|(cells, row_index)| Record::from_wire(row_index, cells, width))
        .collect();

    tracing::trace!("Read {} records from {}", records.len(), table.name());
    Ok(records)
}

/// Number of data rows, counted up to the last non-empty one
pub(crate) fn row_count(grid: &dyn GridService, table: &Table) -> Result<u32> {
    Ok(grid.read_range(&table.data_range()?)?.len() as u32)
}

/// The record at one logical index, if that row holds anything
fn find_by_index(grid: &dyn GridService, table: &Table, row_index: u32) -> Result<Vec<Record>> {
    if row_index < 1 {
        return Err(Error::IndexOutOfRange(row_index));
    }

    let rows = grid.read_range(&table.row_range(row_index)?)?;
    Ok(rows
        .into_iter()
        .next()
        .filter(|cells| cells.iter().any(|c| !c.is_empty()))
        .map(|cells| Record::from_wire(row_index, cells, table.column_count()))
        .into_iter()
        .collect())
}
