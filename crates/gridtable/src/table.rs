//! Table definitions
//!
//! A [`Table`] is a named sheet whose first row holds the column names and
//! whose remaining rows hold one record each. Logical row `i` (1-based)
//! lives on physical row `i + 1`.

use gridtable_core::{column_letters, CellValue, GridRange, MAX_COLS};

use crate::batch::RowBatch;
use crate::error::{Error, Result};
use crate::grid::GridService;

/// Physical row holding the column names
pub const HEADER_ROW: u32 = 1;

/// First physical row holding data
pub const FIRST_DATA_ROW: u32 = 2;

/// A table schema: a sheet name plus an ordered list of column names
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Table {
    name: String,
    columns: Vec<String>,
}

impl Table {
    /// Create a table definition (nothing is sent to the grid)
    pub fn new<S, I, C>(name: S, columns: I) -> Result<Self>
    where
        S: Into<String>,
        I: IntoIterator<Item = C>,
        C: Into<String>,
    {
        let name = name.into();
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        validate(&name, &columns)?;
        Ok(Self { name, columns })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Letters of the last column ("D" for four columns)
    pub fn end_column(&self) -> String {
        // Column count is validated against MAX_COLS on construction
        column_letters(self.width()).unwrap_or_default()
    }

    /// Position of a column by exact (case-sensitive) name
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| Error::NotFound(format!("column '{}' in table '{}'", name, self.name)))
    }

    /// `"<name>!A<start_row>:<endCol><end_row>"` over physical rows
    pub fn range_address(&self, start_row: u32, end_row: u32) -> String {
        format!(
            "{}!A{}:{}{}",
            self.name,
            start_row,
            self.end_column(),
            end_row
        )
    }

    /// Every data row, open-ended (`name!A2:D`)
    pub fn data_range(&self) -> Result<GridRange> {
        Ok(GridRange::rows(
            self.name.as_str(),
            FIRST_DATA_ROW,
            None,
            self.width(),
        )?)
    }

    /// The physical row of a 1-based logical row index
    pub fn row_range(&self, row_index: u32) -> Result<GridRange> {
        if row_index < 1 {
            return Err(Error::IndexOutOfRange(row_index));
        }
        let physical = row_index
            .checked_add(HEADER_ROW)
            .ok_or(Error::IndexOutOfRange(row_index))?;
        Ok(GridRange::row(self.name.as_str(), physical, self.width())?)
    }

    /// The header row
    pub fn header_range(&self) -> Result<GridRange> {
        Ok(GridRange::row(self.name.as_str(), HEADER_ROW, self.width())?)
    }

    /// Column names as cell values
    pub fn header_values(&self) -> Vec<CellValue> {
        self.columns.iter().map(CellValue::string).collect()
    }

    /// Ensure the sheet exists and holds the header row.
    ///
    /// Returns `true` if the sheet had to be created. Calling this again
    /// rewrites the header in place; header cells past the last column are
    /// cleared.
    pub fn create(&self, grid: &dyn GridService) -> Result<bool> {
        let created = match grid.find_sheet_id(&self.name)? {
            Some(_) => false,
            None => {
                grid.create_sheet(&self.name)?;
                true
            }
        };

        let mut batch = RowBatch::new(self);
        batch.clear(GridRange::row(self.name.as_str(), HEADER_ROW, MAX_COLS)?);
        batch.write_header(&self.columns)?;
        batch.execute(grid)?;

        if created {
            tracing::info!("Created table {} ({} columns)", self.name, self.column_count());
        } else {
            tracing::debug!("Table {} already exists, header rewritten", self.name);
        }
        Ok(created)
    }

    /// Delete the sheet; returns `false` if there was nothing to delete
    pub fn drop(&self, grid: &dyn GridService) -> Result<bool> {
        drop_sheet(grid, &self.name)
    }

    /// Check whether the backing sheet exists
    pub fn exists(&self, grid: &dyn GridService) -> Result<bool> {
        Ok(grid.find_sheet_id(&self.name)?.is_some())
    }

    fn width(&self) -> u32 {
        self.columns.len() as u32
    }
}

/// Delete a table's sheet by name, whether or not its columns are known
pub(crate) fn drop_sheet(grid: &dyn GridService, name: &str) -> Result<bool> {
    if grid.find_sheet_id(name)?.is_none() {
        tracing::debug!("Table {} has no sheet, nothing to drop", name);
        return Ok(false);
    }

    grid.delete_sheet(name)?;
    tracing::info!("Dropped table {}", name);
    Ok(true)
}

fn validate(name: &str, columns: &[String]) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidArgument("table name cannot be empty".into()));
    }
    if columns.is_empty() {
        return Err(Error::InvalidArgument(format!(
            "table '{}' needs at least one column",
            name
        )));
    }
    if columns.len() > MAX_COLS as usize {
        return Err(Error::InvalidArgument(format!(
            "table '{}' has {} columns (max {})",
            name,
            columns.len(),
            MAX_COLS
        )));
    }
    for (i, column) in columns.iter().enumerate() {
        if column.is_empty() {
            return Err(Error::InvalidArgument(format!(
                "column {} of table '{}' has no name",
                i, name
            )));
        }
        if columns[..i].contains(column) {
            return Err(Error::InvalidArgument(format!(
                "duplicate column '{}' in table '{}'",
                column, name
            )));
        }
    }
    Ok(())
}
