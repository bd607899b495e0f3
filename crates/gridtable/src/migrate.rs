//! Schema migration
//!
//! A migration rewrites every row of one table under a new column layout
//! and bumps the store's schema version. It runs as a short saga:
//!
//! 1. [`MigrationStep::Inspect`]: make sure the table still has a sheet.
//! 2. [`MigrationStep::ReadRows`]: read the current records.
//! 3. The caller's transform maps old records to new ones; the result is
//!    checked against the new column count before anything is written.
//! 4. [`MigrationStep::WriteBatch`]: one batch clears the sheet, writes the
//!    new header, every transformed row and the schema version row. The
//!    other metadata rows are left alone.
//!
//! The grid is only modified by the last step, and that step is a single
//! atomic batch, so header, data and version always change together.

use std::fmt;

use gridtable_core::{CellValue, GridRange};

use crate::batch::RowBatch;
use crate::error::{Error, Result};
use crate::grid::GridService;
use crate::metadata::Metadata;
use crate::query;
use crate::record::Record;
use crate::store::Store;
use crate::table::{Table, HEADER_ROW};

/// The remote step a migration was in when it failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationStep {
    Inspect,
    ReadRows,
    WriteBatch,
}

impl MigrationStep {
    /// What the grid looks like after a failure in this step
    pub fn remote_state(&self) -> &'static str {
        match self {
            MigrationStep::Inspect | MigrationStep::ReadRows => {
                "nothing was written; the table is unchanged"
            }
            MigrationStep::WriteBatch => {
                "the batch was rejected as a whole; the table and schema version are unchanged"
            }
        }
    }
}

impl fmt::Display for MigrationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigrationStep::Inspect => write!(f, "inspect"),
            MigrationStep::ReadRows => write!(f, "read rows"),
            MigrationStep::WriteBatch => write!(f, "write batch"),
        }
    }
}

/// A pending migration of one table to a new column layout
pub struct MigrateRequest<'a> {
    store: &'a Store,
    table: String,
    columns: Vec<String>,
    version: u32,
}

impl<'a> MigrateRequest<'a> {
    pub(crate) fn new(store: &'a Store, table: &str, columns: Vec<String>, version: u32) -> Self {
        Self {
            store,
            table: table.to_string(),
            columns,
            version,
        }
    }

    /// Run the migration with `transform` mapping old records to new ones.
    ///
    /// The transform receives the old table, the new column names and every
    /// current record; it must return the same number of records, each with
    /// one value per new column. Returns the new table, or `None` if the
    /// table has no sheet (nothing is migrated and the version is kept).
    pub fn execute<F>(self, transform: F) -> Result<Option<Table>>
    where
        F: FnOnce(&Table, &[String], Vec<Record>) -> Vec<Record>,
    {
        let (old, metadata) = self.store.begin_migration(&self.table, self.version)?;
        let result = self.run(&old, &metadata, transform);

        match &result {
            Ok(Some(table)) => {
                self.store
                    .finish_migration(Some((table.clone(), self.version)));
                tracing::info!(
                    "Migrated table {} to schema version {} ({} columns)",
                    self.table,
                    self.version,
                    table.column_count()
                );
            }
            Ok(None) => self.store.finish_migration(None),
            Err(err) => {
                self.store.finish_migration(None);
                tracing::warn!("Migration of table {} failed: {}", self.table, err);
            }
        }
        result
    }

    fn run<F>(&self, old: &Table, metadata: &Metadata, transform: F) -> Result<Option<Table>>
    where
        F: FnOnce(&Table, &[String], Vec<Record>) -> Vec<Record>,
    {
        let new = Table::new(self.table.as_str(), self.columns.iter().cloned())?;
        let grid = self.store.grid();

        let sheet = grid
            .find_sheet_id(old.name())
            .map_err(|source| Error::Migration {
                step: MigrationStep::Inspect,
                source,
            })?;
        if sheet.is_none() {
            tracing::debug!("Table {} has no sheet, nothing to migrate", old.name());
            return Ok(None);
        }

        let records = read_rows(grid, old)?;
        let count = records.len();
        let records = transform(old, new.columns(), records);
        check_transformed(&new, count, &records)?;

        let mut batch = RowBatch::new(&new);
        let width = old.column_count().max(new.column_count()) as u32;
        batch.clear(GridRange::rows(new.name(), HEADER_ROW, None, width)?);
        batch.write_header(new.columns())?;
        for (record, row_index) in records.into_iter().zip(1u32..) {
            batch.overwrite(row_index, record.into_values())?;
        }

        let metadata = metadata.with_schema_version(self.version);
        batch.extend(metadata.version_batch(self.store.metadata_table())?);

        tracing::debug!(
            "Migration batch for {}: {} rows, {} ops",
            new.name(),
            count,
            batch.len()
        );
        grid.batch_mutate(&batch.into_ops())
            .map_err(|source| Error::Migration {
                step: MigrationStep::WriteBatch,
                source,
            })?;

        Ok(Some(new))
    }
}

fn read_rows(grid: &dyn GridService, table: &Table) -> Result<Vec<Record>> {
    query::select_all(grid, table).map_err(|err| match err {
        Error::Remote(source) => Error::Migration {
            step: MigrationStep::ReadRows,
            source,
        },
        other => other,
    })
}

fn check_transformed(table: &Table, expected: usize, records: &[Record]) -> Result<()> {
    if records.len() != expected {
        return Err(Error::SchemaMismatch(format!(
            "migration transform returned {} records for {} rows",
            records.len(),
            expected
        )));
    }
    if let Some(record) = records.iter().find(|r| r.len() != table.column_count()) {
        return Err(Error::schema_mismatch(table.column_count(), record.len()));
    }
    if records.iter().any(Record::is_blank) {
        return Err(Error::InvalidArgument(
            "migration transform returned a record with no values".into(),
        ));
    }
    Ok(())
}

/// A transform that carries values over by column name.
///
/// New columns start empty; dropped columns are discarded.
pub fn carry_by_name(old: &Table, columns: &[String], records: Vec<Record>) -> Vec<Record> {
    let sources: Vec<Option<usize>> = columns
        .iter()
        .map(|c| old.column_index(c).ok())
        .collect();

    records
        .into_iter()
        .map(|record| {
            let row_index = record.row_index();
            let values = record.values();
            let moved: Vec<CellValue> = sources
                .iter()
                .map(|source| {
                    source
                        .and_then(|i| values.get(i).cloned())
                        .unwrap_or(CellValue::Empty)
                })
                .collect();
            Record::new(moved).with_row_index(row_index)
        })
        .collect()
}
