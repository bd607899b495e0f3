//! The store handle
//!
//! A [`Store`] owns the connection to one grid document, the registry of
//! known tables and the cached metadata. Requests are built from it and
//! executed by the caller.
//!
//! The registry and metadata are guarded by one lock that is never held
//! across a grid call. Concurrent writers to the same table are not
//! serialized: a record's row index can go stale if another caller deletes
//! or truncates rows in between.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use ahash::AHashMap;
use gridtable_core::{GridRange, MAX_COLS};

use crate::batch::RowBatch;
use crate::config::StoreConfig;
use crate::error::{Error, Result};
use crate::grid::GridService;
use crate::metadata::{self, Metadata, SchemaState};
use crate::migrate::MigrateRequest;
use crate::mutation::{DeleteRequest, TruncateRequest, UpdateRequest};
use crate::query::QueryRequest;
use crate::table::{self, Table, HEADER_ROW};

/// Handle to a table store over a grid. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    grid: Arc<dyn GridService>,
    config: StoreConfig,
    meta_table: Table,
    state: Mutex<StoreState>,
}

struct StoreState {
    tables: AHashMap<String, Table>,
    metadata: Metadata,
    /// Target version of the migration in flight
    migrating: Option<u32>,
}

impl Store {
    /// Open a store, initializing the metadata table if the grid has none
    pub fn open(grid: Arc<dyn GridService>, config: StoreConfig) -> Result<Self> {
        let meta_table = Metadata::table(&config.metadata_table)?;
        let metadata = metadata::bootstrap(grid.as_ref(), &config)?;

        tracing::info!(
            "Opened store {} at schema version {}",
            metadata.application_name(),
            metadata.schema_version()
        );

        Ok(Self {
            inner: Arc::new(StoreInner {
                grid,
                config,
                meta_table,
                state: Mutex::new(StoreState {
                    tables: AHashMap::new(),
                    metadata,
                    migrating: None,
                }),
            }),
        })
    }

    pub fn grid(&self) -> &dyn GridService {
        self.inner.grid.as_ref()
    }

    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    /// Snapshot of the cached metadata
    pub fn metadata(&self) -> Metadata {
        self.state().metadata.clone()
    }

    pub fn schema_version(&self) -> u32 {
        self.state().metadata.schema_version()
    }

    pub fn schema_state(&self) -> SchemaState {
        let state = self.state();
        let from = state.metadata.schema_version();
        match state.migrating {
            Some(to) => SchemaState::Migrating { from, to },
            None => SchemaState::Versioned(from),
        }
    }

    /// A registered table
    pub fn table(&self, name: &str) -> Option<Table> {
        self.state().tables.get(name).cloned()
    }

    /// Names of all registered tables, sorted
    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.state().tables.keys().cloned().collect();
        names.sort();
        names
    }

    // === Table lifecycle ===

    /// Create a table (or adopt an existing sheet of that name) and register
    /// it. The registry only changes once the grid calls succeed.
    pub fn create_table<S, I, C>(&self, name: S, columns: I) -> Result<Table>
    where
        S: Into<String>,
        I: IntoIterator<Item = C>,
        C: Into<String>,
    {
        let table = Table::new(name, columns)?;
        self.check_not_reserved(table.name())?;

        table.create(self.grid())?;
        self.state()
            .tables
            .insert(table.name().to_string(), table.clone());
        Ok(table)
    }

    /// Register an existing sheet, taking its columns from the header row
    pub fn load_table(&self, name: &str) -> Result<Table> {
        self.check_not_reserved(name)?;

        if self.grid().find_sheet_id(name)?.is_none() {
            return Err(Error::NotFound(format!("table '{}'", name)));
        }
        let header = GridRange::rows(name, HEADER_ROW, Some(HEADER_ROW), MAX_COLS)?;
        let columns = self
            .grid()
            .read_range(&header)?
            .into_iter()
            .next()
            .unwrap_or_default();
        if columns.is_empty() {
            return Err(Error::InvalidArgument(format!(
                "sheet '{}' has no header row",
                name
            )));
        }

        let table = Table::new(name, columns)?;
        tracing::debug!("Loaded table {} ({} columns)", name, table.column_count());
        self.state().tables.insert(name.to_string(), table.clone());
        Ok(table)
    }

    /// Delete a table's sheet and forget the table.
    ///
    /// The sheet is looked up by name, so tables this handle never loaded
    /// are dropped too. Returns `false` if there was no sheet.
    pub fn drop_table(&self, name: &str) -> Result<bool> {
        self.check_not_reserved(name)?;

        let dropped = table::drop_sheet(self.grid(), name)?;
        self.state().tables.remove(name);
        Ok(dropped)
    }

    /// Rename a table's sheet in place
    pub fn rename_table(&self, name: &str, new_name: &str) -> Result<Table> {
        self.check_not_reserved(name)?;
        self.check_not_reserved(new_name)?;

        let old = self.require_table(name)?;
        if self.table(new_name).is_some() {
            return Err(Error::InvalidArgument(format!(
                "table '{}' already exists",
                new_name
            )));
        }
        let renamed = Table::new(new_name, old.columns().iter().cloned())?;

        let mut batch = RowBatch::new(&old);
        batch.rename_sheet(old.name(), renamed.name());
        batch.execute(self.grid())?;

        let mut state = self.state();
        state.tables.remove(name);
        state
            .tables
            .insert(renamed.name().to_string(), renamed.clone());
        drop(state);

        tracing::info!("Renamed table {} to {}", name, new_name);
        Ok(renamed)
    }

    /// Replace the store description.
    ///
    /// Only the description row is written, so a migration finishing at the
    /// same time keeps its schema version.
    pub fn set_description<S: Into<String>>(&self, description: S) -> Result<()> {
        let description = description.into();
        self.metadata()
            .with_description(description.as_str())
            .description_batch(&self.inner.meta_table)?
            .execute(self.grid())?;

        let mut state = self.state();
        state.metadata = state.metadata.with_description(description);
        Ok(())
    }

    // === Requests ===

    /// Read records from a registered table
    pub fn query(&self, table: &str) -> Result<QueryRequest<'_>> {
        Ok(QueryRequest::new(self.grid(), self.require_table(table)?))
    }

    /// Insert or update records of a registered table
    pub fn update(&self, table: &str) -> Result<UpdateRequest<'_>> {
        Ok(UpdateRequest::new(self.grid(), self.require_table(table)?))
    }

    /// Delete records of a registered table
    pub fn delete(&self, table: &str) -> Result<DeleteRequest<'_>> {
        Ok(DeleteRequest::new(self.grid(), self.require_table(table)?))
    }

    /// Remove every data row of a table.
    ///
    /// A table this handle has not registered is truncated by sheet name
    /// across every column; a missing sheet is left alone.
    pub fn truncate(&self, table: &str) -> Result<TruncateRequest<'_>> {
        self.check_not_reserved(table)?;

        Ok(match self.table(table) {
            Some(known) => TruncateRequest::new(self.grid(), &known),
            None => TruncateRequest::by_name(self.grid(), table),
        })
    }

    /// Migrate a registered table to new columns at a new schema version
    pub fn migrate<I, C>(&self, table: &str, columns: I, version: u32) -> MigrateRequest<'_>
    where
        I: IntoIterator<Item = C>,
        C: Into<String>,
    {
        let columns = columns.into_iter().map(Into::into).collect();
        MigrateRequest::new(self, table, columns, version)
    }

    // === Internals ===

    pub(crate) fn metadata_table(&self) -> &Table {
        &self.inner.meta_table
    }

    /// Validate a migration and mark it in flight
    pub(crate) fn begin_migration(&self, name: &str, version: u32) -> Result<(Table, Metadata)> {
        let mut state = self.state();

        let table = state
            .tables
            .get(name)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("table '{}'", name)))?;

        if let Some(to) = state.migrating {
            return Err(Error::InvalidArgument(format!(
                "a migration to version {} is already running",
                to
            )));
        }

        let current = state.metadata.schema_version();
        if version <= current {
            return Err(Error::InvalidArgument(format!(
                "schema version {} is not newer than {}",
                version, current
            )));
        }

        state.migrating = Some(version);
        Ok((table, state.metadata.clone()))
    }

    /// Clear the in-flight marker, applying the outcome of a completed
    /// migration
    pub(crate) fn finish_migration(&self, outcome: Option<(Table, u32)>) {
        let mut state = self.state();
        state.migrating = None;
        if let Some((table, version)) = outcome {
            state.tables.insert(table.name().to_string(), table);
            state.metadata = state.metadata.with_schema_version(version);
        }
    }

    fn require_table(&self, name: &str) -> Result<Table> {
        self.table(name)
            .ok_or_else(|| Error::NotFound(format!("table '{}'", name)))
    }

    fn check_not_reserved(&self, name: &str) -> Result<()> {
        if name == self.inner.config.metadata_table {
            return Err(Error::InvalidArgument(format!(
                "'{}' is reserved for store metadata",
                name
            )));
        }
        Ok(())
    }

    fn state(&self) -> MutexGuard<'_, StoreState> {
        // Fields are only ever assigned whole
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("config", &self.inner.config)
            .field("tables", &self.table_names())
            .field("schema_state", &self.schema_state())
            .finish_non_exhaustive()
    }
}
