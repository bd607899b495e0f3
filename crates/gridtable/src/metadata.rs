//! Store metadata
//!
//! The metadata lives in a reserved two-column table (`key`, `value`):
//!
//! | row | key               | value                 |
//! |-----|-------------------|-----------------------|
//! | 1   | `key`             | `value` (header)      |
//! | 2   | `applicationName` | application name      |
//! | 3   | `description`     | free text             |
//! | 4   | `schemaVersion`   | integer, starts at 1  |

use std::fmt;

use gridtable_core::{CellValue, GridRange, MAX_COLS};

use crate::batch::RowBatch;
use crate::config::StoreConfig;
use crate::error::{Error, Result};
use crate::grid::GridService;
use crate::query;
use crate::table::Table;

const KEY_APPLICATION_NAME: &str = "applicationName";
const KEY_DESCRIPTION: &str = "description";
const KEY_SCHEMA_VERSION: &str = "schemaVersion";

/// Schema version of a freshly initialized store
pub const INITIAL_SCHEMA_VERSION: u32 = 1;

/// Store-wide metadata
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Metadata {
    application_name: String,
    description: String,
    schema_version: u32,
}

impl Metadata {
    pub fn new<A: Into<String>, D: Into<String>>(application_name: A, description: D) -> Self {
        Self {
            application_name: application_name.into(),
            description: description.into(),
            schema_version: INITIAL_SCHEMA_VERSION,
        }
    }

    pub fn application_name(&self) -> &str {
        &self.application_name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn schema_version(&self) -> u32 {
        self.schema_version
    }

    pub(crate) fn with_description<S: Into<String>>(&self, description: S) -> Self {
        Self {
            description: description.into(),
            ..self.clone()
        }
    }

    pub(crate) fn with_schema_version(&self, schema_version: u32) -> Self {
        Self {
            schema_version,
            ..self.clone()
        }
    }

    /// The reserved metadata table
    pub fn table(name: &str) -> Result<Table> {
        Table::new(name, ["key", "value"])
    }

    /// Header plus the three metadata rows
    pub(crate) fn write_batch(&self, table: &Table) -> Result<RowBatch> {
        let mut batch = RowBatch::new(table);
        batch.write_header(table.columns())?;
        for ((key, value), row_index) in self.entries().into_iter().zip(1u32..) {
            batch.overwrite(row_index, vec![CellValue::string(key), value])?;
        }
        Ok(batch)
    }

    /// Only the description row
    pub(crate) fn description_batch(&self, table: &Table) -> Result<RowBatch> {
        self.entry_batch(table, KEY_DESCRIPTION)
    }

    /// Only the schema version row
    pub(crate) fn version_batch(&self, table: &Table) -> Result<RowBatch> {
        self.entry_batch(table, KEY_SCHEMA_VERSION)
    }

    fn entry_batch(&self, table: &Table, key: &str) -> Result<RowBatch> {
        let mut batch = RowBatch::new(table);
        for ((name, value), row_index) in self.entries().into_iter().zip(1u32..) {
            if name == key {
                batch.overwrite(row_index, vec![CellValue::string(name), value])?;
            }
        }
        Ok(batch)
    }

    fn entries(&self) -> [(&'static str, CellValue); 3] {
        [
            (
                KEY_APPLICATION_NAME,
                CellValue::string(self.application_name.as_str()),
            ),
            (KEY_DESCRIPTION, CellValue::string(self.description.as_str())),
            (KEY_SCHEMA_VERSION, CellValue::from(self.schema_version)),
        ]
    }

    /// Read the metadata rows; missing rows keep the values of `defaults`
    pub(crate) fn read(grid: &dyn GridService, table: &Table, defaults: &Metadata) -> Result<Self> {
        let mut metadata = defaults.clone();

        for record in query::select_all(grid, table)? {
            let key = record.get_str(0)?;
            let value = record.get_str(1)?;
            match key.as_str() {
                KEY_APPLICATION_NAME => metadata.application_name = value,
                KEY_DESCRIPTION => metadata.description = value,
                KEY_SCHEMA_VERSION => {
                    metadata.schema_version =
                        value.trim().parse::<u32>().map_err(|_| Error::Format {
                            value,
                            expected: "a schema version",
                        })?;
                }
                other => tracing::debug!("Ignoring unknown metadata key {other}"),
            }
        }

        Ok(metadata)
    }
}

/// Where a store is in its schema lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaState {
    /// No metadata table yet
    Unversioned,
    /// Metadata present at this version
    Versioned(u32),
    /// A migration between two versions is in flight
    Migrating { from: u32, to: u32 },
}

impl fmt::Display for SchemaState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaState::Unversioned => write!(f, "unversioned"),
            SchemaState::Versioned(v) => write!(f, "version {}", v),
            SchemaState::Migrating { from, to } => write!(f, "migrating {} -> {}", from, to),
        }
    }
}

/// Inspect a grid without changing it
pub fn inspect(grid: &dyn GridService, config: &StoreConfig) -> Result<SchemaState> {
    if grid.find_sheet_id(&config.metadata_table)?.is_none() {
        return Ok(SchemaState::Unversioned);
    }
    let table = Metadata::table(&config.metadata_table)?;
    let defaults = Metadata::new(&*config.application_name, &*config.description);
    let metadata = Metadata::read(grid, &table, &defaults)?;
    Ok(SchemaState::Versioned(metadata.schema_version))
}

/// Read the metadata, creating it first if the grid has none.
///
/// A new metadata table takes over the grid's default sheet when that sheet
/// is still empty; otherwise a new sheet is added.
pub(crate) fn bootstrap(grid: &dyn GridService, config: &StoreConfig) -> Result<Metadata> {
    let table = Metadata::table(&config.metadata_table)?;
    let defaults = Metadata::new(&*config.application_name, &*config.description);
    let names = grid.sheet_names()?;

    if names.iter().any(|n| *n == config.metadata_table) {
        let metadata = Metadata::read(grid, &table, &defaults)?;
        if metadata.application_name != config.application_name {
            tracing::warn!(
                "Store belongs to application {:?}, opened as {:?}",
                metadata.application_name,
                config.application_name
            );
        }
        tracing::debug!("Loaded metadata at schema version {}", metadata.schema_version);
        return Ok(metadata);
    }

    let mut batch = RowBatch::new(&table);
    if default_sheet_unused(grid, config, &names)? {
        tracing::info!(
            "Using default sheet {} for metadata",
            config.default_sheet_name
        );
        batch.rename_sheet(&config.default_sheet_name, &config.metadata_table);
    } else {
        grid.create_sheet(&config.metadata_table)?;
    }
    batch.extend(defaults.write_batch(&table)?);
    batch.execute(grid)?;

    tracing::info!(
        "Initialized metadata for {} at schema version {}",
        defaults.application_name,
        defaults.schema_version
    );
    Ok(defaults)
}

fn default_sheet_unused(
    grid: &dyn GridService,
    config: &StoreConfig,
    names: &[String],
) -> Result<bool> {
    if !names.iter().any(|n| *n == config.default_sheet_name) {
        return Ok(false);
    }
    let everything = GridRange::rows(config.default_sheet_name.as_str(), 1, None, MAX_COLS)?;
    Ok(grid.read_range(&everything)?.is_empty())
}
