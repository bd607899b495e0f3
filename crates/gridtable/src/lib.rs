//! # gridtable
//!
//! Relational-style tables over a remote, sheet-like grid.
//!
//! Each table is one sheet: the first row holds the column names and every
//! following row holds one record. gridtable keeps the data rows contiguous
//! (inserts append, deletes remove rows structurally, truncate clears below
//! the header), so the record at logical index `i` is always on row `i + 1`.
//!
//! ## Features
//!
//! - Create, drop, load and rename tables
//! - Insert, full-row update, delete and truncate, one grid call per batch
//! - Full scans and lookups by row index
//! - Versioned schema migration that rewrites a table and bumps the store's
//!   schema version in a single batch
//! - Any backend implementing [`GridService`]; [`MemoryGrid`] is built in
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use gridtable::prelude::*;
//!
//! let grid = Arc::new(MemoryGrid::new());
//! let store = Store::open(grid, StoreConfig::new("crm")).unwrap();
//!
//! store.create_table("member", ["name", "tel"]).unwrap();
//! store
//!     .update("member")
//!     .unwrap()
//!     .insert(Record::new(["Aiko", "111"]))
//!     .execute()
//!     .unwrap();
//!
//! let records = store.query("member").unwrap().all().execute().unwrap();
//! assert_eq!(records[0].row_index(), 1);
//! assert_eq!(records[0].get_int(1).unwrap(), 111);
//! ```

pub mod batch;
pub mod config;
pub mod error;
pub mod grid;
pub mod memory;
pub mod metadata;
pub mod migrate;
pub mod mutation;
pub mod prelude;
pub mod query;
pub mod record;
pub mod store;
pub mod table;

pub use batch::RowBatch;
pub use config::{StoreConfig, METADATA_TABLE};
pub use error::{Error, Result};
pub use grid::{GridError, GridOp, GridResult, GridService};
pub use memory::MemoryGrid;
pub use metadata::{Metadata, SchemaState};
pub use migrate::{carry_by_name, MigrateRequest, MigrationStep};
pub use mutation::{DeleteRequest, TruncateRequest, UpdateRequest};
pub use query::{QueryRequest, Selection};
pub use record::Record;
pub use store::Store;
pub use table::Table;

// Re-export core types
pub use gridtable_core::{column_index, column_letters, CellAddress, CellValue, GridRange, SheetId};
