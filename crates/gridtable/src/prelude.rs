//! Prelude module - common imports for gridtable users
//!
//! ```rust
//! use gridtable::prelude::*;
//! ```

pub use crate::{
    // Grid access
    GridService,
    MemoryGrid,

    // Store and tables
    Store,
    StoreConfig,
    Table,
    Record,
    CellValue,
    MigrationStep,
    SchemaState,

    // Error types
    Error,
    Result,
};
