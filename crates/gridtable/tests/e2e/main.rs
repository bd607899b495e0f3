//! End-to-end tests for gridtable.
//!
//! Every test opens a [`Store`](gridtable::Store) over its own in-process
//! [`MemoryGrid`](gridtable::MemoryGrid) and drives it only through the
//! public API, checking what ends up on the grid.

mod common;
mod concurrency;
mod migration;
mod mutations;
mod tables;

// Re-export common utilities for submodules
pub use common::*;
