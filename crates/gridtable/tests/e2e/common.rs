//! Common utilities for E2E tests.

use std::sync::{Arc, Mutex, PoisonError};

use gridtable::{
    CellValue, GridOp, GridRange, GridResult, GridService, MemoryGrid, Record, SheetId, Store,
    StoreConfig,
};

/// Columns of the `member` table used across the tests
pub const MEMBER_COLUMNS: [&str; 4] = ["name", "country", "address1", "tel"];

/// Open a store for application "test" over a fresh grid
pub fn open_store() -> (Arc<MemoryGrid>, Store) {
    let grid = Arc::new(MemoryGrid::new());
    let store = Store::open(grid.clone(), StoreConfig::new("test")).unwrap();
    (grid, store)
}

/// Open a second store over an existing grid
pub fn reopen(grid: &Arc<MemoryGrid>) -> Store {
    Store::open(grid.clone(), StoreConfig::new("test")).unwrap()
}

/// Raw text of a whole sheet, header included
pub fn sheet_rows(grid: &MemoryGrid, sheet: &str) -> Vec<Vec<String>> {
    let range = GridRange::rows(sheet, 1, None, 26).unwrap();
    grid.read_range(&range).unwrap()
}

/// `(row_index, values as text)` for every record of a table
pub fn dump(store: &Store, table: &str) -> Vec<(u32, Vec<String>)> {
    store
        .query(table)
        .unwrap()
        .all()
        .execute()
        .unwrap()
        .iter()
        .map(|r| {
            let values = (0..r.len()).map(|i| r.get_str(i).unwrap()).collect();
            (r.row_index(), values)
        })
        .collect()
}

/// Build a text row
pub fn row(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Insert records given as text in one batch
pub fn insert(store: &Store, table: &str, rows: &[&[&str]]) {
    let records = rows.iter().map(|values| Record::new(values.iter().copied()));
    store
        .update(table)
        .unwrap()
        .insert_all(records)
        .execute()
        .unwrap();
}

type Hook = Box<dyn FnOnce() + Send>;

/// A [`MemoryGrid`] that can run a callback right before the next batch is
/// applied, to interleave another operation with one already in flight
#[derive(Default)]
pub struct HookGrid {
    inner: MemoryGrid,
    hook: Mutex<Option<Hook>>,
}

impl HookGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn before_next_batch(&self, hook: impl FnOnce() + Send + 'static) {
        *self.hook.lock().unwrap_or_else(PoisonError::into_inner) = Some(Box::new(hook));
    }
}

impl GridService for HookGrid {
    fn find_sheet_id(&self, name: &str) -> GridResult<Option<SheetId>> {
        self.inner.find_sheet_id(name)
    }

    fn sheet_names(&self) -> GridResult<Vec<String>> {
        self.inner.sheet_names()
    }

    fn create_sheet(&self, name: &str) -> GridResult<SheetId> {
        self.inner.create_sheet(name)
    }

    fn delete_sheet(&self, name: &str) -> GridResult<()> {
        self.inner.delete_sheet(name)
    }

    fn read_range(&self, range: &GridRange) -> GridResult<Vec<Vec<String>>> {
        self.inner.read_range(range)
    }

    fn write_range(&self, range: &GridRange, rows: &[Vec<CellValue>]) -> GridResult<()> {
        self.inner.write_range(range, rows)
    }

    fn append_rows(&self, sheet: &str, rows: &[Vec<CellValue>]) -> GridResult<()> {
        self.inner.append_rows(sheet, rows)
    }

    fn clear_range(&self, range: &GridRange) -> GridResult<()> {
        self.inner.clear_range(range)
    }

    fn batch_mutate(&self, ops: &[GridOp]) -> GridResult<()> {
        let hook = self.hook.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(hook) = hook {
            hook();
        }
        self.inner.batch_mutate(ops)
    }
}
