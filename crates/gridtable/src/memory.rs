//! In-process grid backed by a [`Workbook`].

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use gridtable_core::{CellValue, GridRange, SheetId, Workbook};

use crate::grid::{GridError, GridOp, GridResult, GridService};

/// A [`GridService`] that keeps every sheet in memory.
///
/// Values are stored in their wire text form, so reads behave like a remote
/// grid: a written `99.9` comes back as the string `"99.9"`. Each
/// `batch_mutate` is applied to a copy of the workbook and swapped in only if
/// every operation succeeds.
///
/// For tests it counts round trips and can be told to start failing after a
/// number of calls.
#[derive(Debug)]
pub struct MemoryGrid {
    workbook: Mutex<Workbook>,
    round_trips: AtomicUsize,
    /// Remaining calls before injected failures begin
    fail_after: Mutex<Option<usize>>,
}

impl MemoryGrid {
    /// A grid with one empty default sheet, like a freshly created document
    pub fn new() -> Self {
        Self::with_workbook(Workbook::new())
    }

    /// A grid with no sheets at all
    pub fn empty() -> Self {
        Self::with_workbook(Workbook::empty())
    }

    pub fn with_workbook(workbook: Workbook) -> Self {
        Self {
            workbook: Mutex::new(workbook),
            round_trips: AtomicUsize::new(0),
            fail_after: Mutex::new(None),
        }
    }

    /// Number of calls served (or refused) so far
    pub fn round_trips(&self) -> usize {
        self.round_trips.load(Ordering::SeqCst)
    }

    /// Let the next `calls` requests through, then fail every request with
    /// [`GridError::Unavailable`] until [`heal`](Self::heal) is called
    pub fn fail_after(&self, calls: usize) {
        *lock(&self.fail_after) = Some(calls);
    }

    /// Stop injecting failures
    pub fn heal(&self) {
        *lock(&self.fail_after) = None;
    }

    /// Run `f` against a snapshot of the workbook
    pub fn inspect<R>(&self, f: impl FnOnce(&Workbook) -> R) -> R {
        f(&lock(&self.workbook))
    }

    fn begin(&self, call: &str) -> GridResult<MutexGuard<'_, Workbook>> {
        self.round_trips.fetch_add(1, Ordering::SeqCst);

        let mut remaining = lock(&self.fail_after);
        match remaining.as_mut() {
            Some(0) => {
                tracing::trace!("memory grid: injected failure for {call}");
                return Err(GridError::Unavailable(format!("injected failure in {call}")));
            }
            Some(n) => *n -= 1,
            None => {}
        }
        drop(remaining);

        tracing::trace!("memory grid: {call}");
        Ok(lock(&self.workbook))
    }
}

impl Default for MemoryGrid {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Reduce values to what the wire can carry
fn as_text(rows: &[Vec<CellValue>]) -> Vec<Vec<CellValue>> {
    rows.iter()
        .map(|row| row.iter().map(|v| CellValue::from_wire(v.to_wire())).collect())
        .collect()
}

fn apply(workbook: &mut Workbook, op: &GridOp) -> GridResult<()> {
    match op {
        GridOp::AppendRows { sheet, rows } => {
            workbook
                .require_worksheet_mut(sheet)?
                .append_rows(&as_text(rows))?;
        }
        GridOp::WriteRange { range, rows } => {
            workbook
                .require_worksheet_mut(&range.sheet)?
                .write_range(range, &as_text(rows))?;
        }
        GridOp::ClearRange(range) => {
            workbook.require_worksheet_mut(&range.sheet)?.clear_range(range);
        }
        GridOp::DeleteRows {
            sheet,
            start_row,
            count,
        } => {
            if *start_row == 0 {
                return Err(GridError::Rejected("row numbers start at 1".into()));
            }
            let start = start_row - 1;
            workbook
                .require_worksheet_mut(sheet)?
                .delete_rows(start, start.saturating_add(*count));
        }
        GridOp::RenameSheet { from, to } => {
            workbook.rename_worksheet(from, to)?;
        }
    }
    Ok(())
}

impl GridService for MemoryGrid {
    fn find_sheet_id(&self, name: &str) -> GridResult<Option<SheetId>> {
        Ok(self.begin("find_sheet_id")?.sheet_id(name))
    }

    fn sheet_names(&self) -> GridResult<Vec<String>> {
        Ok(self.begin("sheet_names")?.sheet_names())
    }

    fn create_sheet(&self, name: &str) -> GridResult<SheetId> {
        Ok(self.begin("create_sheet")?.add_worksheet_with_name(name)?)
    }

    fn delete_sheet(&self, name: &str) -> GridResult<()> {
        self.begin("delete_sheet")?.remove_worksheet(name)?;
        Ok(())
    }

    fn read_range(&self, range: &GridRange) -> GridResult<Vec<Vec<String>>> {
        let workbook = self.begin("read_range")?;
        let sheet = workbook
            .worksheet_by_name(&range.sheet)
            .ok_or_else(|| GridError::SheetNotFound(range.sheet.clone()))?;
        Ok(sheet.read_range(range))
    }

    fn write_range(&self, range: &GridRange, rows: &[Vec<CellValue>]) -> GridResult<()> {
        let mut workbook = self.begin("write_range")?;
        apply(
            &mut workbook,
            &GridOp::WriteRange {
                range: range.clone(),
                rows: rows.to_vec(),
            },
        )
    }

    fn append_rows(&self, sheet: &str, rows: &[Vec<CellValue>]) -> GridResult<()> {
        let mut workbook = self.begin("append_rows")?;
        apply(
            &mut workbook,
            &GridOp::AppendRows {
                sheet: sheet.to_string(),
                rows: rows.to_vec(),
            },
        )
    }

    fn clear_range(&self, range: &GridRange) -> GridResult<()> {
        let mut workbook = self.begin("clear_range")?;
        apply(&mut workbook, &GridOp::ClearRange(range.clone()))
    }

    fn batch_mutate(&self, ops: &[GridOp]) -> GridResult<()> {
        let mut workbook = self.begin("batch_mutate")?;

        let mut staged = workbook.clone();
        for op in ops {
            apply(&mut staged, op)?;
        }
        *workbook = staged;
        Ok(())
    }
}
