//! Workbook type - an ordered collection of named sheets

use crate::error::{Error, Result};
use crate::worksheet::Worksheet;
use crate::{SheetId, DEFAULT_SHEET_NAME, MAX_SHEET_NAME_LEN};

/// A workbook (spreadsheet document)
///
/// Sheets are addressed by name; each also carries a stable [`SheetId`]
/// that is never reused within the workbook.
#[derive(Debug, Clone)]
pub struct Workbook {
    /// Worksheets in the workbook
    worksheets: Vec<Worksheet>,
    /// Next id handed out by `add_worksheet_with_name`
    next_sheet_id: SheetId,
}

impl Workbook {
    /// Create a new workbook with one empty default worksheet ("Sheet1")
    pub fn new() -> Self {
        Self {
            worksheets: vec![Worksheet::new(0, DEFAULT_SHEET_NAME)],
            next_sheet_id: 1,
        }
    }

    /// Create an empty workbook with no worksheets
    pub fn empty() -> Self {
        Self {
            worksheets: Vec::new(),
            next_sheet_id: 0,
        }
    }

    /// Get the number of worksheets
    pub fn sheet_count(&self) -> usize {
        self.worksheets.len()
    }

    /// Check if the workbook has no worksheets
    pub fn is_empty(&self) -> bool {
        self.worksheets.is_empty()
    }

    /// Get a worksheet by index
    pub fn worksheet(&self, index: usize) -> Option<&Worksheet> {
        self.worksheets.get(index)
    }

    /// Get a worksheet by name
    pub fn worksheet_by_name(&self, name: &str) -> Option<&Worksheet> {
        self.worksheets.iter().find(|ws| ws.name() == name)
    }

    /// Get a mutable worksheet by name
    pub fn worksheet_by_name_mut(&mut self, name: &str) -> Option<&mut Worksheet> {
        self.worksheets.iter_mut().find(|ws| ws.name() == name)
    }

    /// Get a mutable worksheet by name, or [`Error::SheetNotFound`]
    pub fn require_worksheet_mut(&mut self, name: &str) -> Result<&mut Worksheet> {
        self.worksheet_by_name_mut(name)
            .ok_or_else(|| Error::SheetNotFound(name.into()))
    }

    /// Get the id of a worksheet by name
    pub fn sheet_id(&self, name: &str) -> Option<SheetId> {
        self.worksheet_by_name(name).map(Worksheet::id)
    }

    /// Iterate over all worksheets
    pub fn worksheets(&self) -> impl Iterator<Item = &Worksheet> {
        self.worksheets.iter()
    }

    /// Names of all worksheets in order
    pub fn sheet_names(&self) -> Vec<String> {
        self.worksheets.iter().map(|ws| ws.name().to_string()).collect()
    }

    /// Add a new worksheet with specified name
    pub fn add_worksheet_with_name(&mut self, name: &str) -> Result<SheetId> {
        self.validate_sheet_name(name, None)?;

        let id = self.next_sheet_id;
        self.next_sheet_id += 1;
        self.worksheets.push(Worksheet::new(id, name));

        Ok(id)
    }

    /// Remove a worksheet by name
    pub fn remove_worksheet(&mut self, name: &str) -> Result<Worksheet> {
        let index = self
            .worksheets
            .iter()
            .position(|ws| ws.name() == name)
            .ok_or_else(|| Error::SheetNotFound(name.into()))?;

        Ok(self.worksheets.remove(index))
    }

    /// Rename a worksheet
    pub fn rename_worksheet(&mut self, name: &str, new_name: &str) -> Result<()> {
        let index = self
            .worksheets
            .iter()
            .position(|ws| ws.name() == name)
            .ok_or_else(|| Error::SheetNotFound(name.into()))?;

        // Validate the new name (excluding current sheet from duplicate check)
        self.validate_sheet_name(new_name, Some(index))?;

        self.worksheets[index].set_name(new_name);
        Ok(())
    }

    /// Validate a sheet name, optionally excluding a sheet from duplicate check
    fn validate_sheet_name(&self, name: &str, exclude_index: Option<usize>) -> Result<()> {
        if name.is_empty() {
            return Err(Error::InvalidSheetName("Sheet name cannot be empty".into()));
        }
        if name.chars().count() > MAX_SHEET_NAME_LEN {
            return Err(Error::InvalidSheetName(format!(
                "Sheet name too long (max {} characters)",
                MAX_SHEET_NAME_LEN
            )));
        }

        // '!' separates the sheet from the cells in a range address
        const INVALID_CHARS: &[char] = &['!', ':', '\\', '/', '?', '*', '[', ']'];
        if let Some(c) = INVALID_CHARS.iter().find(|c| name.contains(**c)) {
            return Err(Error::InvalidSheetName(format!(
                "Sheet name cannot contain '{}'",
                c
            )));
        }

        // Exact match, the same rule lookups by name use
        let taken = self
            .worksheets
            .iter()
            .enumerate()
            .any(|(i, ws)| Some(i) != exclude_index && ws.name() == name);
        if taken {
            return Err(Error::DuplicateSheetName(name.into()));
        }

        Ok(())
    }
}

impl Default for Workbook {
    fn default() -> Self {
        Self::new()
    }
}
