//! Column notation, cell addresses and sheet-qualified grid ranges

use crate::error::{Error, Result};
use crate::MAX_COLS;
use std::fmt;
use std::str::FromStr;

/// Convert a 1-based column number to letters (1 = A, 26 = Z, 27 = AA, etc.)
///
/// This is bijective base-26: there is no zero digit, so a remainder of zero
/// wraps to `Z` and borrows one from the next place.
///
/// # Examples
/// ```
/// use gridtable_core::column_letters;
///
/// assert_eq!(column_letters(1).unwrap(), "A");
/// assert_eq!(column_letters(26).unwrap(), "Z");
/// assert_eq!(column_letters(27).unwrap(), "AA");
/// assert!(column_letters(0).is_err());
/// ```
pub fn column_letters(number: u32) -> Result<String> {
    if number < 1 {
        return Err(Error::InvalidColumn(format!(
            "column number must be >= 1, got {}",
            number
        )));
    }

    let mut result = Vec::new();
    let mut n = number;

    while n > 0 {
        n -= 1;
        result.push((n % 26) as u8 + b'A');
        n /= 26;
    }

    result.reverse();
    Ok(result.into_iter().map(char::from).collect())
}

/// Convert column letters to a 0-based index (A = 0, Z = 25, AA = 26, ZZ = 701)
///
/// Only one or two upper-case letters are accepted (`[A-Z]` or `[A-Z][A-Z]`).
pub fn column_index(letters: &str) -> Result<u32> {
    let bytes = letters.as_bytes();
    let valid = matches!(bytes.len(), 1 | 2) && bytes.iter().all(u8::is_ascii_uppercase);

    if !valid {
        return Err(Error::InvalidColumn(format!(
            "expected [A-Z] or [A-Z][A-Z], got '{}'",
            letters
        )));
    }

    let number = bytes
        .iter()
        .fold(0u32, |acc, b| acc * 26 + u32::from(b - b'A' + 1));

    Ok(number - 1)
}

/// A single cell position (e.g., "A1", "ZZ10")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellAddress {
    /// Row index (0-based internally, 1-based in display)
    pub row: u32,
    /// Column index (0-based, A=0, B=1, ..., ZZ=701)
    pub col: u32,
}

impl CellAddress {
    /// Create a new cell address
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Parse a cell address from A1-style notation
    ///
    /// # Examples
    /// ```
    /// use gridtable_core::CellAddress;
    ///
    /// let addr = CellAddress::parse("B2").unwrap();
    /// assert_eq!(addr.row, 1);
    /// assert_eq!(addr.col, 1);
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let split = s
            .find(|c: char| !c.is_ascii_alphabetic())
            .ok_or_else(|| Error::InvalidAddress(format!("no row number in '{}'", s)))?;

        if split == 0 {
            return Err(Error::InvalidAddress(format!(
                "no column letters in '{}'",
                s
            )));
        }

        let col = column_index(&s[..split])?;
        let row: u32 = s[split..]
            .parse()
            .map_err(|_| Error::InvalidAddress(format!("invalid row number in '{}'", s)))?;

        if row == 0 {
            return Err(Error::InvalidAddress(format!(
                "row number must be >= 1 in '{}'",
                s
            )));
        }

        Ok(Self { row: row - 1, col })
    }

    /// Format as A1-style string
    pub fn to_a1_string(&self) -> String {
        // `col` is 0-based, so the 1-based number is never zero
        let letters = column_letters(self.col + 1).unwrap_or_default();
        format!("{}{}", letters, self.row + 1)
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for CellAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// A sheet-qualified rectangular range, e.g. `member!A2:D10`
///
/// Rows and columns are 1-based here because this is the form that crosses
/// the wire. When `end_row` is `None` the range runs to the end of the
/// sheet's used area (`member!A2:D`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GridRange {
    /// Sheet the range belongs to
    pub sheet: String,
    /// First row (1-based, inclusive)
    pub start_row: u32,
    /// Last row (1-based, inclusive), or open-ended
    pub end_row: Option<u32>,
    /// First column number (1-based, inclusive)
    pub start_col: u32,
    /// Last column number (1-based, inclusive)
    pub end_col: u32,
}

impl GridRange {
    /// Rows `start_row..=end_row` across columns `1..=column_count`
    pub fn rows<S: Into<String>>(
        sheet: S,
        start_row: u32,
        end_row: Option<u32>,
        column_count: u32,
    ) -> Result<Self> {
        let range = Self {
            sheet: sheet.into(),
            start_row,
            end_row,
            start_col: 1,
            end_col: column_count,
        };
        range.validate()?;
        Ok(range)
    }

    /// A single row across columns `1..=column_count`
    pub fn row<S: Into<String>>(sheet: S, row: u32, column_count: u32) -> Result<Self> {
        Self::rows(sheet, row, Some(row), column_count)
    }

    /// Parse `"<sheet>!<col><row>:<col>[<row>]"`
    ///
    /// # Examples
    /// ```
    /// use gridtable_core::GridRange;
    ///
    /// let range = GridRange::parse("member!A2:D").unwrap();
    /// assert_eq!(range.sheet, "member");
    /// assert_eq!(range.start_row, 2);
    /// assert_eq!(range.end_row, None);
    /// assert_eq!(range.end_col, 4);
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let (sheet, cells) = s
            .rsplit_once('!')
            .ok_or_else(|| Error::InvalidRange(format!("missing sheet name in '{}'", s)))?;

        if sheet.is_empty() {
            return Err(Error::InvalidRange(format!("empty sheet name in '{}'", s)));
        }

        let (start, end) = cells.split_once(':').unwrap_or((cells, cells));
        let start = CellAddress::parse(start)?;

        let end = end.trim();
        let split = end
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(end.len());
        let end_col = column_index(&end[..split])? + 1;
        let end_row = match &end[split..] {
            "" => None,
            digits => Some(
                digits
                    .parse::<u32>()
                    .map_err(|_| Error::InvalidRange(format!("invalid end row in '{}'", s)))?,
            ),
        };

        let range = Self {
            sheet: sheet.to_string(),
            start_row: start.row + 1,
            end_row,
            start_col: start.col + 1,
            end_col,
        };
        range.validate()?;
        Ok(range)
    }

    /// Number of columns covered
    pub fn col_count(&self) -> u32 {
        self.end_col - self.start_col + 1
    }

    /// Check whether a 1-based row falls inside the range
    pub fn contains_row(&self, row: u32) -> bool {
        row >= self.start_row && self.end_row.map_or(true, |end| row <= end)
    }

    /// Format as `"<sheet>!A<start>:<endCol><end>"`
    pub fn to_a1_string(&self) -> String {
        let start_col = column_letters(self.start_col).unwrap_or_default();
        let end_col = column_letters(self.end_col).unwrap_or_default();
        match self.end_row {
            Some(end_row) => format!(
                "{}!{}{}:{}{}",
                self.sheet, start_col, self.start_row, end_col, end_row
            ),
            None => format!("{}!{}{}:{}", self.sheet, start_col, self.start_row, end_col),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.start_row == 0 {
            return Err(Error::InvalidRange(format!(
                "start row must be >= 1 in {:?}",
                self
            )));
        }
        if let Some(end_row) = self.end_row {
            if end_row < self.start_row {
                return Err(Error::InvalidRange(format!(
                    "end row {} before start row {}",
                    end_row, self.start_row
                )));
            }
        }
        if self.start_col == 0 || self.end_col < self.start_col {
            return Err(Error::InvalidRange(format!(
                "bad column span {}..{}",
                self.start_col, self.end_col
            )));
        }
        if self.end_col > MAX_COLS {
            return Err(Error::ColumnOutOfBounds(self.end_col, MAX_COLS));
        }
        Ok(())
    }
}

impl fmt::Display for GridRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for GridRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
