//! A1-notation ranges.

use std::fmt;

/// Sheet column, 0-based (`A` = 0). Only single-letter columns are needed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Column(u8);

impl Column {
    /// Column A.
    pub const A: Self = Self(0);
    /// Column B.
    pub const B: Self = Self(1);
    /// Column C.
    pub const C: Self = Self(2);
    /// Column D.
    pub const D: Self = Self(3);
    /// Column E.
    pub const E: Self = Self(4);

    /// Column from its letter (`'A'..='Z'`, case-insensitive).
    pub fn from_letter(letter: char) -> Option<Self> {
        let upper = letter.to_ascii_uppercase();
        if !upper.is_ascii_uppercase() {
            return None;
        }
        u8::try_from(upper).ok().map(|b| Self(b - b'A'))
    }

    /// 0-based index.
    pub fn index(self) -> usize {
        usize::from(self.0)
    }

    /// Column letter.
    pub fn letter(self) -> char {
        char::from(b'A' + self.0)
    }
}

/// A rectangular range on one sheet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellRange {
    sheet: String,
    first: Column,
    last: Column,
    /// Inclusive 1-based row span; `None` means whole columns.
    rows: Option<(u32, u32)>,
}

impl CellRange {
    /// Whole columns `first:last`, e.g. `Sheet!A:E`.
    pub fn columns(sheet: impl Into<String>, first: Column, last: Column) -> Self {
        Self {
            sheet: sheet.into(),
            first,
            last,
            rows: None,
        }
    }

    /// A single cell, e.g. `Sheet!B5`.
    pub fn cell(sheet: impl Into<String>, column: Column, row: u32) -> Self {
        Self {
            sheet: sheet.into(),
            first: column,
            last: column,
            rows: Some((row, row)),
        }
    }

    /// Columns `first..=last` on one row, e.g. `Sheet!D5:E5`.
    pub fn row_span(sheet: impl Into<String>, first: Column, last: Column, row: u32) -> Self {
        Self {
            sheet: sheet.into(),
            first,
            last,
            rows: Some((row, row)),
        }
    }

    /// Sheet (tab) name.
    pub fn sheet(&self) -> &str {
        &self.sheet
    }

    /// First column.
    pub fn first_column(&self) -> Column {
        self.first
    }

    /// Last column.
    pub fn last_column(&self) -> Column {
        self.last
    }

    /// Inclusive 1-based row span, if bounded.
    pub fn rows(&self) -> Option<(u32, u32)> {
        self.rows
    }

    fn quoted_sheet(&self) -> String {
        let plain = self
            .sheet
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_');
        if plain {
            self.sheet.clone()
        } else {
            format!("'{}'", self.sheet.replace('\'', "''"))
        }
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sheet = self.quoted_sheet();
        let (first, last) = (self.first.letter(), self.last.letter());
        match self.rows {
            None => write!(f, "{sheet}!{first}:{last}"),
            Some((r1, r2)) if r1 == r2 && self.first == self.last => write!(f, "{sheet}!{first}{r1}"),
            Some((r1, r2)) => write!(f, "{sheet}!{first}{r1}:{last}{r2}"),
        }
    }
}
