//! Row storage seam shared by the Sheets client and the in-memory grid.

use async_trait::async_trait;

use crate::error::SheetsError;
use crate::range::CellRange;

/// Tabular store addressed by A1 ranges.
///
/// Cells are strings. Reads follow the Sheets convention of omitting trailing
/// empty cells and rows, so callers pad as needed.
#[async_trait]
pub trait RowStore: Send + Sync {
    /// Read the values in `range`, row-major.
    async fn read(&self, range: &CellRange) -> Result<Vec<Vec<String>>, SheetsError>;

    /// Append `rows` after the last non-empty row of the table in `range`.
    async fn append(&self, range: &CellRange, rows: Vec<Vec<String>>) -> Result<(), SheetsError>;

    /// Overwrite the cells of a bounded `range` with `rows`.
    async fn update(&self, range: &CellRange, rows: Vec<Vec<String>>) -> Result<(), SheetsError>;
}
