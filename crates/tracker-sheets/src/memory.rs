//! In-process grid implementing [`RowStore`], for local runs and tests.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::SheetsError;
use crate::range::CellRange;
use crate::store::RowStore;

/// Sheets held in memory, keyed by sheet name.
#[derive(Debug, Default)]
pub struct InMemoryRowStore {
    sheets: RwLock<HashMap<String, Vec<Vec<String>>>>,
    unavailable: RwLock<Option<String>>,
}

impl InMemoryRowStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with `sheet` pre-filled with `rows` (row 1 first).
    pub fn with_rows(sheet: &str, rows: Vec<Vec<String>>) -> Self {
        let store = Self::new();
        let _ = store.sheets.write().insert(sheet.to_string(), rows);
        store
    }

    /// Make every subsequent call fail with `message` (`None` restores service).
    pub fn set_unavailable(&self, message: Option<&str>) {
        *self.unavailable.write() = message.map(str::to_string);
    }

    /// Copy of a sheet's raw grid.
    pub fn snapshot(&self, sheet: &str) -> Vec<Vec<String>> {
        self.sheets.read().get(sheet).cloned().unwrap_or_default()
    }

    fn check_available(&self) -> Result<(), SheetsError> {
        match self.unavailable.read().as_ref() {
            Some(message) => Err(SheetsError::Api {
                status: 503,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RowStore for InMemoryRowStore {
    async fn read(&self, range: &CellRange) -> Result<Vec<Vec<String>>, SheetsError> {
        self.check_available()?;
        let sheets = self.sheets.read();
        let Some(grid) = sheets.get(range.sheet()) else {
            return Ok(Vec::new());
        };

        let (first, last) = (range.first_column().index(), range.last_column().index());
        let (start, end) = match range.rows() {
            Some((r1, r2)) => (r1.saturating_sub(1) as usize, r2 as usize),
            None => (0, grid.len()),
        };

        let mut out: Vec<Vec<String>> = grid
            .iter()
            .skip(start)
            .take(end.saturating_sub(start))
            .map(|row| {
                let mut cells: Vec<String> = (first..=last)
                    .map(|i| row.get(i).cloned().unwrap_or_default())
                    .collect();
                while cells.last().is_some_and(String::is_empty) {
                    let _ = cells.pop();
                }
                cells
            })
            .collect();
        while out.last().is_some_and(Vec::is_empty) {
            let _ = out.pop();
        }
        Ok(out)
    }

    async fn append(&self, range: &CellRange, rows: Vec<Vec<String>>) -> Result<(), SheetsError> {
        self.check_available()?;
        let mut sheets = self.sheets.write();
        let grid = sheets.entry(range.sheet().to_string()).or_default();
        while grid.last().is_some_and(|row| row.iter().all(String::is_empty)) {
            let _ = grid.pop();
        }
        let offset = range.first_column().index();
        for values in rows {
            let mut row = vec![String::new(); offset];
            row.extend(values);
            grid.push(row);
        }
        Ok(())
    }

    async fn update(&self, range: &CellRange, rows: Vec<Vec<String>>) -> Result<(), SheetsError> {
        self.check_available()?;
        let Some((first_row, last_row)) = range.rows() else {
            return Err(SheetsError::InvalidRange(format!(
                "{range}: update needs a bounded row span"
            )));
        };
        if first_row == 0 {
            return Err(SheetsError::InvalidRange(format!("{range}: rows start at 1")));
        }
        let width = range
            .last_column()
            .index()
            .saturating_sub(range.first_column().index())
            + 1;
        let height = last_row.saturating_sub(first_row) as usize + 1;
        if rows.len() > height || rows.iter().any(|r| r.len() > width) {
            return Err(SheetsError::InvalidRange(format!(
                "{range}: values exceed the range"
            )));
        }

        let mut sheets = self.sheets.write();
        let grid = sheets.entry(range.sheet().to_string()).or_default();
        let offset = range.first_column().index();
        for (i, values) in rows.into_iter().enumerate() {
            let index = first_row as usize - 1 + i;
            if grid.len() <= index {
                grid.resize_with(index + 1, Vec::new);
            }
            let row = &mut grid[index];
            for (j, value) in values.into_iter().enumerate() {
                let col = offset + j;
                if row.len() <= col {
                    row.resize(col + 1, String::new());
                }
                row[col] = value;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::range::Column;

    const SHEET: &str = "Items";

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| (*c).to_string()).collect()
    }

    fn seeded() -> InMemoryRowStore {
        InMemoryRowStore::with_rows(
            SHEET,
            vec![
                row(&["date", "item", "inputTime", "checked", "checkedAt"]),
                row(&["2026-03-01", "milk", "08:00:00", "", ""]),
                row(&["2026-03-01", "", "08:01:00"]),
            ],
        )
    }

    #[tokio::test]
    async fn read_whole_columns_trims_trailing_empties() {
        let store = seeded();
        let rows = store
            .read(&CellRange::columns(SHEET, Column::A, Column::E))
            .await
            .unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1], row(&["2026-03-01", "milk", "08:00:00"]));
    }

    #[tokio::test]
    async fn read_single_cell() {
        let store = seeded();
        let cell = store.read(&CellRange::cell(SHEET, Column::B, 2)).await.unwrap();
        assert_eq!(cell, vec![row(&["milk"])]);
    }

    #[tokio::test]
    async fn read_empty_cell_returns_nothing() {
        let store = seeded();
        let cell = store.read(&CellRange::cell(SHEET, Column::B, 3)).await.unwrap();
        assert!(cell.is_empty());
        let beyond = store.read(&CellRange::cell(SHEET, Column::B, 99)).await.unwrap();
        assert!(beyond.is_empty());
    }

    #[tokio::test]
    async fn read_unknown_sheet_is_empty() {
        let store = seeded();
        let rows = store
            .read(&CellRange::columns("Other", Column::A, Column::E))
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn append_adds_after_last_row() {
        let store = seeded();
        let range = CellRange::columns(SHEET, Column::A, Column::E);
        store
            .append(&range, vec![row(&["2026-03-02", "eggs", "09:00:00", "", ""])])
            .await
            .unwrap();
        let grid = store.snapshot(SHEET);
        assert_eq!(grid.len(), 4);
        assert_eq!(grid[3][1], "eggs");
    }

    #[tokio::test]
    async fn update_row_span() {
        let store = seeded();
        store
            .update(
                &CellRange::row_span(SHEET, Column::D, Column::E, 2),
                vec![row(&["済", "10:00:00"])],
            )
            .await
            .unwrap();
        let grid = store.snapshot(SHEET);
        assert_eq!(grid[1][3], "済");
        assert_eq!(grid[1][4], "10:00:00");
    }

    #[tokio::test]
    async fn update_extends_short_rows() {
        let store = seeded();
        store
            .update(
                &CellRange::row_span(SHEET, Column::D, Column::E, 3),
                vec![row(&["済", "10:00:00"])],
            )
            .await
            .unwrap();
        assert_eq!(store.snapshot(SHEET)[2].len(), 5);
    }

    #[tokio::test]
    async fn update_unbounded_range_rejected() {
        let store = seeded();
        let err = store
            .update(&CellRange::columns(SHEET, Column::D, Column::E), vec![])
            .await
            .unwrap_err();
        assert_matches!(err, SheetsError::InvalidRange(_));
    }

    #[tokio::test]
    async fn update_oversized_values_rejected() {
        let store = seeded();
        let err = store
            .update(
                &CellRange::row_span(SHEET, Column::D, Column::E, 2),
                vec![row(&["a", "b", "c"])],
            )
            .await
            .unwrap_err();
        assert_matches!(err, SheetsError::InvalidRange(_));
    }

    #[tokio::test]
    async fn unavailable_store_fails_every_call() {
        let store = seeded();
        store.set_unavailable(Some("quota exceeded"));
        let range = CellRange::columns(SHEET, Column::A, Column::E);
        let err = store.read(&range).await.unwrap_err();
        assert_matches!(err, SheetsError::Api { status: 503, .. });
        assert!(store.append(&range, vec![]).await.is_err());

        store.set_unavailable(None);
        assert!(store.read(&range).await.is_ok());
    }
}
