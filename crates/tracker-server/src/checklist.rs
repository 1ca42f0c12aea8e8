//! Checklist operations over the row store.
//!
//! Every mutation writes to the store first and broadcasts only once the write
//! has succeeded. Delivery problems never fail the operation.

use std::sync::Arc;

use tracing::{info, warn};
use tracker_core::{
    CHECKED_MARKER, ChecklistEvent, ChecklistItem, Clock, format_date, format_time, items_for_date,
    target_date,
};
use tracker_sheets::{CellRange, Column, RowStore, SheetsError};

use crate::websocket::broadcast::BroadcastDispatcher;

/// First row that holds data; row 1 is the header.
const FIRST_DATA_ROW: u32 = 2;

/// Checklist operation errors.
#[derive(Debug, thiserror::Error)]
pub enum ChecklistError {
    /// The row store call failed.
    #[error(transparent)]
    Store(#[from] SheetsError),
    /// `action` was neither `check` nor `uncheck`.
    #[error("Unknown action")]
    UnknownAction(String),
    /// Row is the header or zero.
    #[error("invalid row {0}: data starts at row 2")]
    InvalidRow(u32),
}

impl ChecklistError {
    /// Short classification string for logging/metrics.
    pub fn error_kind(&self) -> &'static str {
        match self {
            Self::Store(e) => e.error_kind(),
            Self::UnknownAction(_) => "unknown_action",
            Self::InvalidRow(_) => "invalid_row",
        }
    }
}

/// Check-state change requested by a client.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CheckAction {
    /// Mark done.
    Check,
    /// Clear the mark.
    Uncheck,
}

impl std::str::FromStr for CheckAction {
    type Err = ChecklistError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "check" => Ok(Self::Check),
            "uncheck" => Ok(Self::Uncheck),
            other => Err(ChecklistError::UnknownAction(other.to_string())),
        }
    }
}

/// Result of a successful `add`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddedItem {
    /// Date the item was filed under.
    pub date: String,
    /// Item text.
    pub item: String,
}

/// Checklist backed by a [`RowStore`] sheet.
pub struct ChecklistService {
    store: Arc<dyn RowStore>,
    dispatcher: BroadcastDispatcher,
    clock: Arc<dyn Clock>,
    sheet_name: String,
    cutoff_hour: u32,
}

impl std::fmt::Debug for ChecklistService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChecklistService")
            .field("sheet_name", &self.sheet_name)
            .field("cutoff_hour", &self.cutoff_hour)
            .finish_non_exhaustive()
    }
}

impl ChecklistService {
    /// Service writing to `sheet_name`, rolling new items to tomorrow from
    /// `cutoff_hour` onward.
    pub fn new(
        store: Arc<dyn RowStore>,
        dispatcher: BroadcastDispatcher,
        clock: Arc<dyn Clock>,
        sheet_name: impl Into<String>,
        cutoff_hour: u32,
    ) -> Self {
        Self {
            store,
            dispatcher,
            clock,
            sheet_name: sheet_name.into(),
            cutoff_hour,
        }
    }

    /// Dispatcher used for change notifications.
    pub fn dispatcher(&self) -> &BroadcastDispatcher {
        &self.dispatcher
    }

    /// Items filed under `date` (`YYYY-MM-DD`).
    pub async fn load(&self, date: &str) -> Result<Vec<ChecklistItem>, ChecklistError> {
        let rows = self.store.read(&self.table_range()).await?;
        Ok(items_for_date(&rows, date))
    }

    /// Append `item` under today's date, or tomorrow's past the cutoff.
    pub async fn add(&self, item: &str) -> Result<AddedItem, ChecklistError> {
        let now = self.clock.now();
        let date = format_date(target_date(&now, self.cutoff_hour));
        let row = vec![
            date.clone(),
            item.to_string(),
            format_time(&now),
            String::new(),
            String::new(),
        ];
        self.store.append(&self.table_range(), vec![row]).await?;
        info!(%date, item, "item added");

        let _ = self
            .dispatcher
            .broadcast(&ChecklistEvent::ItemAdded {
                date: date.clone(),
                item: item.to_string(),
            })
            .await;
        Ok(AddedItem {
            date,
            item: item.to_string(),
        })
    }

    /// Mark `row` done. Returns the check time (`HH:MM:SS`).
    pub async fn check(&self, row: u32) -> Result<String, ChecklistError> {
        validate_row(row)?;
        let item = self.item_name(row).await?;
        let checked_at = format_time(&self.clock.now());
        self.store
            .update(
                &self.mark_range(row),
                vec![vec![CHECKED_MARKER.to_string(), checked_at.clone()]],
            )
            .await?;
        info!(row, item, %checked_at, "item checked");

        let _ = self
            .dispatcher
            .broadcast(&ChecklistEvent::ItemChecked {
                item,
                checked_at: checked_at.clone(),
                row,
            })
            .await;
        Ok(checked_at)
    }

    /// Clear the mark on `row`.
    pub async fn uncheck(&self, row: u32) -> Result<(), ChecklistError> {
        validate_row(row)?;
        let item = self.item_name(row).await?;
        self.store
            .update(&self.mark_range(row), vec![vec![String::new(), String::new()]])
            .await?;
        info!(row, item, "item unchecked");

        let _ = self
            .dispatcher
            .broadcast(&ChecklistEvent::ItemUnchecked { item, row })
            .await;
        Ok(())
    }

    /// Apply a client-supplied action string to `row`.
    ///
    /// Returns the check time for `check`, `None` for `uncheck`.
    pub async fn apply(&self, action: &str, row: u32) -> Result<Option<String>, ChecklistError> {
        match action.parse::<CheckAction>()? {
            CheckAction::Check => self.check(row).await.map(Some),
            CheckAction::Uncheck => self.uncheck(row).await.map(|()| None),
        }
    }

    /// Item text in column B, or `""` when the cell is empty.
    async fn item_name(&self, row: u32) -> Result<String, ChecklistError> {
        let values = self
            .store
            .read(&CellRange::cell(self.sheet_name.as_str(), Column::B, row))
            .await?;
        let name = values
            .into_iter()
            .next()
            .and_then(|cells| cells.into_iter().next())
            .unwrap_or_default();
        if name.is_empty() {
            warn!(row, "no item text for row");
        }
        Ok(name)
    }

    fn table_range(&self) -> CellRange {
        CellRange::columns(self.sheet_name.as_str(), Column::A, Column::E)
    }

    fn mark_range(&self, row: u32) -> CellRange {
        CellRange::row_span(self.sheet_name.as_str(), Column::D, Column::E, row)
    }
}

fn validate_row(row: u32) -> Result<(), ChecklistError> {
    if row < FIRST_DATA_ROW {
        return Err(ChecklistError::InvalidRow(row));
    }
    Ok(())
}
