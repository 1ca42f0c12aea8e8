//! Checklist events pushed to WebSocket clients.
//!
//! Events are transient: they are built after a successful store mutation,
//! serialized once, and fanned out. Nothing persists them.

use serde::{Deserialize, Serialize};

/// A state change every connected client should react to.
///
/// Serialized with an inline `type` tag, e.g.
/// `{"type":"item_checked","item":"milk","checkedAt":"09:15:00","row":5}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChecklistEvent {
    /// A new line item was appended.
    ItemAdded {
        /// Target date (`YYYY-MM-DD`) the item was filed under.
        date: String,
        /// Item text.
        item: String,
    },
    /// A row was checked off.
    ItemChecked {
        /// Item text read from the row (empty if the cell was blank).
        item: String,
        /// Time of the check (`HH:MM:SS`).
        #[serde(rename = "checkedAt")]
        checked_at: String,
        /// 1-based sheet row.
        row: u32,
    },
    /// A row was unchecked.
    ItemUnchecked {
        /// Item text read from the row (empty if the cell was blank).
        item: String,
        /// 1-based sheet row.
        row: u32,
    },
}

impl ChecklistEvent {
    /// Wire `type` tag, used for logging and metric labels.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::ItemAdded { .. } => "item_added",
            Self::ItemChecked { .. } => "item_checked",
            Self::ItemUnchecked { .. } => "item_unchecked",
        }
    }
}
