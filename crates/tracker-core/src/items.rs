//! Sheet row layout and the `load` projection.
//!
//! Columns A–E hold `date`, `item`, `inputTime`, `checkedMarker`, `checkedAt`.
//! Row 1 is a header. Row identity is the 1-based position in the sheet.

use serde::{Deserialize, Serialize};

/// Marker written to column D when an item is checked.
pub const CHECKED_MARKER: &str = "済";

/// Spellings of column D that count as checked.
const TRUTHY_MARKERS: [&str; 3] = [CHECKED_MARKER, "TRUE", "true"];

/// Number of columns in a checklist row (A–E).
pub const COLUMN_COUNT: usize = 5;

/// Rows reserved for the header.
pub const HEADER_ROWS: usize = 1;

/// Characters of the date cell compared against the query date.
const DATE_PREFIX_LEN: usize = 10;

/// One checklist row as reported by `load`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    /// 1-based sheet row.
    pub row: u32,
    /// Item text (column B).
    pub item: String,
    /// Time the item was entered (column C).
    pub input_time: String,
    /// Whether column D holds a truthy marker.
    pub checked: bool,
    /// Column E when checked, otherwise empty.
    pub checked_at: String,
}

/// Whether a column D value counts as checked.
pub fn is_checked_marker(value: &str) -> bool {
    TRUTHY_MARKERS.contains(&value)
}

/// Project raw sheet rows (as read from `A:E`, header included) onto the
/// items filed under `date`.
///
/// Short rows are padded with empty cells. A row matches when the first ten
/// characters of its date cell equal `date` exactly.
pub fn items_for_date(rows: &[Vec<String>], date: &str) -> Vec<ChecklistItem> {
    rows.iter()
        .enumerate()
        .skip(HEADER_ROWS)
        .filter_map(|(index, cells)| {
            let cell = |i: usize| cells.get(i).map_or("", String::as_str);
            if date_prefix(cell(0)) != date {
                return None;
            }
            let checked = is_checked_marker(cell(3));
            Some(ChecklistItem {
                row: u32::try_from(index + 1).ok()?,
                item: cell(1).to_owned(),
                input_time: cell(2).to_owned(),
                checked,
                checked_at: if checked { cell(4).to_owned() } else { String::new() },
            })
        })
        .collect()
}

fn date_prefix(cell: &str) -> &str {
    match cell.char_indices().nth(DATE_PREFIX_LEN) {
        Some((end, _)) => &cell[..end],
        None => cell,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| (*c).to_owned()).collect()
    }

    fn sheet() -> Vec<Vec<String>> {
        vec![
            row(&["日付", "品目", "入力時刻", "チェック", "チェック時刻"]),
            row(&["2026-03-01", "milk", "08:00:00", "済", "09:00:00"]),
            row(&["2026-03-02", "eggs", "08:01:00"]),
            row(&["2026-03-01", "bread", "08:02:00", "", "10:00:00"]),
            row(&["2026-03-01 07:00", "tea", "08:03:00", "TRUE", "11:00:00"]),
            row(&[]),
            row(&["2026-03-01", "rice", "08:04:00", "true", "12:00:00"]),
        ]
    }

    #[test]
    fn header_row_is_never_returned() {
        let mut rows = sheet();
        rows[0][0] = "2026-03-01".into();
        let items = items_for_date(&rows, "2026-03-01");
        assert!(items.iter().all(|i| i.row != 1));
    }

    #[test]
    fn filters_by_date_prefix() {
        let items = items_for_date(&sheet(), "2026-03-01");
        let rows: Vec<u32> = items.iter().map(|i| i.row).collect();
        assert_eq!(rows, vec![2, 4, 5, 7]);
    }

    #[test]
    fn reports_one_based_rows_and_fields() {
        let items = items_for_date(&sheet(), "2026-03-02");
        assert_eq!(
            items,
            vec![ChecklistItem {
                row: 3,
                item: "eggs".into(),
                input_time: "08:01:00".into(),
                checked: false,
                checked_at: String::new(),
            }]
        );
    }

    #[test]
    fn checked_at_is_empty_when_unchecked() {
        let items = items_for_date(&sheet(), "2026-03-01");
        let bread = items.iter().find(|i| i.item == "bread").unwrap();
        assert!(!bread.checked);
        assert_eq!(bread.checked_at, "");
    }

    #[test]
    fn truthy_spellings() {
        assert!(is_checked_marker("済"));
        assert!(is_checked_marker("TRUE"));
        assert!(is_checked_marker("true"));
        assert!(!is_checked_marker("True"));
        assert!(!is_checked_marker(""));
        assert!(!is_checked_marker("FALSE"));
        assert!(!is_checked_marker(" 済"));
    }

    #[test]
    fn checked_rows_carry_checked_at() {
        let items = items_for_date(&sheet(), "2026-03-01");
        let tea = items.iter().find(|i| i.item == "tea").unwrap();
        assert!(tea.checked);
        assert_eq!(tea.checked_at, "11:00:00");
    }

    #[test]
    fn short_date_cells_never_match_longer_queries() {
        let rows = vec![row(&["header"]), row(&["2026-03"]), row(&[""])];
        assert!(items_for_date(&rows, "2026-03-01").is_empty());
        assert_eq!(items_for_date(&rows, "2026-03").len(), 1);
    }

    #[test]
    fn date_prefix_counts_characters_not_bytes() {
        assert_eq!(date_prefix("２０２６-03-01extra"), "２０２６-03-01");
        assert_eq!(date_prefix("short"), "short");
    }

    #[test]
    fn empty_sheet_yields_nothing() {
        assert!(items_for_date(&[], "2026-03-01").is_empty());
    }

    #[test]
    fn item_serializes_camel_case() {
        let item = ChecklistItem {
            row: 2,
            item: "milk".into(),
            input_time: "08:00:00".into(),
            checked: true,
            checked_at: "09:00:00".into(),
        };
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["inputTime"], "08:00:00");
        assert_eq!(value["checkedAt"], "09:00:00");
        assert_eq!(value["row"], 2);
    }
}
