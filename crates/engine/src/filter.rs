//! Sort and Search - Row View Layer
//!
//! Both operations produce a new row vector in view order; neither touches
//! record ids, so a row can always be found again after the view changes.
//!
//! Key invariants:
//! - Sort is stable: rows with equal keys keep their current relative order,
//!   in both directions
//! - Search always filters the pre-search snapshot, never the filtered view,
//!   so narrowing and widening a needle both work

use std::cmp::Ordering;

use crate::cell::CellValue;
use crate::table::{Row, SortState};

// =============================================================================
// SortKey: For stable, deterministic sorting
// =============================================================================

/// Key for sorting rows (includes tie-breaker for stability)
#[derive(Debug, Clone)]
pub struct SortKey {
    /// Cell value in the sort column (Null when the row is short)
    pub value: CellValue,
    /// Row position in the view at the moment sort is applied.
    /// This is the tie-breaker: "stable relative to what user currently sees"
    pub original_view_index: usize,
}

impl SortKey {
    pub fn new(row: &Row, column: usize, view_row: usize) -> Self {
        Self {
            value: row.cell(column).cloned().unwrap_or_default(),
            original_view_index: view_row,
        }
    }

    /// Compare in the requested direction. Only the value comparison flips;
    /// ties always fall back to view order.
    pub fn cmp_directed(&self, other: &SortKey, descending: bool) -> Ordering {
        let by_value = self.value.sort_cmp(&other.value);
        let by_value = if descending { by_value.reverse() } else { by_value };
        by_value.then(self.original_view_index.cmp(&other.original_view_index))
    }
}

/// Sort state after the user asks to sort by `column`.
///
/// Sorting the column that is already sorted ascending flips it to
/// descending; anything else sorts ascending.
pub fn next_sort_state(current: Option<SortState>, column: usize) -> SortState {
    let descending = match current {
        Some(state) => state.column == column && !state.descending,
        None => false,
    };
    SortState { column, descending }
}

/// Return `rows` reordered by `column`.
pub fn sort_rows(rows: &[Row], column: usize, descending: bool) -> Vec<Row> {
    let mut keyed: Vec<(SortKey, &Row)> = rows
        .iter()
        .enumerate()
        .map(|(view_row, row)| (SortKey::new(row, column, view_row), row))
        .collect();

    keyed.sort_by(|(a, _), (b, _)| a.cmp_directed(b, descending));

    keyed.into_iter().map(|(_, row)| row.clone()).collect()
}

// =============================================================================
// Search
// =============================================================================

/// Case-insensitive substring match on a cell's display text.
/// `needle_lower` must already be lowercase.
pub fn matches_needle(row: &Row, column: usize, needle_lower: &str) -> bool {
    match row.cell(column) {
        Some(cell) => cell.to_string().to_lowercase().contains(needle_lower),
        None => needle_lower.is_empty(),
    }
}

/// Rows from `source` whose `column` contains `needle` (case-insensitive),
/// in source order.
pub fn filter_rows(source: &[Row], column: usize, needle: &str) -> Vec<Row> {
    let needle_lower = needle.to_lowercase();
    source
        .iter()
        .filter(|row| matches_needle(row, column, &needle_lower))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{rows_from_data, RecordId};

    fn cells(rows: &[Row]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.cells.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    fn books() -> Vec<Row> {
        rows_from_data(vec![
            vec!["b".into(), 1i64.into()],
            vec!["a".into(), 1i64.into()],
            vec!["a".into(), 2i64.into()],
        ])
    }

    #[test]
    fn test_sort_stable_on_duplicate_keys() {
        let sorted = sort_rows(&books(), 1, false);
        assert_eq!(cells(&sorted), vec![vec!["b", "1"], vec!["a", "1"], vec!["a", "2"]]);
    }

    #[test]
    fn test_sort_descending_keeps_tie_order() {
        let sorted = sort_rows(&books(), 1, true);
        assert_eq!(cells(&sorted), vec![vec!["a", "2"], vec!["b", "1"], vec!["a", "1"]]);
    }

    #[test]
    fn test_sort_keeps_record_ids() {
        let sorted = sort_rows(&books(), 0, false);
        let ids: Vec<RecordId> = sorted.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![RecordId(1), RecordId(2), RecordId(0)]);
    }

    #[test]
    fn test_sort_short_rows_go_last() {
        let rows = rows_from_data(vec![vec!["z".into()], vec!["a".into(), 5i64.into()]]);
        let sorted = sort_rows(&rows, 1, false);
        assert_eq!(sorted[0].id, RecordId(1));
        assert_eq!(sorted[1].id, RecordId(0));
    }

    #[test]
    fn test_next_sort_state_toggles_same_column() {
        let first = next_sort_state(None, 2);
        assert_eq!(first, SortState { column: 2, descending: false });
        let second = next_sort_state(Some(first), 2);
        assert!(second.descending);
        let third = next_sort_state(Some(second), 2);
        assert!(!third.descending);
        let other = next_sort_state(Some(second), 0);
        assert_eq!(other, SortState { column: 0, descending: false });
    }

    #[test]
    fn test_filter_case_insensitive_substring() {
        let rows = rows_from_data(vec![
            vec!["The Hobbit".into(), 1937i64.into()],
            vec!["Dream of the Red Chamber".into(), 1791i64.into()],
            vec!["Le Petit Prince".into(), 1943i64.into()],
        ]);
        let hits = filter_rows(&rows, 0, "THE");
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, RecordId(0));
        assert_eq!(hits[1].id, RecordId(1));

        let by_year = filter_rows(&rows, 1, "194");
        assert_eq!(by_year.len(), 1);
        assert_eq!(by_year[0].id, RecordId(2));
    }
}
