//! Table state and the single reducer that mutates it.
//!
//! State is split into named slots. Every change, live or replayed, is a
//! `SlotUpdate` applied through `TableState::apply`; there is no other
//! write path into `TableState`.

use serde::{Deserialize, Serialize};

use crate::cell::CellValue;

/// Stable identity of a row: its index in the data as loaded.
/// Assigned once and carried through sort and filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId(pub usize);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub id: RecordId,
    pub cells: Vec<CellValue>,
}

impl Row {
    pub fn new(id: RecordId, cells: Vec<CellValue>) -> Self {
        Self { id, cells }
    }

    pub fn cell(&self, column: usize) -> Option<&CellValue> {
        self.cells.get(column)
    }
}

/// Assign record ids to freshly loaded data (row index = id).
pub fn rows_from_data(data: Vec<Vec<CellValue>>) -> Vec<Row> {
    data.into_iter()
        .enumerate()
        .map(|(idx, cells)| Row::new(RecordId(idx), cells))
        .collect()
}

/// Strip identity, leaving the plain cell grid (used by export).
pub fn rows_to_data(rows: &[Row]) -> Vec<Vec<CellValue>> {
    rows.iter().map(|row| row.cells.clone()).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub column: usize,
    pub descending: bool,
}

/// The cell currently open in the editor, addressed by record id so it
/// survives reordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditCursor {
    pub record: RecordId,
    pub column: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableState {
    /// Rows in view order (sorted and/or filtered)
    pub rows: Vec<Row>,
    pub sort: Option<SortState>,
    pub edit: Option<EditCursor>,
    pub search_active: bool,
    /// Full row set captured when search was switched on
    pub pre_search: Option<Vec<Row>>,
}

impl TableState {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows, ..Self::default() }
    }

    /// Every slot at its current value; used as the history's initial entry.
    pub fn snapshot(&self) -> Vec<SlotUpdate> {
        vec![
            SlotUpdate::Rows(self.rows.clone()),
            SlotUpdate::Sort(self.sort),
            SlotUpdate::Edit(self.edit),
            SlotUpdate::Search(self.search_active),
            SlotUpdate::PreSearch(self.pre_search.clone()),
        ]
    }

    /// The one write path into table state.
    pub fn apply(&mut self, update: &SlotUpdate) {
        match update {
            SlotUpdate::Rows(rows) => self.rows = rows.clone(),
            SlotUpdate::Sort(sort) => self.sort = *sort,
            SlotUpdate::Edit(edit) => self.edit = *edit,
            SlotUpdate::Search(active) => self.search_active = *active,
            SlotUpdate::PreSearch(rows) => self.pre_search = rows.clone(),
        }
    }

    pub fn apply_all<'a>(&mut self, updates: impl IntoIterator<Item = &'a SlotUpdate>) {
        for update in updates {
            self.apply(update);
        }
    }

    /// Row position in the current view for a record id.
    pub fn position_of(&self, record: RecordId) -> Option<usize> {
        self.rows.iter().position(|row| row.id == record)
    }

    pub fn row(&self, record: RecordId) -> Option<&Row> {
        self.rows.iter().find(|row| row.id == record)
    }
}

/// Named state slot targeted by an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Slot {
    Rows,
    Sort,
    Edit,
    Search,
    PreSearch,
}

/// A new value for one slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "slot", content = "value", rename_all = "snake_case")]
pub enum SlotUpdate {
    Rows(Vec<Row>),
    Sort(Option<SortState>),
    Edit(Option<EditCursor>),
    Search(bool),
    PreSearch(Option<Vec<Row>>),
}

impl SlotUpdate {
    pub fn slot(&self) -> Slot {
        match self {
            SlotUpdate::Rows(_) => Slot::Rows,
            SlotUpdate::Sort(_) => Slot::Sort,
            SlotUpdate::Edit(_) => Slot::Edit,
            SlotUpdate::Search(_) => Slot::Search,
            SlotUpdate::PreSearch(_) => Slot::PreSearch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Row> {
        rows_from_data(vec![
            vec![CellValue::text("x"), CellValue::text("1")],
            vec![CellValue::text("y"), CellValue::text("2")],
        ])
    }

    #[test]
    fn test_rows_from_data_assigns_index_ids() {
        let rows = sample();
        assert_eq!(rows[0].id, RecordId(0));
        assert_eq!(rows[1].id, RecordId(1));
        assert_eq!(rows_to_data(&rows)[1], vec![CellValue::text("y"), CellValue::text("2")]);
    }

    #[test]
    fn test_snapshot_restores_every_slot() {
        let mut state = TableState::new(sample());
        state.sort = Some(SortState { column: 1, descending: true });
        state.edit = Some(EditCursor { record: RecordId(1), column: 0 });
        state.search_active = true;
        state.pre_search = Some(sample());

        let snapshot = state.snapshot();
        let mut restored = TableState::default();
        restored.apply_all(&snapshot);
        assert_eq!(restored, state);
    }

    #[test]
    fn test_apply_touches_only_its_slot() {
        let mut state = TableState::new(sample());
        state.apply(&SlotUpdate::Search(true));
        assert!(state.search_active);
        assert_eq!(state.rows, sample());
        assert_eq!(SlotUpdate::Search(true).slot(), Slot::Search);
    }

    #[test]
    fn test_position_of_follows_record_id() {
        let mut state = TableState::new(sample());
        state.rows.reverse();
        assert_eq!(state.position_of(RecordId(0)), Some(1));
        assert_eq!(state.position_of(RecordId(9)), None);
    }
}
