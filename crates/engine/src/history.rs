//! State log for table changes.
//!
//! Append-only: entries are never reordered or pruned while the widget
//! lives. Entry 0 is always the initial snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::table::{Slot, SlotUpdate};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Position in the history (0 = initial snapshot)
    pub ordinal: usize,
    pub recorded_at: DateTime<Utc>,
    pub updates: Vec<SlotUpdate>,
}

impl LogEntry {
    pub fn slots(&self) -> Vec<Slot> {
        self.updates.iter().map(SlotUpdate::slot).collect()
    }

    pub fn touches(&self, slot: Slot) -> bool {
        self.updates.iter().any(|u| u.slot() == slot)
    }
}

#[derive(Debug, Default)]
pub struct History {
    entries: Vec<LogEntry>,
}

impl History {
    /// Start a history whose first entry is `snapshot`.
    pub fn with_snapshot(snapshot: Vec<SlotUpdate>) -> Self {
        let mut history = Self::default();
        history.commit(snapshot);
        history
    }

    /// Append an update set; returns its ordinal.
    ///
    /// Every call is recorded, even when the values equal the current state.
    pub fn commit(&mut self, updates: Vec<SlotUpdate>) -> usize {
        let ordinal = self.entries.len();
        self.entries.push(LogEntry {
            ordinal,
            recorded_at: Utc::now(),
            updates,
        });
        ordinal
    }

    pub fn get(&self, ordinal: usize) -> Option<&LogEntry> {
        self.entries.get(ordinal)
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries recorded after the initial snapshot.
    pub fn commit_count(&self) -> usize {
        self.entries.len().saturating_sub(1)
    }

    /// Replace everything with a fresh initial snapshot (new data loaded).
    pub fn reset(&mut self, snapshot: Vec<SlotUpdate>) {
        self.entries.clear();
        self.commit(snapshot);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::TableState;

    #[test]
    fn test_commit_assigns_sequential_ordinals() {
        let mut history = History::with_snapshot(TableState::default().snapshot());
        assert_eq!(history.len(), 1);
        assert_eq!(history.commit_count(), 0);

        assert_eq!(history.commit(vec![SlotUpdate::Search(true)]), 1);
        assert_eq!(history.commit(vec![SlotUpdate::Search(true)]), 2);
        assert_eq!(history.commit(vec![]), 3);

        let ordinals: Vec<usize> = history.entries().iter().map(|e| e.ordinal).collect();
        assert_eq!(ordinals, vec![0, 1, 2, 3]);
        assert_eq!(history.commit_count(), 3);
    }

    #[test]
    fn test_initial_snapshot_touches_every_slot() {
        let history = History::with_snapshot(TableState::default().snapshot());
        let first = history.get(0).unwrap();
        for slot in [Slot::Rows, Slot::Sort, Slot::Edit, Slot::Search, Slot::PreSearch] {
            assert!(first.touches(slot), "{:?} missing from snapshot", slot);
        }
    }

    #[test]
    fn test_reset_and_clear() {
        let mut history = History::with_snapshot(TableState::default().snapshot());
        history.commit(vec![SlotUpdate::Edit(None)]);
        history.reset(TableState::default().snapshot());
        assert_eq!(history.len(), 1);
        history.clear();
        assert!(history.is_empty());
    }
}
