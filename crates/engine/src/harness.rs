//! Test harness for widget replay with a virtual clock.
//!
//! This module provides `ReplayHarness`, a wrapper around `Widget` that:
//! - Owns a clock that only moves when the test says so
//! - Records the table state after every replay tick
//! - Runs a replay to completion in one call
//!
//! Use this harness to test replay ordering and idempotence without a
//! terminal or real time passing.

use std::time::{Duration, Instant};

use crate::error::GridError;
use crate::script::{run_script, Action};
use crate::table::TableState;
use crate::widget::Widget;

pub struct ReplayHarness {
    pub widget: Widget,
    now: Instant,
    /// State after each applied replay entry, in order.
    pub frames: Vec<TableState>,
}

impl ReplayHarness {
    pub fn new(widget: Widget) -> Self {
        Self {
            widget,
            now: Instant::now(),
            frames: Vec::new(),
        }
    }

    /// Build a widget from headers + data and run `actions` on it.
    pub fn scripted(headers: &[&str], data: Vec<Vec<crate::cell::CellValue>>, actions: &[Action]) -> Self {
        let headers = headers.iter().map(|h| h.to_string()).collect();
        let mut widget = Widget::new(headers, data);
        run_script(&mut widget, actions).expect("script should apply");
        Self::new(widget)
    }

    pub fn now(&self) -> Instant {
        self.now
    }

    pub fn start(&mut self) -> Result<(), GridError> {
        self.widget.start_replay(self.now)
    }

    /// Move the clock forward and tick once; returns entries applied.
    pub fn advance(&mut self, by: Duration) -> usize {
        self.now += by;
        let mut applied = 0;
        while let Some(remaining) = self.widget.next_tick_in(self.now) {
            if !remaining.is_zero() {
                break;
            }
            let n = self.widget.tick(self.now);
            if n == 0 {
                break;
            }
            applied += n;
            self.frames.push(self.widget.state().clone());
        }
        applied
    }

    /// Start a replay and advance one interval at a time until it ends.
    /// Returns the final state.
    pub fn replay_to_end(&mut self) -> Result<TableState, GridError> {
        self.start()?;
        let period = self.widget.replay_interval();
        while self.widget.is_replaying() {
            self.advance(period);
        }
        Ok(self.widget.state().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{RecordId, SortState};

    fn books() -> Vec<Vec<crate::cell::CellValue>> {
        vec![
            vec!["The Hobbit".into(), 1937i64.into()],
            vec!["Le Petit Prince".into(), 1943i64.into()],
            vec!["Dream of the Red Chamber".into(), 1791i64.into()],
        ]
    }

    fn session() -> Vec<Action> {
        vec![
            Action::Sort { column: 1 },
            Action::ToggleSearch,
            Action::Search { column: 0, needle: "the".into() },
            Action::Edit { record: 0, column: 1 },
            Action::Save { value: "1938".into() },
            Action::ToggleSearch,
        ]
    }

    #[test]
    fn test_replay_one_frame_per_entry() {
        let mut h = ReplayHarness::scripted(&["Book", "Year"], books(), &session());
        let entries = h.widget.history().len();
        h.replay_to_end().unwrap();
        assert_eq!(h.frames.len(), entries);
        assert_eq!(h.frames[1].sort, Some(SortState { column: 1, descending: false }));
        assert!(h.frames[2].search_active);
        assert_eq!(h.frames[3].rows.len(), 2);
    }

    #[test]
    fn test_replay_twice_is_idempotent() {
        let mut h = ReplayHarness::scripted(&["Book", "Year"], books(), &session());
        let live = h.widget.state().clone();
        let first = h.replay_to_end().unwrap();
        let second = h.replay_to_end().unwrap();
        assert_eq!(first, live);
        assert_eq!(second, first);
    }

    #[test]
    fn test_replay_does_not_grow_history() {
        let mut h = ReplayHarness::scripted(&["Book", "Year"], books(), &session());
        let before = h.widget.history().len();
        h.replay_to_end().unwrap();
        assert_eq!(h.widget.history().len(), before);
        assert_eq!(h.widget.events().replayed().len(), before);
    }

    #[test]
    fn test_replay_respects_cadence() {
        let mut h = ReplayHarness::scripted(&["Book", "Year"], books(), &session());
        h.start().unwrap();
        assert_eq!(h.advance(Duration::from_millis(999)), 0);
        assert_eq!(h.advance(Duration::from_millis(1)), 1);
        assert_eq!(h.advance(Duration::from_millis(500)), 0);
        assert_eq!(h.advance(Duration::from_millis(500)), 1);
    }

    #[test]
    fn test_edit_survives_replay() {
        let mut h = ReplayHarness::scripted(&["Book", "Year"], books(), &session());
        let end = h.replay_to_end().unwrap();
        let hobbit = end.rows.iter().find(|r| r.id == RecordId(0)).unwrap();
        assert_eq!(hobbit.cells[1].to_string(), "1938");
        assert_eq!(end.rows.len(), 3);
    }
}
