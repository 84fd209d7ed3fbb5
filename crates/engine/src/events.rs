//! Event types for table change notifications.
//!
//! The widget pushes these as it commits, replays and loads. The view drains
//! them to drive its status line; tests use them to check ordering and that
//! warnings fire exactly once.

use crate::table::Slot;

/// Events emitted by a `Widget`.
#[derive(Debug, Clone, PartialEq)]
pub enum TableEvent {
    /// A user action was recorded and applied.
    Committed(CommittedEvent),

    /// A history entry was re-applied by the replay engine.
    Replayed(ReplayedEvent),

    /// Replay began over `entries` history entries.
    ReplayStarted { entries: usize },

    /// Replay applied its last entry, or was cancelled.
    ReplayStopped { completed: bool },

    /// Data finished loading from the bootstrap source.
    Loaded { rows: usize },

    /// Something the user should see but that did not change state.
    Warning(String),
}

/// Emitted once per commit.
#[derive(Debug, Clone, PartialEq)]
pub struct CommittedEvent {
    /// Ordinal of the new history entry.
    pub ordinal: usize,
    /// Slots the commit touched, in commit order.
    pub slots: Vec<Slot>,
}

/// Emitted once per replay tick.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayedEvent {
    pub ordinal: usize,
    /// Entries applied so far, including this one.
    pub applied: usize,
    pub total: usize,
}

/// Simple event collector owned by the widget.
#[derive(Debug, Default)]
pub struct EventCollector {
    events: Vec<TableEvent>,
}

impl EventCollector {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, event: TableEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[TableEvent] {
        &self.events
    }

    /// Take everything collected so far.
    pub fn drain(&mut self) -> Vec<TableEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Filter to only Committed events.
    pub fn committed(&self) -> Vec<&CommittedEvent> {
        self.events
            .iter()
            .filter_map(|e| match e {
                TableEvent::Committed(c) => Some(c),
                _ => None,
            })
            .collect()
    }

    /// Filter to only Replayed events.
    pub fn replayed(&self) -> Vec<&ReplayedEvent> {
        self.events
            .iter()
            .filter_map(|e| match e {
                TableEvent::Replayed(r) => Some(r),
                _ => None,
            })
            .collect()
    }

    /// Filter to only Warning messages.
    pub fn warnings(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                TableEvent::Warning(w) => Some(w.as_str()),
                _ => None,
            })
            .collect()
    }
}
