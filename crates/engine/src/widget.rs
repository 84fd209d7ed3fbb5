//! The table widget: live state, its state log, and the replay engine.
//!
//! One `Widget` owns exactly one history and one replay engine. Nothing is
//! shared between instances; a new widget starts with a fresh history whose
//! only entry is the initial snapshot.
//!
//! Write paths:
//! - user actions go through `record`, which appends to the history and then
//!   applies the same updates through `TableState::apply`
//! - replay ticks apply history entries through `TableState::apply` and never
//!   record
//!
//! While a replay runs, every user action is refused with
//! `GridError::ReplayInProgress`, so the log cannot grow under the replay.

use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::cell::CellValue;
use crate::error::GridError;
use crate::events::{CommittedEvent, EventCollector, ReplayedEvent, TableEvent};
use crate::filter;
use crate::history::History;
use crate::replay::{ReplayEngine, DEFAULT_REPLAY_INTERVAL};
use crate::source::{DataProvider, RawRows};
use crate::table::{rows_from_data, rows_to_data, EditCursor, RecordId, Row, SlotUpdate, TableState};
use crate::validation::{Column, ColumnKind};

/// Warning text when replay is requested before anything was recorded.
pub const NO_HISTORY_WARNING: &str = "No state changes to replay yet";

/// Whether the bootstrap data has arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    /// No rows yet; the view shows a loading row
    Loading,
    Ready,
    /// The data source failed; current rows (if any) are kept
    Failed(String),
}

pub struct Widget {
    columns: Vec<Column>,
    /// Column kinds came from configuration and must not be re-inferred
    kinds_configured: bool,
    state: TableState,
    history: History,
    replay: ReplayEngine,
    events: EventCollector,
    load_status: LoadStatus,
    mounted: bool,
}

impl Widget {
    /// Build a widget from headers and initial data; column kinds are
    /// inferred from the data.
    pub fn new(headers: Vec<String>, initial_data: RawRows) -> Self {
        let columns = infer_columns(headers, &initial_data);
        Self::build(columns, false, initial_data)
    }

    /// Build a widget with explicit column kinds.
    pub fn with_columns(columns: Vec<Column>, initial_data: RawRows) -> Self {
        Self::build(columns, true, initial_data)
    }

    fn build(columns: Vec<Column>, kinds_configured: bool, initial_data: RawRows) -> Self {
        let load_status = if initial_data.is_empty() {
            LoadStatus::Loading
        } else {
            LoadStatus::Ready
        };
        let state = TableState::new(rows_from_data(initial_data));
        let history = History::with_snapshot(state.snapshot());
        Self {
            columns,
            kinds_configured,
            state,
            history,
            replay: ReplayEngine::new(DEFAULT_REPLAY_INTERVAL),
            events: EventCollector::new(),
            load_status,
            mounted: true,
        }
    }

    /// Change the replay cadence. Has no effect on a running replay.
    pub fn with_replay_interval(mut self, period: Duration) -> Self {
        if !self.replay.is_replaying() {
            self.replay = ReplayEngine::new(period);
        }
        self
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn state(&self) -> &TableState {
        &self.state
    }

    pub fn rows(&self) -> &[Row] {
        &self.state.rows
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn load_status(&self) -> &LoadStatus {
        &self.load_status
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn is_replaying(&self) -> bool {
        self.replay.is_replaying()
    }

    /// `(applied, total)` while replaying.
    pub fn replay_progress(&self) -> Option<(usize, usize)> {
        self.replay.progress()
    }

    pub fn replay_interval(&self) -> Duration {
        self.replay.period()
    }

    pub fn events(&self) -> &EventCollector {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<TableEvent> {
        self.events.drain()
    }

    /// Header titles with the sort arrow on the sorted column
    /// (up = descending, down = ascending).
    pub fn header_labels(&self) -> Vec<String> {
        self.columns
            .iter()
            .enumerate()
            .map(|(idx, column)| match self.state.sort {
                Some(sort) if sort.column == idx => {
                    let arrow = if sort.descending { '\u{2191}' } else { '\u{2193}' };
                    format!("{} {}", column.title, arrow)
                }
                _ => column.title.clone(),
            })
            .collect()
    }

    /// Current rows with identity stripped, ready for export.
    pub fn export_data(&self) -> RawRows {
        rows_to_data(&self.state.rows)
    }

    // -------------------------------------------------------------------------
    // Loading
    // -------------------------------------------------------------------------

    /// Replace the data with what `provider` returns.
    ///
    /// On success the rows get fresh record ids and the history restarts from
    /// a new initial snapshot. On failure the status becomes `Failed` and the
    /// current rows stay on screen.
    pub fn load(&mut self, provider: &dyn DataProvider) -> Result<usize, GridError> {
        self.guard()?;
        let source = provider.describe();
        match provider.fetch() {
            Ok(data) => {
                if !self.kinds_configured {
                    let headers = self.columns.iter().map(|c| c.title.clone()).collect();
                    self.columns = infer_columns(headers, &data);
                }
                let count = data.len();
                self.state = TableState::new(rows_from_data(data));
                self.history.reset(self.state.snapshot());
                self.load_status = LoadStatus::Ready;
                info!("Loaded {} rows from {}", count, source);
                self.events.push(TableEvent::Loaded { rows: count });
                Ok(count)
            }
            Err(msg) => {
                warn!("Data load from {} failed: {}", source, msg);
                self.load_status = LoadStatus::Failed(msg.clone());
                self.events.push(TableEvent::Warning(format!("Failed to load data: {}", msg)));
                Err(GridError::DataLoadFailed(msg))
            }
        }
    }

    // -------------------------------------------------------------------------
    // Recorder
    // -------------------------------------------------------------------------

    fn guard(&self) -> Result<(), GridError> {
        if !self.mounted {
            Err(GridError::Unmounted)
        } else if self.replay.is_replaying() {
            Err(GridError::ReplayInProgress)
        } else {
            Ok(())
        }
    }

    fn check_column(&self, column: usize) -> Result<(), GridError> {
        if column < self.columns.len() {
            Ok(())
        } else {
            Err(GridError::NoSuchColumn(column))
        }
    }

    /// Record a set of slot updates and apply them to live state.
    ///
    /// Every call is logged, whether or not the values differ from the
    /// current state. Returns the new entry's ordinal.
    pub fn commit(&mut self, updates: Vec<SlotUpdate>) -> Result<usize, GridError> {
        self.guard()?;
        Ok(self.record(updates))
    }

    fn record(&mut self, updates: Vec<SlotUpdate>) -> usize {
        let slots = updates.iter().map(SlotUpdate::slot).collect::<Vec<_>>();
        let ordinal = self.history.commit(updates);
        if let Some(entry) = self.history.get(ordinal) {
            self.state.apply_all(&entry.updates);
        }
        debug!("commit #{} {:?}", ordinal, slots);
        self.events.push(TableEvent::Committed(CommittedEvent { ordinal, slots }));
        ordinal
    }

    // -------------------------------------------------------------------------
    // User actions (one commit each)
    // -------------------------------------------------------------------------

    /// Sort by `column`; sorting the same column again flips direction.
    ///
    /// While a search is active the pre-search snapshot is sorted too, so
    /// clearing or hiding the search keeps the order the header shows.
    pub fn sort(&mut self, column: usize) -> Result<usize, GridError> {
        self.guard()?;
        self.check_column(column)?;

        let next = filter::next_sort_state(self.state.sort, column);
        let rows = filter::sort_rows(&self.state.rows, column, next.descending);
        let mut updates = vec![SlotUpdate::Rows(rows), SlotUpdate::Sort(Some(next))];
        if let Some(pre_search) = &self.state.pre_search {
            let sorted = filter::sort_rows(pre_search, column, next.descending);
            updates.push(SlotUpdate::PreSearch(Some(sorted)));
        }
        Ok(self.record(updates))
    }

    /// Open the editor on a cell.
    pub fn show_editor(&mut self, record: RecordId, column: usize) -> Result<usize, GridError> {
        self.guard()?;
        if column >= self.columns.len() || self.state.row(record).is_none() {
            return Err(GridError::NoSuchCell { record, column });
        }
        Ok(self.record(vec![SlotUpdate::Edit(Some(EditCursor { record, column }))]))
    }

    /// Commit editor input into the cell under the edit cursor.
    ///
    /// The value is written into the visible rows and, while a search is
    /// active, into the pre-search snapshot, both matched by record id.
    /// Input that does not fit the column kind is rejected and the editor
    /// stays open.
    pub fn save(&mut self, input: &str) -> Result<usize, GridError> {
        self.guard()?;
        let cursor = self.state.edit.ok_or(GridError::NoActiveEdit)?;
        let kind = self
            .columns
            .get(cursor.column)
            .map(|c| c.kind)
            .ok_or(GridError::NoSuchColumn(cursor.column))?;

        let value = kind.parse_input(input).ok_or_else(|| GridError::InvalidCellValue {
            column: cursor.column,
            value: input.to_string(),
            expected: kind.label(),
        })?;

        let mut updates = vec![
            SlotUpdate::Rows(write_cell(&self.state.rows, cursor, &value)),
            SlotUpdate::Edit(None),
        ];
        if let Some(pre_search) = &self.state.pre_search {
            updates.push(SlotUpdate::PreSearch(Some(write_cell(pre_search, cursor, &value))));
        }
        Ok(self.record(updates))
    }

    /// Close the editor without saving.
    pub fn cancel_edit(&mut self) -> Result<usize, GridError> {
        self.guard()?;
        Ok(self.record(vec![SlotUpdate::Edit(None)]))
    }

    /// Show or hide the search row.
    ///
    /// Showing captures the full row set; hiding restores it.
    pub fn toggle_search(&mut self) -> Result<usize, GridError> {
        self.guard()?;
        let updates = if self.state.search_active {
            let restored = self
                .state
                .pre_search
                .clone()
                .unwrap_or_else(|| self.state.rows.clone());
            vec![
                SlotUpdate::Rows(restored),
                SlotUpdate::Search(false),
                SlotUpdate::PreSearch(None),
            ]
        } else {
            vec![
                SlotUpdate::PreSearch(Some(self.state.rows.clone())),
                SlotUpdate::Search(true),
            ]
        };
        Ok(self.record(updates))
    }

    /// Filter the pre-search rows on `column`. An empty needle shows them all.
    ///
    /// An active sort is re-applied to the result so the header arrow stays
    /// truthful.
    pub fn search(&mut self, column: usize, needle: &str) -> Result<usize, GridError> {
        self.guard()?;
        if !self.state.search_active {
            return Err(GridError::SearchInactive);
        }
        self.check_column(column)?;

        let source = self.state.pre_search.as_deref().unwrap_or(&self.state.rows);
        let mut rows = if needle.is_empty() {
            source.to_vec()
        } else {
            filter::filter_rows(source, column, needle)
        };
        if !needle.is_empty() {
            if let Some(sort) = self.state.sort {
                rows = filter::sort_rows(&rows, sort.column, sort.descending);
            }
        }
        Ok(self.record(vec![SlotUpdate::Rows(rows)]))
    }

    // -------------------------------------------------------------------------
    // Replay
    // -------------------------------------------------------------------------

    /// Start replaying the history from the initial snapshot.
    ///
    /// With nothing recorded beyond the snapshot this warns once and
    /// returns `NoHistoryToReplay` without touching state.
    pub fn start_replay(&mut self, now: Instant) -> Result<(), GridError> {
        if !self.mounted {
            return Err(GridError::Unmounted);
        }
        match self.replay.start(self.history.len(), now) {
            Ok(()) => {
                info!(
                    "Replaying {} state changes every {:?}",
                    self.history.len(),
                    self.replay.period()
                );
                self.events.push(TableEvent::ReplayStarted { entries: self.history.len() });
                Ok(())
            }
            Err(GridError::NoHistoryToReplay) => {
                warn!("{}", NO_HISTORY_WARNING);
                self.events.push(TableEvent::Warning(NO_HISTORY_WARNING.to_string()));
                Err(GridError::NoHistoryToReplay)
            }
            Err(e) => Err(e),
        }
    }

    /// Apply every history entry whose tick is due. Returns how many were
    /// applied. Replayed entries are never recorded.
    pub fn tick(&mut self, now: Instant) -> usize {
        let mut applied = 0;
        while let Some(ordinal) = self.replay.poll(now) {
            let total = self.history.len();
            if let Some(entry) = self.history.get(ordinal) {
                self.state.apply_all(&entry.updates);
            }
            debug!("replay #{} of {}", ordinal, total);
            self.events.push(TableEvent::Replayed(ReplayedEvent {
                ordinal,
                applied: ordinal + 1,
                total,
            }));
            applied += 1;

            if !self.replay.is_replaying() {
                info!("Replay finished after {} entries", total);
                self.events.push(TableEvent::ReplayStopped { completed: true });
            }
        }
        applied
    }

    /// Time until the next replay tick, for host loops that sleep.
    pub fn next_tick_in(&self, now: Instant) -> Option<Duration> {
        self.replay.remaining(now)
    }

    /// Stop a running replay and jump to the end of the history, so live
    /// state matches the log again.
    pub fn stop_replay(&mut self) {
        let Some((applied, total)) = self.replay.progress() else {
            return;
        };
        self.replay.cancel();
        for ordinal in applied..total {
            if let Some(entry) = self.history.get(ordinal) {
                self.state.apply_all(&entry.updates);
            }
        }
        info!("Replay stopped at {} of {}", applied, total);
        self.events.push(TableEvent::ReplayStopped { completed: false });
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Tear the widget down: stop any replay at once and discard the history.
    /// Every later action fails with `Unmounted`.
    pub fn teardown(&mut self) {
        if !self.mounted {
            return;
        }
        if self.replay.is_replaying() {
            self.replay.cancel();
            self.events.push(TableEvent::ReplayStopped { completed: false });
        }
        debug!("Discarding {} history entries", self.history.len());
        self.history.clear();
        self.mounted = false;
    }
}

fn infer_columns(headers: Vec<String>, data: &RawRows) -> Vec<Column> {
    headers
        .into_iter()
        .enumerate()
        .map(|(idx, title)| {
            let kind = ColumnKind::infer(data.iter().filter_map(|row| row.get(idx)));
            Column::new(title, kind)
        })
        .collect()
}

/// Copy of `rows` with `value` written at the cursor's record and column.
/// Short rows are padded with nulls.
fn write_cell(rows: &[Row], cursor: EditCursor, value: &CellValue) -> Vec<Row> {
    rows.iter()
        .map(|row| {
            if row.id != cursor.record {
                return row.clone();
            }
            let mut row = row.clone();
            if row.cells.len() <= cursor.column {
                row.cells.resize(cursor.column + 1, CellValue::Null);
            }
            row.cells[cursor.column] = value.clone();
            row
        })
        .collect()
}
