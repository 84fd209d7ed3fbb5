//! Replay engine: walks the state log one entry per tick.
//!
//! The engine never holds or writes the history. It only decides which
//! ordinal is due; the widget looks the entry up and pushes it through the
//! same reducer a live change uses, with recording suppressed.
//!
//! One replay at a time. Starting while running fails with
//! `GridError::AlreadyReplaying`; a history holding only the initial
//! snapshot fails with `GridError::NoHistoryToReplay`.

use std::time::{Duration, Instant};

use crate::error::GridError;
use crate::schedule::Interval;

/// Default cadence between replayed entries.
pub const DEFAULT_REPLAY_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Run {
    /// Next ordinal to apply
    next: usize,
    /// History length when the run started
    total: usize,
}

#[derive(Debug, Clone)]
pub struct ReplayEngine {
    interval: Interval,
    run: Option<Run>,
}

impl Default for ReplayEngine {
    fn default() -> Self {
        Self::new(DEFAULT_REPLAY_INTERVAL)
    }
}

impl ReplayEngine {
    pub fn new(period: Duration) -> Self {
        Self {
            interval: Interval::new(period),
            run: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.interval.period()
    }

    /// True from a successful `start` until the last entry is handed out
    /// or the run is cancelled.
    pub fn is_replaying(&self) -> bool {
        self.run.is_some()
    }

    /// `(applied, total)` for the current run.
    pub fn progress(&self) -> Option<(usize, usize)> {
        self.run.map(|run| (run.next, run.total))
    }

    /// Begin replaying a history of `history_len` entries.
    pub fn start(&mut self, history_len: usize, now: Instant) -> Result<(), GridError> {
        if self.run.is_some() {
            return Err(GridError::AlreadyReplaying);
        }
        if history_len <= 1 {
            return Err(GridError::NoHistoryToReplay);
        }
        self.run = Some(Run { next: 0, total: history_len });
        self.interval.start(now);
        Ok(())
    }

    /// Ordinal of the next entry to apply if its tick is due.
    ///
    /// Returns at most one ordinal per call; call again to catch up after a
    /// late poll. The run ends (flag cleared, timer cancelled) when the last
    /// ordinal is handed out.
    pub fn poll(&mut self, now: Instant) -> Option<usize> {
        let run = self.run.as_mut()?;
        if !self.interval.poll(now) {
            return None;
        }
        let ordinal = run.next;
        run.next += 1;
        if run.next >= run.total {
            self.finish();
        }
        Some(ordinal)
    }

    /// Time until the next entry is due.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        if self.run.is_some() {
            self.interval.remaining(now)
        } else {
            None
        }
    }

    /// Stop immediately; no further ordinals are handed out.
    pub fn cancel(&mut self) {
        self.finish();
    }

    fn finish(&mut self) {
        self.run = None;
        self.interval.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_rejects_snapshot_only_history() {
        let mut engine = ReplayEngine::default();
        assert_eq!(engine.start(1, Instant::now()), Err(GridError::NoHistoryToReplay));
        assert_eq!(engine.start(0, Instant::now()), Err(GridError::NoHistoryToReplay));
        assert!(!engine.is_replaying());
    }

    #[test]
    fn test_second_start_is_refused() {
        let mut engine = ReplayEngine::default();
        let t0 = Instant::now();
        engine.start(3, t0).unwrap();
        assert_eq!(engine.start(3, t0), Err(GridError::AlreadyReplaying));
        assert!(engine.is_replaying());
    }

    #[test]
    fn test_hands_out_each_ordinal_once_in_order() {
        let mut engine = ReplayEngine::new(Duration::from_secs(1));
        let t0 = Instant::now();
        engine.start(3, t0).unwrap();

        assert_eq!(engine.poll(t0), None);
        assert_eq!(engine.poll(t0 + Duration::from_secs(1)), Some(0));
        assert_eq!(engine.poll(t0 + Duration::from_secs(1)), None);
        assert_eq!(engine.progress(), Some((1, 3)));
        assert_eq!(engine.poll(t0 + Duration::from_secs(2)), Some(1));
        assert!(engine.is_replaying());
        assert_eq!(engine.poll(t0 + Duration::from_secs(3)), Some(2));
        assert!(!engine.is_replaying());
        assert_eq!(engine.poll(t0 + Duration::from_secs(10)), None);
    }

    #[test]
    fn test_late_poll_catches_up_one_at_a_time() {
        let mut engine = ReplayEngine::new(Duration::from_millis(100));
        let t0 = Instant::now();
        engine.start(4, t0).unwrap();

        let late = t0 + Duration::from_secs(5);
        let mut seen = Vec::new();
        while let Some(ordinal) = engine.poll(late) {
            seen.push(ordinal);
        }
        assert_eq!(seen, vec![0, 1, 2, 3]);
        assert!(!engine.is_replaying());
    }

    #[test]
    fn test_cancel_mid_run() {
        let mut engine = ReplayEngine::new(Duration::from_secs(1));
        let t0 = Instant::now();
        engine.start(5, t0).unwrap();
        assert_eq!(engine.poll(t0 + Duration::from_secs(1)), Some(0));
        engine.cancel();
        assert!(!engine.is_replaying());
        assert_eq!(engine.poll(t0 + Duration::from_secs(2)), None);
        assert_eq!(engine.remaining(t0), None);

        // A cancelled engine can run again
        engine.start(2, t0).unwrap();
        assert!(engine.is_replaying());
    }
}
