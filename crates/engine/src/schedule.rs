//! Recurring, cancellable schedule driven by the host loop.
//!
//! The host passes `Instant`s in; nothing here sleeps or spawns. A period is
//! "due" once `now` reaches the next deadline. Each due period is reported
//! exactly once, and in order, however late the host polls.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Interval {
    period: Duration,
    next_due: Option<Instant>,
}

impl Interval {
    /// A stopped interval.
    pub fn new(period: Duration) -> Self {
        Self { period, next_due: None }
    }

    /// Arm the interval; the first tick is due one period after `now`.
    pub fn start(&mut self, now: Instant) {
        self.next_due = Some(now + self.period);
    }

    pub fn cancel(&mut self) {
        self.next_due = None;
    }

    pub fn is_active(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.next_due
    }

    /// Time left until the next tick (zero if overdue, None if stopped).
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.next_due.map(|due| due.saturating_duration_since(now))
    }

    /// Consume one due tick, if any. Call repeatedly to drain a backlog.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(due) if now >= due => {
                self.next_due = Some(due + self.period);
                true
            }
            _ => false,
        }
    }
}
