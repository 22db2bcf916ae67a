//! Coalescing scheduler: a leading-edge throttle with a guaranteed trailing run.
//!
//! Time is passed in rather than read from a clock, so the scheduler is a
//! plain state machine the event loop drives with `signal` and `poll`.

use std::time::{Duration, Instant};

/// Collapses bursts of signals into at most one immediate run plus one
/// trailing run.
#[derive(Debug, Clone)]
pub struct Coalescer {
    /// When the trailing run is due, if one is armed.
    deadline: Option<Instant>,
    /// When the last run (leading or trailing) happened.
    last_run: Option<Instant>,
    /// Quiet period after the last signal before the trailing run.
    trailing: Duration,
    /// Minimum spacing between leading runs.
    window: Duration,
}

impl Coalescer {
    /// Create a coalescer with the given leading window and trailing delay.
    pub const fn new(window: Duration, trailing: Duration) -> Self {
        return Self { deadline: None, last_run: None, trailing, window };
    }

    /// Record a signal at `now`. Returns `true` when the caller should run
    /// immediately (leading edge). Either way the trailing run is re-armed for
    /// `now + trailing`, so the last signal of a burst is always followed by
    /// one more run.
    pub fn signal(&mut self, now: Instant) -> bool {
        self.deadline = Some(now.checked_add(self.trailing).unwrap_or(now));

        let leading = self
            .last_run
            .is_none_or(|last| return now.saturating_duration_since(last) >= self.window);
        if leading {
            self.last_run = Some(now);
        }
        return leading;
    }

    /// Returns `true` once when the trailing run is due at `now`.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                self.last_run = Some(now);
                return true;
            },
            _ => return false,
        }
    }

    /// When the next trailing run is due.
    pub const fn deadline(&self) -> Option<Instant> {
        return self.deadline;
    }

    /// Drop any pending trailing run.
    pub const fn cancel(&mut self) {
        self.deadline = None;
    }
}
