//! Fixed-window rate limiting.
//!
//! The window is checked once per batch and charged once per dispatched
//! transaction, so a batch that starts with room left in the window may carry
//! the count past the limit. The next batch then waits for the window to roll
//! over.

use std::time::Duration;

use tokio::time::Instant;

/// Maximum number of transactions started per window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    /// Transactions allowed per window.
    pub count: u32,
    /// Length of the window.
    pub duration: Duration,
}

impl RateLimit {
    /// Create a limit of `count` transactions per `duration`.
    pub const fn new(count: u32, duration: Duration) -> Self {
        Self { count, duration }
    }
}

/// Window bookkeeping: when the current window opened and how many
/// transactions were dispatched in it.
#[derive(Debug, Clone)]
pub(crate) struct RateWindow {
    started_at: Instant,
    count: u32,
}

impl RateWindow {
    pub(crate) const fn new(now: Instant) -> Self {
        Self {
            started_at: now,
            count: 0,
        }
    }

    pub(crate) fn reset(&mut self, now: Instant) {
        self.started_at = now;
        self.count = 0;
    }

    /// Charge `dispatched` transactions to the current window.
    pub(crate) fn record(&mut self, dispatched: usize) {
        let dispatched = u32::try_from(dispatched).unwrap_or(u32::MAX);
        self.count = self.count.saturating_add(dispatched);
    }

    pub(crate) const fn count(&self) -> u32 {
        self.count
    }

    /// Roll the window over if it has expired and report how long the loop
    /// must pause before forming the next batch.
    pub(crate) fn pending_wait(&mut self, limit: &RateLimit, now: Instant) -> Option<Duration> {
        let elapsed = now.saturating_duration_since(self.started_at);
        if elapsed > limit.duration {
            self.reset(now);
        }

        if self.count >= limit.count {
            Some(limit.duration.saturating_sub(elapsed))
        } else {
            None
        }
    }
}
