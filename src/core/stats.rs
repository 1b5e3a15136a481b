//! Queue throughput counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Point-in-time view of a queue's activity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStats {
    /// Transactions waiting in the buffer.
    pub queued: usize,
    /// Whether a processing loop is active.
    pub processing: bool,
    /// Total transactions submitted.
    pub submitted: u64,
    /// Transactions that resolved with a value.
    pub completed: u64,
    /// Transactions that failed or panicked.
    pub failed: u64,
    /// Transactions removed by `clear` before they ran.
    pub discarded: u64,
    /// Batches dispatched.
    pub batches: u64,
    /// Times the loop paused for the rate limit.
    pub rate_limit_waits: u64,
    /// Processing loops started.
    pub loop_runs: u64,
}

/// Internal counters (lock-free atomics).
#[derive(Debug, Default)]
pub(crate) struct QueueCounters {
    pub submitted: AtomicU64,
    pub completed: AtomicU64,
    pub failed: AtomicU64,
    pub discarded: AtomicU64,
    pub batches: AtomicU64,
    pub rate_limit_waits: AtomicU64,
    pub loop_runs: AtomicU64,
}

impl QueueCounters {
    pub(crate) fn add(counter: &AtomicU64, amount: usize) {
        counter.fetch_add(amount as u64, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, queued: usize, processing: bool) -> QueueStats {
        QueueStats {
            queued,
            processing,
            submitted: self.submitted.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
            batches: self.batches.load(Ordering::Relaxed),
            rate_limit_waits: self.rate_limit_waits.load(Ordering::Relaxed),
            loop_runs: self.loop_runs.load(Ordering::Relaxed),
        }
    }
}
