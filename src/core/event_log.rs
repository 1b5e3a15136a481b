//! Bounded in-memory record of lifecycle events.
//!
//! Attach an [`EventLog`] to a queue with `observe` to keep the most recent
//! events for diagnostics or assertions.

use std::collections::VecDeque;
use std::fmt;

use parking_lot::Mutex;
use tokio::time::Instant;

use super::notifier::{Event, EventKind, QueueObserver};

/// A recorded lifecycle event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    /// Event kind.
    pub kind: EventKind,
    /// Number of results for `success` events.
    pub batch_size: Option<usize>,
    /// Rendered error for `error` events.
    pub error: Option<String>,
    /// When the event was emitted.
    pub at: Instant,
}

impl EventRecord {
    /// Build a record from an event.
    pub fn from_event<T, E: fmt::Display>(event: &Event<'_, T, E>) -> Self {
        let (batch_size, error) = match event {
            Event::Success(results) => (Some(results.len()), None),
            Event::Error(err) => (None, Some(err.to_string())),
            Event::Start | Event::End | Event::Drain => (None, None),
        };
        Self {
            kind: event.kind(),
            batch_size,
            error,
            at: Instant::now(),
        }
    }
}

/// Event recorder keeping at most `max_records` entries.
pub struct EventLog {
    records: Mutex<VecDeque<EventRecord>>,
    max_records: usize,
}

impl EventLog {
    /// Create a log with a bounded buffer.
    pub fn new(max_records: usize) -> Self {
        Self {
            records: Mutex::new(VecDeque::with_capacity(max_records.min(1024))),
            max_records,
        }
    }

    /// Append a record, evicting the oldest when full.
    pub fn record(&self, record: EventRecord) {
        if self.max_records == 0 {
            return;
        }
        let mut records = self.records.lock();
        if records.len() >= self.max_records {
            records.pop_front();
        }
        records.push_back(record);
    }

    /// Snapshot of stored records, oldest first.
    pub fn records(&self) -> Vec<EventRecord> {
        self.records.lock().iter().cloned().collect()
    }

    /// Kinds of stored records, oldest first.
    pub fn kinds(&self) -> Vec<EventKind> {
        self.records.lock().iter().map(|r| r.kind).collect()
    }

    /// Number of stored records of `kind`.
    pub fn count(&self, kind: EventKind) -> usize {
        self.records.lock().iter().filter(|r| r.kind == kind).count()
    }

    /// Drop all stored records.
    pub fn clear(&self) {
        self.records.lock().clear();
    }
}

impl<T, E: fmt::Display> QueueObserver<T, E> for EventLog {
    fn on_event(&self, event: &Event<'_, T, E>) {
        self.record(EventRecord::from_event(event));
    }
}
