//! Lifecycle event registry.
//!
//! Listeners are stored per [`EventKind`] in registration order and invoked
//! synchronously by the processing loop. The registry lock is released before
//! any listener runs, so listeners may register, unregister or submit new
//! transactions. A panicking listener is logged and skipped.

use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::error::{panic_message, TransactionError};

/// Kinds of lifecycle events a queue emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A processing loop began.
    Start,
    /// A batch settled without failures.
    Success,
    /// A batch settled with at least one failure.
    Error,
    /// The loop found the buffer empty and stopped.
    End,
    /// Fired right after `End`; the queue is quiescent.
    Drain,
}

impl EventKind {
    /// Every event kind, in lifecycle order.
    pub const ALL: [Self; 5] = [Self::Start, Self::Success, Self::Error, Self::End, Self::Drain];

    /// Stable lowercase name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Success => "success",
            Self::Error => "error",
            Self::End => "end",
            Self::Drain => "drain",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A lifecycle event with its payload.
#[derive(Debug)]
pub enum Event<'a, T, E> {
    /// A processing loop began.
    Start,
    /// Ordered results of a batch in which every transaction succeeded.
    Success(&'a [T]),
    /// First failure (in batch order) of a batch that had failures.
    Error(&'a TransactionError<E>),
    /// The loop stopped because the buffer is empty.
    End,
    /// The queue is quiescent.
    Drain,
}

impl<T, E> Event<'_, T, E> {
    /// The kind this event is delivered under.
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::Start => EventKind::Start,
            Self::Success(_) => EventKind::Success,
            Self::Error(_) => EventKind::Error,
            Self::End => EventKind::End,
            Self::Drain => EventKind::Drain,
        }
    }
}

/// Handle for removing a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// Shared listener callback.
pub type Listener<T, E> = Arc<dyn Fn(&Event<'_, T, E>) + Send + Sync>;

/// An observer that wants every lifecycle event.
pub trait QueueObserver<T, E>: Send + Sync {
    /// Handle a single event.
    fn on_event(&self, event: &Event<'_, T, E>);
}

/// Registry mapping event kinds to ordered listeners.
pub struct Notifier<T, E> {
    listeners: Mutex<HashMap<EventKind, Vec<(ListenerId, Listener<T, E>)>>>,
    next_id: AtomicU64,
}

impl<T, E> Default for Notifier<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> Notifier<T, E> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            listeners: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Register `listener` for every future emission of `kind`.
    pub fn on<F>(&self, kind: EventKind, listener: F) -> ListenerId
    where
        F: Fn(&Event<'_, T, E>) + Send + Sync + 'static,
    {
        self.register(kind, Arc::new(listener))
    }

    /// Register an already shared listener.
    pub fn register(&self, kind: EventKind, listener: Listener<T, E>) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners.lock().entry(kind).or_default().push((id, listener));
        id
    }

    /// Register `observer` for all event kinds.
    pub fn observe<O>(&self, observer: Arc<O>) -> Vec<(EventKind, ListenerId)>
    where
        O: QueueObserver<T, E> + 'static,
    {
        EventKind::ALL
            .iter()
            .map(|&kind| {
                let observer = Arc::clone(&observer);
                (kind, self.on(kind, move |event| observer.on_event(event)))
            })
            .collect()
    }

    /// Remove a registration. Returns `false` if it was not registered under `kind`.
    pub fn remove_listener(&self, kind: EventKind, id: ListenerId) -> bool {
        let mut listeners = self.listeners.lock();
        let Some(registered) = listeners.get_mut(&kind) else {
            return false;
        };
        let Some(index) = registered.iter().position(|(candidate, _)| *candidate == id) else {
            return false;
        };
        registered.remove(index);
        true
    }

    /// Number of listeners registered for `kind`.
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners.lock().get(&kind).map_or(0, Vec::len)
    }

    /// Deliver `event` to its listeners in registration order.
    pub fn emit(&self, event: &Event<'_, T, E>) {
        let kind = event.kind();
        let snapshot: Vec<Listener<T, E>> = self
            .listeners
            .lock()
            .get(&kind)
            .map(|registered| registered.iter().map(|(_, l)| Arc::clone(l)).collect())
            .unwrap_or_default();

        for listener in snapshot {
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| listener(event))) {
                tracing::error!(
                    event = %kind,
                    reason = %panic_message(&*payload),
                    "event listener panicked"
                );
            }
        }
    }
}
