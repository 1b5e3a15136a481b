//! Core scheduling: the transaction queue, its processing loop and lifecycle events.

pub mod error;
pub mod event_log;
pub mod notifier;
pub mod queue;
pub mod rate_limit;
pub mod spawn;
pub mod stats;
pub mod transaction;

pub use error::{AppResult, QueueError, TransactionError};
pub use event_log::{EventLog, EventRecord};
pub use notifier::{Event, EventKind, Listener, ListenerId, Notifier, QueueObserver};
pub use queue::TransactionQueue;
pub use rate_limit::RateLimit;
pub use spawn::Spawn;
pub use stats::QueueStats;
pub use transaction::{Outcome, TransactionHandle, TransactionId};
