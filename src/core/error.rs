//! Error types for queue construction and transaction outcomes.

use std::any::Any;

use thiserror::Error;

/// Errors produced while building or wiring a transaction queue.
#[derive(Debug, Error)]
pub enum QueueError {
    /// Configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// No async runtime was available to drive the processing loop.
    #[error("no async runtime available: {0}")]
    NoRuntime(String),
}

/// Outcome of a single transaction that did not produce a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionError<E> {
    /// The operation settled with its own error.
    #[error("transaction failed: {0}")]
    Failed(E),
    /// The operation panicked while running.
    #[error("transaction panicked: {0}")]
    Panicked(String),
    /// The transaction was removed from the buffer before it ran.
    #[error("transaction discarded before it ran")]
    Discarded,
}

impl<E> TransactionError<E> {
    /// The caller-defined error, if the operation itself failed.
    pub const fn failure(&self) -> Option<&E> {
        match self {
            Self::Failed(err) => Some(err),
            Self::Panicked(_) | Self::Discarded => None,
        }
    }

    /// Consume the error, returning the caller-defined error if present.
    pub fn into_failure(self) -> Option<E> {
        match self {
            Self::Failed(err) => Some(err),
            Self::Panicked(_) | Self::Discarded => None,
        }
    }

    /// Whether the transaction never ran.
    pub const fn is_discarded(&self) -> bool {
        matches!(self, Self::Discarded)
    }
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;

/// Render a caught panic payload as text.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
