//! Telemetry helpers for structured logging and tracing.

use std::fmt;

use tracing::{debug, info, warn};

use crate::core::{Event, QueueObserver};

/// Install a default env-filtered fmt subscriber unless one is already set.
/// Returns whether this call installed it.
pub fn init_tracing() -> bool {
    if tracing::dispatcher::has_been_set() {
        return false;
    }
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init()
        .is_ok()
}

/// Observer that logs every lifecycle event through `tracing`.
#[derive(Debug, Clone)]
pub struct TracingObserver {
    label: String,
}

impl TracingObserver {
    /// Log events under the given queue label.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }

    /// Label attached to every log line.
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl<T, E: fmt::Display> QueueObserver<T, E> for TracingObserver {
    fn on_event(&self, event: &Event<'_, T, E>) {
        match event {
            Event::Start => info!(queue = %self.label, "queue started"),
            Event::Success(results) => {
                debug!(queue = %self.label, batch_size = results.len(), "batch succeeded");
            }
            Event::Error(err) => warn!(queue = %self.label, error = %err, "batch failed"),
            Event::End => debug!(queue = %self.label, "queue ended"),
            Event::Drain => info!(queue = %self.label, "queue drained"),
        }
    }
}
