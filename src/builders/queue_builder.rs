//! Builder that wires configuration, spawner and listeners before the queue
//! starts.
//!
//! Registering listeners through the builder guarantees they observe the
//! events of the auto-start run, which a listener attached after
//! construction could miss on a multi-threaded runtime.

use std::sync::Arc;
use std::time::Duration;

use crate::config::QueueConfig;
use crate::core::{Event, EventKind, Listener, QueueError, QueueObserver, Spawn, TransactionQueue};
use crate::runtime::TokioSpawner;

/// Fluent builder for [`TransactionQueue`].
pub struct QueueBuilder<T, E> {
    config: QueueConfig,
    listeners: Vec<(EventKind, Listener<T, E>)>,
}

impl<T, E> Default for QueueBuilder<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> QueueBuilder<T, E> {
    /// Start from the default configuration.
    pub fn new() -> Self {
        Self::from_config(QueueConfig::default())
    }

    /// Start from an existing configuration.
    pub const fn from_config(config: QueueConfig) -> Self {
        Self {
            config,
            listeners: Vec::new(),
        }
    }

    /// Configuration the queue will be built with.
    pub const fn config(&self) -> &QueueConfig {
        &self.config
    }

    /// Number of listeners that will be registered.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Set the log label.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config = self.config.with_name(name);
        self
    }

    /// Set the batch size.
    #[must_use]
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.config = self.config.with_concurrency(concurrency);
        self
    }

    /// Enable or disable starting the loop at construction.
    #[must_use]
    pub fn auto_start(mut self, auto_start: bool) -> Self {
        self.config = self.config.with_auto_start(auto_start);
        self
    }

    /// Set the inter-batch delay.
    #[must_use]
    pub fn delay(mut self, delay: Duration) -> Self {
        self.config = self.config.with_delay(delay);
        self
    }

    /// Limit dispatch to `count` transactions per `duration`.
    #[must_use]
    pub fn rate_limit(mut self, count: u32, duration: Duration) -> Self {
        self.config = self.config.with_rate_limit(count, duration);
        self
    }

    /// Register a listener for `kind`.
    #[must_use]
    pub fn on<F>(mut self, kind: EventKind, listener: F) -> Self
    where
        F: Fn(&Event<'_, T, E>) + Send + Sync + 'static,
    {
        let listener: Listener<T, E> = Arc::new(listener);
        self.listeners.push((kind, listener));
        self
    }

    /// Register an observer for every event kind.
    #[must_use]
    pub fn observe<O>(mut self, observer: Arc<O>) -> Self
    where
        O: QueueObserver<T, E> + 'static,
    {
        for kind in EventKind::ALL {
            let observer = Arc::clone(&observer);
            self = self.on(kind, move |event| observer.on_event(event));
        }
        self
    }
}

impl<T, E> QueueBuilder<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    /// Build a queue driven by the current tokio runtime.
    ///
    /// # Errors
    ///
    /// `QueueError::NoRuntime` outside a tokio runtime,
    /// `QueueError::InvalidConfig` if the configuration does not validate.
    pub fn build(self) -> Result<TransactionQueue<T, E>, QueueError> {
        let spawner = TokioSpawner::current()?;
        self.build_with(spawner)
    }

    /// Build a queue whose loop runs on `spawner`.
    ///
    /// # Errors
    ///
    /// `QueueError::InvalidConfig` if the configuration does not validate.
    pub fn build_with<S: Spawn>(self, spawner: S) -> Result<TransactionQueue<T, E, S>, QueueError> {
        let auto_start = self.config.auto_start;
        let queue = TransactionQueue::assemble(self.config, spawner)?;
        for (kind, listener) in self.listeners {
            queue.register(kind, listener);
        }
        if auto_start {
            queue.start();
        }
        Ok(queue)
    }
}
