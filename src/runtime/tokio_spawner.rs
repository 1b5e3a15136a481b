//! Tokio runtime spawner implementation.

use std::future::Future;

use tokio::runtime::Handle;

use crate::core::{QueueError, Spawn};

/// Tokio-based spawner that runs the processing loop on a tokio runtime.
#[derive(Debug, Clone)]
pub struct TokioSpawner {
    handle: Handle,
}

impl TokioSpawner {
    /// Create a spawner from a tokio runtime handle.
    pub const fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Create a spawner for the runtime the caller is running in.
    ///
    /// # Errors
    ///
    /// Returns `QueueError::NoRuntime` when called outside a tokio runtime.
    pub fn current() -> Result<Self, QueueError> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|e| QueueError::NoRuntime(e.to_string()))
    }

    /// The wrapped runtime handle.
    pub const fn handle(&self) -> &Handle {
        &self.handle
    }
}

impl Spawn for TokioSpawner {
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        drop(self.handle.spawn(fut));
    }
}
