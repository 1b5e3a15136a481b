//! Runtime seam for launching the processing loop.

use std::future::Future;

/// Abstraction for spawning the processing loop on a runtime.
pub trait Spawn {
    /// Spawn a detached task.
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static;
}
