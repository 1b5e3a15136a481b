//! Runtime adapters for driving the processing loop.

pub mod tokio_spawner;

pub use tokio_spawner::TokioSpawner;
