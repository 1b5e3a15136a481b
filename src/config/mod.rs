//! Configuration models for queues and rate limits.

pub mod queue;

pub use queue::{QueueConfig, RateLimitConfig};
