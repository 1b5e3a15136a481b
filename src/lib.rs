//! # Transaction Queue
//!
//! An in-process asynchronous transaction scheduler with three independent
//! throttles: a concurrency cap, an inter-batch delay and a fixed-window rate
//! limit.
//!
//! Callers submit deferred units of work ("transactions"): zero-argument
//! operations returning a future that resolves to a value or an error. The
//! queue buffers them in FIFO order and a single processing loop drains the
//! buffer in batches. Each submission gets its own handle that settles the
//! moment its operation settles, independent of the rest of its batch.
//!
//! ## Key Features
//!
//! - **Batching**: up to `concurrency` transactions run concurrently; the next
//!   batch forms only after the previous one fully settled
//! - **Pacing**: optional delay between batches
//! - **Rate limiting**: at most `count` transactions per window, gated at
//!   batch granularity
//! - **Lifecycle events**: `start`, `success`, `error`, `end` and `drain`
//!   delivered to any number of listeners
//! - **Failure isolation**: a failing or panicking transaction affects only its
//!   own handle; the loop keeps going
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use transaction_queue::builders::QueueBuilder;
//! use transaction_queue::core::{Event, EventKind};
//!
//! let queue = QueueBuilder::<u32, String>::new()
//!     .concurrency(2)
//!     .delay(Duration::from_millis(50))
//!     .rate_limit(10, Duration::from_secs(1))
//!     .on(EventKind::Success, |event| {
//!         if let Event::Success(results) = event {
//!             tracing::info!(?results, "batch done");
//!         }
//!     })
//!     .build()?;
//!
//! let value = queue.submit(|| async { Ok(7) }).await?;
//! ```
//!
//! For complete scenarios, see `tests/scheduling_test.rs`.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core scheduling: queue, processing loop, events and outcomes.
pub mod core;
/// Configuration models for queues and rate limits.
pub mod config;
/// Builders to construct queues from configuration.
pub mod builders;
/// Runtime adapters for driving the processing loop.
pub mod runtime;
/// Shared utilities.
pub mod util;
