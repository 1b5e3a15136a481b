//! Transaction queue and its batch processing loop.
//!
//! The queue owns a FIFO buffer of pending transactions and at most one
//! processing loop. `submit` appends to the buffer and starts the loop when
//! none is running; the loop drains the buffer in batches of up to
//! `concurrency` transactions, runs each batch concurrently, waits for every
//! member to settle, then applies the rate limit and inter-batch delay before
//! forming the next batch.
//!
//! Buffer, draining flag and rate window share one `parking_lot::Mutex`.
//! The draining flag is flipped on under that lock by `submit`/`start`, and
//! flipped off under the same lock only when the loop observes an empty
//! buffer, so concurrent submissions can neither start a second loop nor be
//! left behind by a loop that is exiting. The lock is never held across an
//! await or while listeners run.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use crate::config::QueueConfig;
use crate::runtime::TokioSpawner;

use super::event_log::EventLog;
use super::notifier::{Event, EventKind, Listener, ListenerId, Notifier, QueueObserver};
use super::rate_limit::{RateLimit, RateWindow};
use super::spawn::Spawn;
use super::stats::{QueueCounters, QueueStats};
use super::transaction::{Outcome, PendingTransaction, TransactionHandle};
use super::{QueueError, TransactionError};

/// Mutable state guarded by the queue lock.
struct QueueState<T, E> {
    buffer: VecDeque<PendingTransaction<T, E>>,
    draining: bool,
    window: RateWindow,
}

impl<T, E> QueueState<T, E> {
    /// Idle -> Draining. Returns true if this call made the transition.
    fn begin_draining(&mut self) -> bool {
        if self.draining {
            return false;
        }
        self.draining = true;
        true
    }
}

/// State shared between queue handles and the running loop.
struct Shared<T, E> {
    label: String,
    concurrency: usize,
    delay: Duration,
    rate_limit: Option<RateLimit>,
    state: Mutex<QueueState<T, E>>,
    notifier: Notifier<T, E>,
    counters: QueueCounters,
    next_id: AtomicU64,
}

/// Clears the draining flag if the loop future is dropped before it finishes,
/// including a task dropped unpolled when its runtime shuts down.
struct DrainingGuard<T, E> {
    shared: Arc<Shared<T, E>>,
    armed: bool,
}

impl<T, E> DrainingGuard<T, E> {
    fn new(shared: Arc<Shared<T, E>>) -> Self {
        Self { shared, armed: true }
    }
}

impl<T, E> Drop for DrainingGuard<T, E> {
    fn drop(&mut self) {
        if self.armed {
            self.shared.state.lock().draining = false;
            warn!(queue = %self.shared.label, "processing loop dropped before completion");
        }
    }
}

impl<T, E> Shared<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    /// Processing loop. Entered only after `begin_draining` returned true; the
    /// guard is created alongside the flag flip and owned by the loop future.
    async fn drain(self: Arc<Self>, mut guard: DrainingGuard<T, E>) {
        QueueCounters::add(&self.counters.loop_runs, 1);
        info!(queue = %self.label, "processing loop started");
        self.notifier.emit(&Event::Start);

        loop {
            {
                let mut state = self.state.lock();
                if state.buffer.is_empty() {
                    state.draining = false;
                    break;
                }
            }

            if let Some(limit) = self.rate_limit {
                self.throttle(limit).await;
            }

            let batch: Vec<PendingTransaction<T, E>> = {
                let mut state = self.state.lock();
                let take = self.concurrency.min(state.buffer.len());
                let batch: Vec<_> = state.buffer.drain(..take).collect();
                state.window.record(batch.len());
                batch
            };

            // Emptied by `clear` while the loop was paused.
            if batch.is_empty() {
                continue;
            }

            self.run_batch(batch).await;

            if !self.delay.is_zero() {
                trace!(queue = %self.label, delay_ms = self.delay.as_millis(), "inter-batch delay");
                tokio::time::sleep(self.delay).await;
            }
        }

        guard.armed = false;
        info!(queue = %self.label, "processing loop finished; queue drained");
        self.notifier.emit(&Event::End);
        self.notifier.emit(&Event::Drain);
    }

    /// Pause until the rate window allows another batch.
    async fn throttle(&self, limit: RateLimit) {
        let (wait, in_window) = {
            let mut state = self.state.lock();
            let wait = state.window.pending_wait(&limit, Instant::now());
            (wait, state.window.count())
        };
        let Some(wait) = wait else {
            return;
        };

        QueueCounters::add(&self.counters.rate_limit_waits, 1);
        debug!(
            queue = %self.label,
            wait_ms = wait.as_millis(),
            limit = limit.count,
            in_window,
            "rate limit reached; pausing"
        );
        tokio::time::sleep(wait).await;
        self.state.lock().window.reset(Instant::now());
    }

    /// Run one batch to completion and report it.
    async fn run_batch(&self, batch: Vec<PendingTransaction<T, E>>) {
        let batch_size = batch.len();
        if let (Some(first), Some(last)) = (batch.first(), batch.last()) {
            debug!(
                queue = %self.label,
                batch_size,
                first_id = first.id(),
                last_id = last.id(),
                queued_ms = first.queued_for().as_millis(),
                "dispatching batch"
            );
        }

        let outcomes: Vec<Outcome<T, E>> = join_all(batch.into_iter().map(PendingTransaction::run)).await;
        QueueCounters::add(&self.counters.batches, 1);

        let mut values = Vec::with_capacity(batch_size);
        let mut first_failure: Option<TransactionError<E>> = None;
        let mut failed = 0_usize;
        for outcome in outcomes {
            match outcome {
                Ok(value) => values.push(value),
                Err(err) => {
                    failed += 1;
                    first_failure.get_or_insert(err);
                }
            }
        }
        QueueCounters::add(&self.counters.completed, values.len());
        QueueCounters::add(&self.counters.failed, failed);

        match first_failure {
            None => {
                debug!(queue = %self.label, batch_size, "batch succeeded");
                self.notifier.emit(&Event::Success(&values));
            }
            Some(err) => {
                warn!(queue = %self.label, batch_size, failed, "batch settled with failures");
                self.notifier.emit(&Event::Error(&err));
            }
        }
    }
}

/// Asynchronous transaction queue throttled by batch size, inter-batch delay
/// and a fixed-window rate limit.
///
/// Cloning yields another handle to the same queue.
///
/// # Example
///
/// ```rust,ignore
/// use std::time::Duration;
/// use transaction_queue::config::QueueConfig;
/// use transaction_queue::core::{EventKind, TransactionQueue};
///
/// let queue = TransactionQueue::<u64, String>::new(
///     QueueConfig::new()
///         .with_concurrency(4)
///         .with_rate_limit(10, Duration::from_secs(1)),
/// )?;
/// queue.on(EventKind::Drain, |_| tracing::info!("all caught up"));
///
/// let total = queue.submit(|| async { Ok(40 + 2) }).await?;
/// ```
pub struct TransactionQueue<T, E, S = TokioSpawner> {
    shared: Arc<Shared<T, E>>,
    spawner: S,
}

impl<T, E, S: Clone> Clone for TransactionQueue<T, E, S> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            spawner: self.spawner.clone(),
        }
    }
}

impl<T, E> TransactionQueue<T, E, TokioSpawner>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    /// Create a queue driven by the current tokio runtime.
    ///
    /// # Errors
    ///
    /// `QueueError::InvalidConfig` if the configuration does not validate,
    /// `QueueError::NoRuntime` if called outside a tokio runtime.
    pub fn new(config: QueueConfig) -> Result<Self, QueueError> {
        Self::with_spawner(config, TokioSpawner::current()?)
    }
}

impl<T, E, S> TransactionQueue<T, E, S>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
    S: Spawn,
{
    /// Create a queue whose processing loop runs on `spawner`.
    ///
    /// # Errors
    ///
    /// `QueueError::InvalidConfig` if the configuration does not validate.
    pub fn with_spawner(config: QueueConfig, spawner: S) -> Result<Self, QueueError> {
        let auto_start = config.auto_start;
        let queue = Self::assemble(config, spawner)?;
        if auto_start {
            queue.start();
        }
        Ok(queue)
    }

    /// Build the queue without starting it.
    pub(crate) fn assemble(config: QueueConfig, spawner: S) -> Result<Self, QueueError> {
        config.validate().map_err(QueueError::InvalidConfig)?;

        let label = config
            .name
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        info!(
            queue = %label,
            concurrency = config.concurrency,
            delay_ms = config.delay_ms,
            rate_limit = ?config.rate_limit,
            "transaction queue created"
        );

        let shared = Shared {
            label,
            concurrency: config.concurrency,
            delay: config.delay(),
            rate_limit: config.rate_limit.map(RateLimit::from),
            state: Mutex::new(QueueState {
                buffer: VecDeque::new(),
                draining: false,
                window: RateWindow::new(Instant::now()),
            }),
            notifier: Notifier::new(),
            counters: QueueCounters::default(),
            next_id: AtomicU64::new(0),
        };

        Ok(Self {
            shared: Arc::new(shared),
            spawner,
        })
    }

    /// Queue `work` and return a handle resolving to its outcome.
    ///
    /// Never waits for the loop; if no loop is running one is started. Safe to
    /// call from any thread and from inside event listeners.
    pub fn submit<F, Fut>(&self, work: F) -> TransactionHandle<T, E>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let id = self.shared.next_id.fetch_add(1, Ordering::Relaxed);
        let (pending, handle) = PendingTransaction::new(id, work);

        let (should_start, queued) = {
            let mut state = self.shared.state.lock();
            state.buffer.push_back(pending);
            (state.begin_draining(), state.buffer.len())
        };
        QueueCounters::add(&self.shared.counters.submitted, 1);
        trace!(queue = %self.shared.label, transaction_id = id, queued, "transaction submitted");

        if should_start {
            self.spawn_loop();
        }
        handle
    }

    /// Start draining. No-op while a loop is already running.
    pub fn start(&self) {
        let should_start = self.shared.state.lock().begin_draining();
        if should_start {
            self.spawn_loop();
        } else {
            trace!(queue = %self.shared.label, "start ignored; already draining");
        }
    }

    fn spawn_loop(&self) {
        let guard = DrainingGuard::new(Arc::clone(&self.shared));
        let shared = Arc::clone(&self.shared);
        self.spawner.spawn(shared.drain(guard));
    }
}

impl<T, E, S> TransactionQueue<T, E, S> {
    /// Discard every buffered transaction. The batch currently executing is
    /// unaffected and a running loop exits normally afterwards. Handles of
    /// discarded transactions resolve with `TransactionError::Discarded`.
    ///
    /// Returns the number of discarded transactions.
    pub fn clear(&self) -> usize {
        let discarded: Vec<PendingTransaction<T, E>> = self.shared.state.lock().buffer.drain(..).collect();
        let count = discarded.len();
        // Dropped outside the lock; this settles the handles.
        drop(discarded);

        if count > 0 {
            QueueCounters::add(&self.shared.counters.discarded, count);
            info!(queue = %self.shared.label, discarded = count, "buffer cleared");
        }
        count
    }

    /// Transactions buffered but not yet dispatched.
    pub fn len(&self) -> usize {
        self.shared.state.lock().buffer.len()
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.shared.state.lock().buffer.is_empty()
    }

    /// Whether a processing loop is active.
    pub fn is_processing(&self) -> bool {
        self.shared.state.lock().draining
    }

    /// Label used in logs.
    pub fn label(&self) -> &str {
        &self.shared.label
    }

    /// Batch size cap.
    pub fn concurrency(&self) -> usize {
        self.shared.concurrency
    }

    /// Snapshot of the queue's counters.
    pub fn stats(&self) -> QueueStats {
        let (queued, processing) = {
            let state = self.shared.state.lock();
            (state.buffer.len(), state.draining)
        };
        self.shared.counters.snapshot(queued, processing)
    }

    /// Register `listener` for every future emission of `kind`.
    pub fn on<F>(&self, kind: EventKind, listener: F) -> ListenerId
    where
        F: Fn(&Event<'_, T, E>) + Send + Sync + 'static,
    {
        self.shared.notifier.on(kind, listener)
    }

    /// Register an observer for every event kind.
    pub fn observe<O>(&self, observer: Arc<O>) -> Vec<(EventKind, ListenerId)>
    where
        O: QueueObserver<T, E> + 'static,
    {
        self.shared.notifier.observe(observer)
    }

    /// Attach a bounded event log and return it.
    pub fn event_log(&self, max_records: usize) -> Arc<EventLog>
    where
        E: std::fmt::Display,
    {
        let log = Arc::new(EventLog::new(max_records));
        self.observe(Arc::clone(&log));
        log
    }

    /// Remove a listener. Returns `false` if it was not registered under `kind`.
    pub fn remove_listener(&self, kind: EventKind, id: ListenerId) -> bool {
        self.shared.notifier.remove_listener(kind, id)
    }

    pub(crate) fn register(&self, kind: EventKind, listener: Listener<T, E>) -> ListenerId {
        self.shared.notifier.register(kind, listener)
    }
}
