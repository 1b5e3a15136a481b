//! Transaction adapters and the caller-facing completion handle.
//!
//! Each submission is split in two halves joined by a oneshot channel: the
//! [`PendingTransaction`] sits in the queue buffer and, once dispatched, runs
//! the caller's operation and settles the channel; the [`TransactionHandle`]
//! goes back to the caller and resolves the moment that happens, independent
//! of the batch the transaction ran in.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::sync::oneshot;
use tokio::time::Instant;

use super::error::{panic_message, TransactionError};

/// Identifier assigned to each transaction at submission time.
pub type TransactionId = u64;

/// Settled result of a transaction as seen by the submitter and the loop.
pub type Outcome<T, E> = Result<T, TransactionError<E>>;

type Adapter<T, E> = Box<dyn FnOnce() -> BoxFuture<'static, Outcome<T, E>> + Send>;

/// A buffered transaction waiting for the processing loop.
///
/// Dropping it without running resolves the matching handle with
/// [`TransactionError::Discarded`].
pub(crate) struct PendingTransaction<T, E> {
    id: TransactionId,
    enqueued_at: Instant,
    adapter: Adapter<T, E>,
}

impl<T, E> PendingTransaction<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    /// Wrap `work` and return the buffered half together with the caller's handle.
    pub(crate) fn new<F, Fut>(id: TransactionId, work: F) -> (Self, TransactionHandle<T, E>)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();

        let adapter: Adapter<T, E> = Box::new(move || {
            async move {
                let outcome = match AssertUnwindSafe(async move { work().await })
                    .catch_unwind()
                    .await
                {
                    Ok(Ok(value)) => Ok(value),
                    Ok(Err(err)) => Err(TransactionError::Failed(err)),
                    Err(payload) => {
                        let reason = panic_message(&*payload);
                        tracing::error!(transaction_id = id, %reason, "transaction panicked");
                        Err(TransactionError::Panicked(reason))
                    }
                };

                if tx.send(outcome.clone()).is_err() {
                    tracing::trace!(transaction_id = id, "submitter dropped its handle");
                }
                outcome
            }
            .boxed()
        });

        let pending = Self {
            id,
            enqueued_at: Instant::now(),
            adapter,
        };
        (pending, TransactionHandle { id, rx })
    }
}

impl<T, E> PendingTransaction<T, E> {
    pub(crate) const fn id(&self) -> TransactionId {
        self.id
    }

    /// Time spent in the buffer so far.
    pub(crate) fn queued_for(&self) -> std::time::Duration {
        self.enqueued_at.elapsed()
    }

    /// Start the operation. The returned future settles the caller's handle
    /// before it completes.
    pub(crate) fn run(self) -> BoxFuture<'static, Outcome<T, E>> {
        (self.adapter)()
    }
}

/// Future returned by `submit`, resolving to the transaction's own outcome.
///
/// Dropping the handle does not cancel the transaction; it still runs when
/// its batch is dispatched.
#[derive(Debug)]
#[must_use = "the handle is the only way to observe the transaction's outcome"]
pub struct TransactionHandle<T, E> {
    id: TransactionId,
    rx: oneshot::Receiver<Outcome<T, E>>,
}

impl<T, E> TransactionHandle<T, E> {
    /// Identifier of the transaction this handle tracks.
    pub const fn id(&self) -> TransactionId {
        self.id
    }
}

impl<T, E> Future for TransactionHandle<T, E> {
    type Output = Outcome<T, E>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|settled| settled.unwrap_or(Err(TransactionError::Discarded)))
    }
}
