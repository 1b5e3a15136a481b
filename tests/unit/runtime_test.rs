//! Tests for runtime adapters

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::{Runtime, RuntimeFlavor};
use tokio::sync::Notify;
use transaction_queue::config::QueueConfig;
use transaction_queue::core::{QueueError, Spawn, TransactionError, TransactionQueue};
use transaction_queue::runtime::TokioSpawner;

#[test]
fn test_tokio_spawner_outside_runtime() {
    assert!(matches!(TokioSpawner::current(), Err(QueueError::NoRuntime(_))));
}

#[tokio::test]
async fn test_tokio_spawner_runs_future() {
    let spawner = TokioSpawner::current().unwrap();
    let done = Arc::new(Notify::new());
    let signal = Arc::clone(&done);
    spawner.spawn(async move { signal.notify_one() });
    done.notified().await;
}

#[test]
fn test_tokio_spawner_from_handle() {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    let spawner = TokioSpawner::new(runtime.handle().clone());
    assert_eq!(spawner.handle().runtime_flavor(), RuntimeFlavor::CurrentThread);

    let queue = TransactionQueue::<u32, String, _>::with_spawner(
        QueueConfig::new().with_auto_start(false),
        spawner,
    )
    .unwrap();
    let handle = queue.submit(|| async { Ok(9) });
    assert_eq!(runtime.block_on(handle), Ok(9));
}

/// Spawner that counts launches before handing off to tokio.
#[derive(Clone, Default)]
struct CountingSpawner {
    spawned: Arc<AtomicUsize>,
}

impl Spawn for CountingSpawner {
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.spawned.fetch_add(1, Ordering::SeqCst);
        tokio::spawn(fut);
    }
}

#[tokio::test]
async fn test_custom_spawner_launches_one_loop_per_run() {
    let spawner = CountingSpawner::default();
    let queue = TransactionQueue::<u32, String, _>::with_spawner(
        QueueConfig::new().with_auto_start(false).with_concurrency(2),
        spawner.clone(),
    )
    .unwrap();

    let first = queue.submit(|| async { Ok(1) });
    let second = queue.submit(|| async { Ok(2) });
    queue.start();
    assert_eq!(first.await, Ok(1));
    assert_eq!(second.await, Ok(2));
    assert_eq!(spawner.spawned.load(Ordering::SeqCst), 1);
}

fn current_thread_runtime() -> Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

#[test]
fn test_loop_dropped_with_runtime_resets_draining() {
    let runtime = current_thread_runtime();
    let queue = TransactionQueue::<u32, String, _>::with_spawner(
        QueueConfig::new().with_auto_start(false),
        TokioSpawner::new(runtime.handle().clone()),
    )
    .unwrap();

    let stranded = queue.submit(|| async { Ok(1) });
    assert!(queue.is_processing());

    // The loop task is dropped before its first poll.
    drop(runtime);
    assert!(!queue.is_processing());
    assert_eq!(queue.len(), 1);

    assert_eq!(queue.clear(), 1);
    assert_eq!(futures::executor::block_on(stranded), Err(TransactionError::Discarded));
}

#[test]
fn test_submit_after_runtime_drop_starts_new_loop() {
    let spawner = CountingSpawner::default();
    let queue = TransactionQueue::<u32, String, _>::with_spawner(
        QueueConfig::new().with_auto_start(false),
        spawner.clone(),
    )
    .unwrap();

    let first_runtime = current_thread_runtime();
    let stranded = {
        let _context = first_runtime.enter();
        queue.submit(|| async { Ok(1) })
    };
    drop(first_runtime);
    assert!(!queue.is_processing());

    let second_runtime = current_thread_runtime();
    let outcomes = second_runtime.block_on(async {
        let next = queue.submit(|| async { Ok(2) });
        tokio::time::timeout(Duration::from_secs(5), async { (stranded.await, next.await) }).await
    });

    assert_eq!(outcomes, Ok((Ok(1), Ok(2))));
    assert_eq!(spawner.spawned.load(Ordering::SeqCst), 2);
}
