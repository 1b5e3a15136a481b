//! Tests for utility functions

use std::sync::Arc;

use tokio::sync::Notify;
use transaction_queue::config::QueueConfig;
use transaction_queue::core::{EventKind, TransactionQueue};
use transaction_queue::util::{init_tracing, TracingObserver};

#[test]
fn test_init_tracing_is_idempotent() {
    init_tracing();
    assert!(!init_tracing());
}

#[test]
fn test_tracing_observer_label() {
    let observer = TracingObserver::new("ledger");
    assert_eq!(observer.label(), "ledger");
}

#[tokio::test]
async fn test_tracing_observer_handles_every_event() {
    let queue = TransactionQueue::<u32, String>::new(QueueConfig::new().with_auto_start(false)).unwrap();
    let ids = queue.observe(Arc::new(TracingObserver::new(queue.label())));
    assert_eq!(ids.len(), EventKind::ALL.len());

    let drained = Arc::new(Notify::new());
    let signal = Arc::clone(&drained);
    queue.on(EventKind::Drain, move |_| signal.notify_one());

    assert_eq!(queue.submit(|| async { Ok(1) }).await, Ok(1));
    assert!(queue.submit(|| async { Err("declined".to_string()) }).await.is_err());
    drained.notified().await;

    for (kind, id) in ids {
        assert!(queue.remove_listener(kind, id));
    }
}
