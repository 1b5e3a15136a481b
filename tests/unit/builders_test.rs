//! Tests for builder modules

use std::time::Duration;

use transaction_queue::builders::QueueBuilder;
use transaction_queue::config::QueueConfig;
use transaction_queue::core::{EventKind, QueueError};

#[test]
fn test_queue_builder_defaults() {
    let builder = QueueBuilder::<u32, String>::new();
    assert_eq!(builder.config(), &QueueConfig::default());
    assert_eq!(builder.listener_count(), 0);
}

#[test]
fn test_queue_builder_settings() {
    let builder = QueueBuilder::<u32, String>::new()
        .name("ledger")
        .concurrency(4)
        .auto_start(false)
        .delay(Duration::from_millis(20))
        .rate_limit(3, Duration::from_millis(500))
        .on(EventKind::Start, |_| {})
        .on(EventKind::Drain, |_| {});

    let config = builder.config();
    assert_eq!(config.name.as_deref(), Some("ledger"));
    assert_eq!(config.concurrency, 4);
    assert!(!config.auto_start);
    assert_eq!(config.delay_ms, 20);
    assert_eq!(config.rate_limit.map(|r| r.count), Some(3));
    assert_eq!(builder.listener_count(), 2);
}

#[test]
fn test_queue_builder_requires_runtime() {
    let result = QueueBuilder::<u32, String>::new().build();
    assert!(matches!(result, Err(QueueError::NoRuntime(_))));
}

#[tokio::test]
async fn test_queue_builder_rejects_invalid_config() {
    let result = QueueBuilder::<u32, String>::new().concurrency(0).build();
    assert!(matches!(result, Err(QueueError::InvalidConfig(_))));
}

#[tokio::test]
async fn test_queue_builder_from_config() {
    let config = QueueConfig::new().with_name("from-config").with_auto_start(false);
    let queue = QueueBuilder::<u32, String>::from_config(config).build().unwrap();
    assert_eq!(queue.label(), "from-config");
    assert!(!queue.is_processing());
}
