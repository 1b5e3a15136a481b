//! Tests for configuration validation

use std::time::Duration;

use transaction_queue::config::{QueueConfig, RateLimitConfig};

#[test]
fn test_queue_config_defaults() {
    let config = QueueConfig::default();
    assert_eq!(config.concurrency, 1);
    assert!(config.auto_start);
    assert_eq!(config.delay(), Duration::ZERO);
    assert!(config.rate_limit.is_none());
    assert!(config.validate().is_ok());
}

#[test]
fn test_queue_config_builder_methods() {
    let config = QueueConfig::new()
        .with_name("settlements")
        .with_concurrency(8)
        .with_auto_start(false)
        .with_delay(Duration::from_millis(250))
        .with_rate_limit(100, Duration::from_secs(60));

    assert_eq!(config.name.as_deref(), Some("settlements"));
    assert_eq!(config.concurrency, 8);
    assert!(!config.auto_start);
    assert_eq!(config.delay_ms, 250);
    assert_eq!(
        config.rate_limit,
        Some(RateLimitConfig {
            count: 100,
            duration_ms: 60_000
        })
    );
    assert!(config.validate().is_ok());
}

#[test]
fn test_queue_config_invalid_concurrency() {
    let invalid = QueueConfig::new().with_concurrency(0);
    assert!(invalid.validate().is_err());
}

#[test]
fn test_queue_config_invalid_rate_limit_count() {
    let invalid = QueueConfig::new().with_rate_limit(0, Duration::from_secs(1));
    assert!(invalid.validate().is_err());
}

#[test]
fn test_queue_config_invalid_rate_limit_duration() {
    let invalid = QueueConfig::new().with_rate_limit(5, Duration::ZERO);
    assert!(invalid.validate().is_err());
}

#[test]
fn test_queue_config_from_json() {
    let json = r#"{
        "name": "payouts",
        "concurrency": 4,
        "auto_start": false,
        "delay_ms": 10,
        "rate_limit": { "count": 2, "duration_ms": 100 }
    }"#;

    let config = QueueConfig::from_json_str(json).unwrap();
    assert_eq!(config.concurrency, 4);
    assert!(!config.auto_start);
    assert_eq!(config.delay(), Duration::from_millis(10));
    assert_eq!(config.rate_limit.map(|r| r.duration()), Some(Duration::from_millis(100)));
}

#[test]
fn test_queue_config_from_json_uses_defaults() {
    let config = QueueConfig::from_json_str("{}").unwrap();
    assert_eq!(config, QueueConfig::default());
}

#[test]
fn test_queue_config_from_json_rejects_invalid() {
    assert!(QueueConfig::from_json_str(r#"{ "concurrency": 0 }"#).is_err());
    assert!(QueueConfig::from_json_str("not json").is_err());
}

#[test]
fn test_queue_config_json_round_trip() {
    let config = QueueConfig::new().with_concurrency(3).with_delay(Duration::from_millis(5));
    let json = serde_json::to_string(&config).unwrap();
    assert_eq!(QueueConfig::from_json_str(&json).unwrap(), config);
}
