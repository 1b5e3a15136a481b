//! Tests for error types

use transaction_queue::core::{QueueError, TransactionError};

#[test]
fn test_invalid_config_error() {
    let err = QueueError::InvalidConfig("concurrency must be greater than 0".to_string());
    assert_eq!(
        format!("{}", err),
        "invalid configuration: concurrency must be greater than 0"
    );
}

#[test]
fn test_no_runtime_error() {
    let err = QueueError::NoRuntime("no reactor running".to_string());
    assert_eq!(format!("{}", err), "no async runtime available: no reactor running");
}

#[test]
fn test_failed_transaction_error() {
    let err: TransactionError<String> = TransactionError::Failed("insufficient funds".to_string());
    assert_eq!(format!("{}", err), "transaction failed: insufficient funds");
}

#[test]
fn test_panicked_transaction_error() {
    let err: TransactionError<String> = TransactionError::Panicked("index out of bounds".to_string());
    assert_eq!(format!("{}", err), "transaction panicked: index out of bounds");
}

#[test]
fn test_discarded_transaction_error() {
    let err: TransactionError<String> = TransactionError::Discarded;
    assert_eq!(format!("{}", err), "transaction discarded before it ran");
    assert!(err.is_discarded());
}
