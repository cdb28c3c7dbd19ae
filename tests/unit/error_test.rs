//! Tests for error types

use std::time::Duration;

use lane_queue::core::{LaneId, QueueError};

#[test]
fn test_cancelled_error() {
    let err = QueueError::Cancelled;
    assert_eq!(format!("{}", err), "cancelled while waiting for task result");
    assert!(err.is_cancellation());
}

#[test]
fn test_timed_out_error() {
    let err = QueueError::TimedOut(Duration::from_millis(250));
    assert_eq!(format!("{}", err), "timed out after 250ms waiting for task result");
    assert!(err.is_cancellation());
}

#[test]
fn test_evicted_error() {
    let err = QueueError::Evicted(LaneId::from("cron"));
    assert_eq!(format!("{}", err), "evicted from lane `cron` before execution");
    assert!(err.is_cancellation());
}

#[test]
fn test_no_runtime_error() {
    let err = QueueError::NoRuntime;
    assert_eq!(format!("{}", err), "no runtime available to run queued tasks");
    assert!(!err.is_cancellation());
}

#[test]
fn test_invalid_config_error() {
    let err = QueueError::InvalidConfig("bad lane".to_string());
    assert_eq!(format!("{}", err), "invalid config: bad lane");
    assert!(!err.is_cancellation());
    assert!(err.into_task_error().is_none());
}

#[test]
fn test_task_error_is_transparent() {
    let err = QueueError::Task(anyhow::anyhow!("disk full"));
    assert_eq!(format!("{}", err), "disk full");
    assert!(!err.is_cancellation());

    let inner = err.into_task_error().expect("task error");
    assert_eq!(inner.to_string(), "disk full");
}
