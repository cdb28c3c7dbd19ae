//! Tests for builder modules

use std::collections::HashMap;
use std::time::Duration;

use lane_queue::builders::build_queue;
use lane_queue::config::{LaneConfig, QueueConfig};
use lane_queue::core::{lane, QueueError};
use lane_queue::runtime::TokioSpawner;

#[tokio::test]
async fn test_build_queue_applies_initial_ceilings() {
    let mut lanes = HashMap::new();
    lanes.insert(lane::CRON.to_string(), LaneConfig { max_concurrent: 2 });
    lanes.insert(lane::SUBAGENT.to_string(), LaneConfig { max_concurrent: 4 });
    let config = QueueConfig {
        default_warn_after_ms: 300,
        lanes,
    };

    let queue = build_queue(&config, TokioSpawner::default()).unwrap();
    assert_eq!(queue.default_warn_after(), Duration::from_millis(300));

    // Configured lanes are created lazily at their configured ceiling.
    assert!(queue.get_all_lane_stats().is_empty());
    assert_eq!(queue.get_lane_stats(lane::CRON).max_concurrent, 2);
    assert_eq!(queue.get_lane_stats(lane::SUBAGENT).max_concurrent, 4);
    assert_eq!(queue.get_lane_stats(lane::MAIN).max_concurrent, 1);
}

#[tokio::test]
async fn test_build_queue_runtime_override_wins() {
    let mut lanes = HashMap::new();
    lanes.insert(lane::CRON.to_string(), LaneConfig { max_concurrent: 2 });
    let config = QueueConfig {
        default_warn_after_ms: 2000,
        lanes,
    };

    let queue = build_queue(&config, TokioSpawner::default()).unwrap();
    queue.set_lane_concurrency(lane::CRON, 6);
    assert_eq!(queue.get_lane_stats(lane::CRON).max_concurrent, 6);

    let n = queue
        .enqueue_in_lane(lane::CRON, |_ctx| async { Ok(9) }, Default::default())
        .await
        .unwrap();
    assert_eq!(n, 9);
}

#[test]
fn test_build_queue_rejects_invalid_config() {
    let mut lanes = HashMap::new();
    lanes.insert("broken".to_string(), LaneConfig { max_concurrent: 0 });
    let config = QueueConfig {
        default_warn_after_ms: 2000,
        lanes,
    };

    let err = build_queue(&config, TokioSpawner::default()).unwrap_err();
    assert!(matches!(err, QueueError::InvalidConfig(ref msg) if msg.contains("broken")));
}
