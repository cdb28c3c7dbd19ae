//! Tests for configuration parsing and validation

use std::collections::HashMap;
use std::time::Duration;

use lane_queue::config::queue::{ENV_CONCURRENCY, ENV_WARN_AFTER_MS};
use lane_queue::config::{LaneConfig, QueueConfig};

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn test_queue_config_defaults() {
    let config = QueueConfig::default();
    assert_eq!(config.default_warn_after_ms, 2000);
    assert_eq!(config.default_warn_after(), Duration::from_secs(2));
    assert!(config.lanes.is_empty());
    assert!(config.validate().is_ok());
}

#[test]
fn test_lane_config_invalid_concurrency() {
    let invalid = LaneConfig { max_concurrent: 0 };
    assert!(invalid.validate().is_err());
    assert!(LaneConfig { max_concurrent: 4 }.validate().is_ok());
}

#[test]
fn test_queue_config_invalid_threshold() {
    let invalid = QueueConfig {
        default_warn_after_ms: 0,
        lanes: HashMap::new(),
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_queue_config_invalid_lane_named_in_error() {
    let mut lanes = HashMap::new();
    lanes.insert("cron".to_string(), LaneConfig { max_concurrent: 0 });
    let config = QueueConfig {
        default_warn_after_ms: 2000,
        lanes,
    };

    let err = config.validate().unwrap_err();
    assert!(err.contains("cron"), "unexpected error: {err}");
}

#[test]
fn test_queue_config_from_json() {
    let json = r#"{
        "default_warn_after_ms": 500,
        "lanes": {
            "cron": { "max_concurrent": 2 },
            "subagent": { "max_concurrent": 4 }
        }
    }"#;

    let config = QueueConfig::from_json_str(json).unwrap();
    assert_eq!(config.default_warn_after_ms, 500);
    assert_eq!(config.lanes["cron"].max_concurrent, 2);
    assert_eq!(config.lanes["subagent"].max_concurrent, 4);
}

#[test]
fn test_queue_config_from_json_uses_defaults() {
    let config = QueueConfig::from_json_str("{}").unwrap();
    assert_eq!(config, QueueConfig::default());
}

#[test]
fn test_queue_config_from_json_rejects_invalid() {
    assert!(QueueConfig::from_json_str("not json").is_err());
    assert!(QueueConfig::from_json_str(r#"{"lanes": {"main": {"max_concurrent": 0}}}"#).is_err());
}

#[test]
fn test_queue_config_from_lookup() {
    let config = QueueConfig::from_lookup(lookup(&[
        (ENV_WARN_AFTER_MS, "750"),
        (ENV_CONCURRENCY, " cron=2, subagent = 4 ,"),
    ]))
    .unwrap();

    assert_eq!(config.default_warn_after(), Duration::from_millis(750));
    assert_eq!(config.lanes.len(), 2);
    assert_eq!(config.lanes["cron"], LaneConfig { max_concurrent: 2 });
    assert_eq!(config.lanes["subagent"], LaneConfig { max_concurrent: 4 });
}

#[test]
fn test_queue_config_from_lookup_unset_keeps_defaults() {
    let config = QueueConfig::from_lookup(lookup(&[])).unwrap();
    assert_eq!(config, QueueConfig::default());
}

#[test]
fn test_queue_config_from_lookup_rejects_malformed() {
    assert!(QueueConfig::from_lookup(lookup(&[(ENV_WARN_AFTER_MS, "soon")])).is_err());
    assert!(QueueConfig::from_lookup(lookup(&[(ENV_WARN_AFTER_MS, "0")])).is_err());
    assert!(QueueConfig::from_lookup(lookup(&[(ENV_CONCURRENCY, "cron")])).is_err());
    assert!(QueueConfig::from_lookup(lookup(&[(ENV_CONCURRENCY, "cron=-1")])).is_err());
    assert!(QueueConfig::from_lookup(lookup(&[(ENV_CONCURRENCY, "cron=0")])).is_err());
}
