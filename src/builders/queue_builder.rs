//! Build a command queue from configuration.

use crate::config::QueueConfig;
use crate::core::{CommandQueue, LaneId, QueueError, Spawn};

/// Build a queue from validated configuration.
///
/// Lanes listed in the config start at their configured ceiling when first
/// used; all other lanes start at 1.
pub fn build_queue<S: Spawn>(cfg: &QueueConfig, spawner: S) -> Result<CommandQueue<S>, QueueError> {
    cfg.validate().map_err(QueueError::InvalidConfig)?;

    let initial = cfg
        .lanes
        .iter()
        .map(|(name, lane)| (LaneId::from(name), lane.max_concurrent))
        .collect();

    tracing::debug!(
        lanes = cfg.lanes.len(),
        default_warn_after_ms = cfg.default_warn_after_ms,
        "building command queue"
    );
    Ok(CommandQueue::from_parts(spawner, cfg.default_warn_after(), initial))
}
