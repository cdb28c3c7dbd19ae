//! Read-only lane snapshots.

use serde::{Deserialize, Serialize};

use crate::core::LaneId;

/// Point-in-time view of one lane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaneStats {
    /// Lane the snapshot describes.
    pub lane: LaneId,
    /// Entries queued but not yet admitted.
    pub pending: usize,
    /// Entries currently executing.
    pub active: usize,
    /// Current admission ceiling.
    pub max_concurrent: usize,
}

impl LaneStats {
    /// Pending plus active.
    pub const fn total(&self) -> usize {
        self.pending + self.active
    }
}
