//! Lane registry and per-lane state.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::core::entry::QueueEntry;
use crate::core::stats::LaneStats;
use crate::core::LaneId;

/// Mutable state of one lane. Always accessed under [`Lane::state`].
pub(crate) struct LaneState {
    /// Pending entries; front is next to admit.
    pub(crate) queue: VecDeque<QueueEntry>,
    /// Entries currently executing.
    pub(crate) active: usize,
    /// Admission ceiling, never below 1.
    pub(crate) max_concurrent: usize,
    /// Set while a drain step owns this lane.
    pub(crate) draining: bool,
}

impl LaneState {
    fn new(max_concurrent: usize) -> Self {
        Self {
            queue: VecDeque::new(),
            active: 0,
            max_concurrent: max_concurrent.max(1),
            draining: false,
        }
    }
}

/// A lane: its id plus its own mutex-protected state.
pub(crate) struct Lane {
    pub(crate) id: LaneId,
    pub(crate) state: Mutex<LaneState>,
}

impl Lane {
    pub(crate) fn stats(&self) -> LaneStats {
        let state = self.state.lock();
        LaneStats {
            lane: self.id.clone(),
            pending: state.queue.len(),
            active: state.active,
            max_concurrent: state.max_concurrent,
        }
    }
}

/// Concurrency-safe map of lane id to lane, populated lazily.
///
/// Lookups take the shared lock; the exclusive lock is taken only to insert a
/// lane that does not exist yet.
pub(crate) struct LaneRegistry {
    lanes: RwLock<HashMap<LaneId, Arc<Lane>>>,
    /// Initial ceilings for lanes created later, keyed by lane id.
    initial: HashMap<LaneId, usize>,
}

impl LaneRegistry {
    pub(crate) fn new(initial: HashMap<LaneId, usize>) -> Self {
        Self {
            lanes: RwLock::new(HashMap::new()),
            initial,
        }
    }

    /// Existing lane, without creating it.
    pub(crate) fn get(&self, lane: &LaneId) -> Option<Arc<Lane>> {
        self.lanes.read().get(lane).cloned()
    }

    /// Existing lane, or a freshly created one.
    pub(crate) fn ensure(&self, lane: &LaneId) -> Arc<Lane> {
        if let Some(existing) = self.get(lane) {
            return existing;
        }

        let mut lanes = self.lanes.write();
        // Another caller may have created it between the two locks.
        Arc::clone(lanes.entry(lane.clone()).or_insert_with(|| {
            let max_concurrent = self.initial.get(lane).copied().unwrap_or(1);
            tracing::debug!(lane = %lane, max_concurrent, "lane created");
            Arc::new(Lane {
                id: lane.clone(),
                state: Mutex::new(LaneState::new(max_concurrent)),
            })
        }))
    }

    /// Stats for every registered lane, sorted by lane id.
    ///
    /// Holds the shared registry lock and visits lanes one at a time, so at
    /// most one lane lock is held at any moment.
    pub(crate) fn all_stats(&self) -> Vec<LaneStats> {
        let mut stats: Vec<LaneStats> = self
            .lanes
            .read()
            .values()
            .map(|lane| lane.stats())
            .collect();
        stats.sort_by(|a, b| a.lane.cmp(&b.lane));
        stats
    }

    /// Pending plus active across every lane.
    pub(crate) fn total_size(&self) -> usize {
        self.lanes
            .read()
            .values()
            .map(|lane| {
                let state = lane.state.lock();
                state.queue.len() + state.active
            })
            .sum()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.lanes.read().len()
    }
}
