//! The lane-isolated command queue and its drain algorithm.
//!
//! Each lane is an independent FIFO with its own concurrency ceiling. Work in
//! one lane never waits on another lane. Within a lane, entries are admitted
//! strictly in enqueue order while `active < max_concurrent`.
//!
//! Draining is continuation style: enqueue, a concurrency change, and every
//! task completion each run one drain step inline. There is no long-lived
//! worker per lane.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::core::entry::{QueueEntry, Settle, DEFAULT_WARN_AFTER};
use crate::core::registry::{Lane, LaneRegistry};
use crate::core::{
    AppResult, EnqueueOptions, LaneId, LaneStats, QueueError, QueuedTask, Spawn, TaskContext,
};
use crate::runtime::TokioSpawner;

/// Lane-isolated command scheduler.
///
/// Cloning is cheap and clones share all lanes.
///
/// ```rust,ignore
/// use lane_queue::core::{CommandQueue, EnqueueOptions, lane};
///
/// let queue = CommandQueue::new();
/// queue.set_lane_concurrency(lane::CRON, 2);
///
/// let n = queue
///     .enqueue_in_lane(lane::CRON, |_ctx| async { Ok(42) }, EnqueueOptions::default())
///     .await?;
/// ```
#[derive(Clone)]
pub struct CommandQueue<S: Spawn = TokioSpawner> {
    registry: Arc<LaneRegistry>,
    spawner: S,
    default_warn_after: Duration,
}

impl CommandQueue<TokioSpawner> {
    /// Queue that spawns onto the ambient tokio runtime.
    ///
    /// Enqueueing requires a runtime context; use [`CommandQueue::with_spawner`]
    /// with a handle-backed [`TokioSpawner`] to enqueue from other threads.
    pub fn new() -> Self {
        Self::with_spawner(TokioSpawner::default())
    }
}

impl<S: Spawn> fmt::Debug for CommandQueue<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandQueue")
            .field("default_warn_after", &self.default_warn_after)
            .finish_non_exhaustive()
    }
}

impl Default for CommandQueue<TokioSpawner> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Spawn> CommandQueue<S> {
    /// Queue using the given spawner for task execution.
    pub fn with_spawner(spawner: S) -> Self {
        Self::from_parts(spawner, DEFAULT_WARN_AFTER, HashMap::new())
    }

    /// Queue with a default warn threshold and initial per-lane ceilings
    /// applied when those lanes are first created.
    pub(crate) fn from_parts(
        spawner: S,
        default_warn_after: Duration,
        initial: HashMap<LaneId, usize>,
    ) -> Self {
        Self {
            registry: Arc::new(LaneRegistry::new(initial)),
            spawner,
            default_warn_after,
        }
    }

    /// Default wait threshold applied when options leave it unset.
    pub const fn default_warn_after(&self) -> Duration {
        self.default_warn_after
    }

    /// Run `task` in the main lane and wait for its result.
    ///
    /// See [`CommandQueue::enqueue_in_lane`].
    pub async fn enqueue<T, F, Fut>(&self, task: F, opts: EnqueueOptions) -> Result<T, QueueError>
    where
        T: Send + 'static,
        F: FnOnce(TaskContext) -> Fut + Send + 'static,
        Fut: Future<Output = AppResult<T>> + Send + 'static,
    {
        self.enqueue_in_lane(LaneId::main(), task, opts).await
    }

    /// Run `task` in `lane` and wait for its result.
    ///
    /// Returns the task's value, [`QueueError::Task`] with the task's own
    /// error, [`QueueError::Cancelled`]/[`QueueError::TimedOut`] if the
    /// caller's token or timeout fires first, or [`QueueError::Evicted`] if
    /// the lane is cleared while the task is still queued.
    ///
    /// Cancellation and timeout only stop the *wait*. A queued task stays
    /// queued and still runs; a running task is not interrupted. Its result
    /// is discarded. Tasks that should stop early can watch
    /// [`TaskContext::cancelled`].
    pub async fn enqueue_in_lane<T, F, Fut>(
        &self,
        lane: impl Into<LaneId>,
        task: F,
        opts: EnqueueOptions,
    ) -> Result<T, QueueError>
    where
        T: Send + 'static,
        F: FnOnce(TaskContext) -> Fut + Send + 'static,
        Fut: Future<Output = AppResult<T>> + Send + 'static,
    {
        self.submit_in_lane(lane, task, opts).wait().await
    }

    /// Queue `task` in the main lane without waiting.
    pub fn submit<T, F, Fut>(&self, task: F, opts: EnqueueOptions) -> QueuedTask<T>
    where
        T: Send + 'static,
        F: FnOnce(TaskContext) -> Fut + Send + 'static,
        Fut: Future<Output = AppResult<T>> + Send + 'static,
    {
        self.submit_in_lane(LaneId::main(), task, opts)
    }

    /// Queue `task` in `lane` without waiting.
    ///
    /// The entry is appended and a drain step runs before this returns, so
    /// the FIFO position is fixed by call order. Await
    /// [`QueuedTask::wait`] for the result.
    ///
    /// If the spawner cannot run tasks from the calling thread the entry is
    /// never queued and the handle resolves to [`QueueError::NoRuntime`].
    pub fn submit_in_lane<T, F, Fut>(
        &self,
        lane: impl Into<LaneId>,
        task: F,
        opts: EnqueueOptions,
    ) -> QueuedTask<T>
    where
        T: Send + 'static,
        F: FnOnce(TaskContext) -> Fut + Send + 'static,
        Fut: Future<Output = AppResult<T>> + Send + 'static,
    {
        let lane_id = lane.into();
        let EnqueueOptions {
            warn_after,
            on_wait,
            cancel,
            timeout,
        } = opts;
        let cancel = cancel.map_or_else(CancellationToken::new, |c| c.child_token());
        let warn_after = warn_after.unwrap_or(self.default_warn_after);

        let (entry, rx) = QueueEntry::new(task, warn_after, on_wait, cancel.clone());
        let task_id = entry.task_id;

        if let Err(err) = self.spawner.ready() {
            tracing::warn!(lane = %lane_id, task_id = %task_id, error = %err, "task rejected");
            entry.job.evict(err);
            return QueuedTask::new(lane_id, task_id, rx, cancel, timeout);
        }

        let lane = self.registry.ensure(&lane_id);
        let pending = {
            let mut state = lane.state.lock();
            state.queue.push_back(entry);
            state.queue.len()
        };
        tracing::debug!(lane = %lane_id, task_id = %task_id, pending, "task enqueued");

        drain(&lane, &self.spawner);

        QueuedTask::new(lane_id, task_id, rx, cancel, timeout)
    }

    /// Set the admission ceiling for `lane`, clamped to at least 1.
    ///
    /// Raising the ceiling admits backlog immediately. Lowering it only
    /// affects future admissions; in-flight tasks keep running, so `active`
    /// may briefly exceed the new ceiling.
    pub fn set_lane_concurrency(&self, lane: impl Into<LaneId>, max_concurrent: i64) {
        let max_concurrent = usize::try_from(max_concurrent.max(1)).unwrap_or(usize::MAX);
        let lane = self.registry.ensure(&lane.into());
        lane.state.lock().max_concurrent = max_concurrent;
        tracing::debug!(lane = %lane.id, max_concurrent, "lane concurrency set");

        drain(&lane, &self.spawner);
    }

    /// Remove every queued (not yet admitted) entry from `lane`.
    ///
    /// Each removed caller receives [`QueueError::Evicted`]. Running tasks
    /// are untouched. Returns the number of entries removed.
    pub fn clear_lane(&self, lane: impl Into<LaneId>) -> usize {
        let Some(lane) = self.registry.get(&lane.into()) else {
            return 0;
        };

        let evicted: Vec<QueueEntry> = lane.state.lock().queue.drain(..).collect();
        let removed = evicted.len();
        for entry in evicted {
            entry.job.evict(QueueError::Evicted(lane.id.clone()));
        }

        if removed > 0 {
            tracing::debug!(lane = %lane.id, removed, "lane cleared");
        }
        removed
    }

    /// Pending plus active entries in `lane`.
    pub fn get_queue_size(&self, lane: impl Into<LaneId>) -> usize {
        self.registry.get(&lane.into()).map_or(0, |lane| {
            let state = lane.state.lock();
            state.queue.len() + state.active
        })
    }

    /// Entries queued in `lane` but not yet admitted.
    pub fn get_pending_tasks(&self, lane: impl Into<LaneId>) -> usize {
        self.registry
            .get(&lane.into())
            .map_or(0, |lane| lane.state.lock().queue.len())
    }

    /// Entries currently executing in `lane`.
    pub fn get_active_tasks(&self, lane: impl Into<LaneId>) -> usize {
        self.registry
            .get(&lane.into())
            .map_or(0, |lane| lane.state.lock().active)
    }

    /// Pending plus active entries across all lanes.
    pub fn get_total_queue_size(&self) -> usize {
        self.registry.total_size()
    }

    /// Snapshot of `lane`, creating the lane if it does not exist yet.
    pub fn get_lane_stats(&self, lane: impl Into<LaneId>) -> LaneStats {
        self.registry.ensure(&lane.into()).stats()
    }

    /// Snapshot of every known lane, sorted by lane id.
    pub fn get_all_lane_stats(&self) -> Vec<LaneStats> {
        self.registry.all_stats()
    }
}

/// Start a drain step unless one already owns the lane.
///
/// Without a usable runtime nothing is admitted; the backlog stays queued
/// for the next drain step that has one.
fn drain<S: Spawn>(lane: &Arc<Lane>, spawner: &S) {
    if let Err(err) = spawner.ready() {
        tracing::debug!(lane = %lane.id, error = %err, "drain deferred");
        return;
    }
    {
        let mut state = lane.state.lock();
        if state.draining {
            return;
        }
        state.draining = true;
    }
    pump(lane, spawner);
}

/// Admit queued entries until the lane is empty or at its ceiling.
fn pump<S: Spawn>(lane: &Arc<Lane>, spawner: &S) {
    let mut guard = DrainGuard { lane, armed: true };
    loop {
        let (entry, queued_ahead) = {
            let mut state = lane.state.lock();
            if state.active >= state.max_concurrent {
                guard.armed = false;
                state.draining = false;
                return;
            }
            let Some(entry) = state.queue.pop_front() else {
                guard.armed = false;
                state.draining = false;
                return;
            };
            state.active += 1;
            (entry, state.queue.len())
        };
        let slot = AdmissionSlot {
            lane: Arc::clone(lane),
            spawner: spawner.clone(),
            released: false,
        };

        let waited = entry.enqueued_at.elapsed();
        if waited >= entry.warn_after {
            tracing::debug!(
                lane = %lane.id,
                task_id = %entry.task_id,
                waited_ms = u64::try_from(waited.as_millis()).unwrap_or(u64::MAX),
                queued_ahead,
                "lane wait exceeded threshold"
            );
            if let Some(on_wait) = &entry.on_wait {
                let observed =
                    panic::catch_unwind(AssertUnwindSafe(|| on_wait(waited, queued_ahead)));
                if observed.is_err() {
                    tracing::warn!(
                        lane = %lane.id,
                        task_id = %entry.task_id,
                        "wait observer panicked"
                    );
                }
            }
        }

        tracing::debug!(lane = %lane.id, task_id = %entry.task_id, queued_ahead, "task admitted");
        let ctx = TaskContext::new(lane.id.clone(), entry.task_id, waited, entry.cancel);
        let run = entry.job.run(ctx);
        spawner.spawn(async move {
            let settle = run.await;
            slot.complete(settle);
        });
    }
}

/// Hands the lane back if a drain step unwinds, e.g. from a panicking
/// spawner, so later callers can drain it again.
struct DrainGuard<'a> {
    lane: &'a Arc<Lane>,
    armed: bool,
}

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.lane.state.lock().draining = false;
        }
    }
}

/// One unit of lane capacity held by a running task.
///
/// Released on completion, or on drop if the task panicked, so a failing
/// task can never wedge its lane.
struct AdmissionSlot<S: Spawn> {
    lane: Arc<Lane>,
    spawner: S,
    released: bool,
}

impl<S: Spawn> AdmissionSlot<S> {
    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        let active = {
            let mut state = self.lane.state.lock();
            state.active = state.active.saturating_sub(1);
            state.active
        };
        tracing::debug!(lane = %self.lane.id, active, "task completed");
    }

    /// Release capacity, deliver the result, then drain the next entry.
    fn complete(mut self, settle: Settle) {
        self.release();
        settle();
        // Drop runs the next drain step.
    }
}

impl<S: Spawn> Drop for AdmissionSlot<S> {
    fn drop(&mut self) {
        if !self.released {
            tracing::warn!(lane = %self.lane.id, "task ended without completing");
        }
        self.release();
        drain(&self.lane, &self.spawner);
    }
}
