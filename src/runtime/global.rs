//! Process-wide default queue.

use std::future::Future;
use std::sync::OnceLock;

use crate::core::{AppResult, CommandQueue, EnqueueOptions, LaneId, QueueError, TaskContext};
use crate::runtime::TokioSpawner;

static DEFAULT_QUEUE: OnceLock<CommandQueue<TokioSpawner>> = OnceLock::new();

/// Shared queue for callers that do not own one.
///
/// Created on first use; spawns onto the ambient tokio runtime.
pub fn default_queue() -> &'static CommandQueue<TokioSpawner> {
    DEFAULT_QUEUE.get_or_init(CommandQueue::new)
}

/// Run `task` on the default queue's main lane.
pub async fn enqueue<T, F, Fut>(task: F, opts: EnqueueOptions) -> Result<T, QueueError>
where
    T: Send + 'static,
    F: FnOnce(TaskContext) -> Fut + Send + 'static,
    Fut: Future<Output = AppResult<T>> + Send + 'static,
{
    default_queue().enqueue(task, opts).await
}

/// Run `task` on the default queue in `lane`.
pub async fn enqueue_in_lane<T, F, Fut>(
    lane: impl Into<LaneId>,
    task: F,
    opts: EnqueueOptions,
) -> Result<T, QueueError>
where
    T: Send + 'static,
    F: FnOnce(TaskContext) -> Fut + Send + 'static,
    Fut: Future<Output = AppResult<T>> + Send + 'static,
{
    default_queue().enqueue_in_lane(lane, task, opts).await
}
