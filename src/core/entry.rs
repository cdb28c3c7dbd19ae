//! Queue entries, per-call options, and the typed result handle.
//!
//! The lane backlog is a homogeneous queue of boxed [`Job`]s. Each job closes
//! over its own typed `oneshot` sender, so results never travel through an
//! untyped channel and no downcast is needed on the way back to the caller.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::core::{AppResult, LaneId, QueueError};

/// Default wait threshold before the wait observer fires.
pub const DEFAULT_WARN_AFTER: Duration = Duration::from_millis(2000);

/// Callback notified when an entry waited at least its threshold before
/// admission. Receives the wait and the number of entries still queued
/// behind it.
pub type WaitObserver = Arc<dyn Fn(Duration, usize) + Send + Sync>;

/// Boxed future used at the type-erasure seam.
pub(crate) type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// Deferred result delivery produced when a job finishes.
pub(crate) type Settle = Box<dyn FnOnce() + Send>;

/// Execution context handed to every task.
///
/// The cancellation token is the one the caller supplied through
/// [`EnqueueOptions`] (or a never-cancelled token). It is cancelled when the
/// caller's own token fires or its timeout elapses; tasks that care can
/// observe it, but the scheduler never aborts a running task.
#[derive(Debug, Clone)]
pub struct TaskContext {
    lane: LaneId,
    task_id: Uuid,
    waited: Duration,
    cancel: CancellationToken,
}

impl TaskContext {
    pub(crate) const fn new(
        lane: LaneId,
        task_id: Uuid,
        waited: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            lane,
            task_id,
            waited,
            cancel,
        }
    }

    /// Lane the task was admitted from.
    pub const fn lane(&self) -> &LaneId {
        &self.lane
    }

    /// Identifier assigned at enqueue time.
    pub const fn task_id(&self) -> Uuid {
        self.task_id
    }

    /// Time spent queued before admission.
    pub const fn waited(&self) -> Duration {
        self.waited
    }

    /// Whether the caller has stopped waiting.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Resolves once the caller's token is cancelled.
    pub async fn cancelled(&self) {
        self.cancel.cancelled().await;
    }

    /// The underlying token, for handing to nested work.
    pub const fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }
}

/// Per-call enqueue options.
#[derive(Clone, Default)]
pub struct EnqueueOptions {
    /// Wait threshold for the observer. `None` uses the queue default.
    pub warn_after: Option<Duration>,
    /// Observer invoked at most once when the wait reaches `warn_after`.
    pub on_wait: Option<WaitObserver>,
    /// Caller cancellation. `None` never cancels.
    pub cancel: Option<CancellationToken>,
    /// Give up waiting after this long.
    pub timeout: Option<Duration>,
}

impl EnqueueOptions {
    /// Options with every field defaulted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the wait threshold.
    #[must_use]
    pub const fn with_warn_after(mut self, warn_after: Duration) -> Self {
        self.warn_after = Some(warn_after);
        self
    }

    /// Set the wait observer.
    #[must_use]
    pub fn with_on_wait<F>(mut self, on_wait: F) -> Self
    where
        F: Fn(Duration, usize) + Send + Sync + 'static,
    {
        self.on_wait = Some(Arc::new(on_wait));
        self
    }

    /// Attach a caller cancellation token.
    #[must_use]
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Stop waiting after `timeout`.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl fmt::Debug for EnqueueOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnqueueOptions")
            .field("warn_after", &self.warn_after)
            .field("on_wait", &self.on_wait.as_ref().map(|_| "<fn>"))
            .field("cancel", &self.cancel)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Type-erased unit of work stored in a lane backlog.
pub(crate) trait Job: Send {
    /// Run the task. The returned closure delivers the outcome and must be
    /// called only after the lane has released the admission slot.
    fn run(self: Box<Self>, ctx: TaskContext) -> BoxFuture<Settle>;

    /// Deliver `err` without running the task.
    fn evict(self: Box<Self>, err: QueueError);
}

struct TypedJob<T, F> {
    task: F,
    tx: oneshot::Sender<Result<T, QueueError>>,
}

impl<T, F, Fut> Job for TypedJob<T, F>
where
    T: Send + 'static,
    F: FnOnce(TaskContext) -> Fut + Send + 'static,
    Fut: Future<Output = AppResult<T>> + Send + 'static,
{
    fn run(self: Box<Self>, ctx: TaskContext) -> BoxFuture<Settle> {
        let Self { task, tx } = *self;
        Box::pin(async move {
            let outcome = task(ctx).await.map_err(QueueError::Task);
            Box::new(move || {
                // Caller may have given up already; the result is dropped.
                let _ = tx.send(outcome);
            }) as Settle
        })
    }

    fn evict(self: Box<Self>, err: QueueError) {
        let _ = self.tx.send(Err(err));
    }
}

/// A pending task sitting in a lane backlog.
pub(crate) struct QueueEntry {
    pub(crate) job: Box<dyn Job>,
    pub(crate) task_id: Uuid,
    pub(crate) enqueued_at: Instant,
    pub(crate) warn_after: Duration,
    pub(crate) on_wait: Option<WaitObserver>,
    pub(crate) cancel: CancellationToken,
}

impl QueueEntry {
    /// Wrap a typed task, returning the entry and the caller's side of its
    /// delivery channel.
    pub(crate) fn new<T, F, Fut>(
        task: F,
        warn_after: Duration,
        on_wait: Option<WaitObserver>,
        cancel: CancellationToken,
    ) -> (Self, oneshot::Receiver<Result<T, QueueError>>)
    where
        T: Send + 'static,
        F: FnOnce(TaskContext) -> Fut + Send + 'static,
        Fut: Future<Output = AppResult<T>> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let entry = Self {
            job: Box::new(TypedJob { task, tx }),
            task_id: Uuid::new_v4(),
            enqueued_at: Instant::now(),
            warn_after,
            on_wait,
            cancel,
        };
        (entry, rx)
    }
}

/// Handle to a task that has been placed in a lane.
///
/// The task's FIFO position is fixed once this handle exists. Dropping the
/// handle (or the future returned by [`QueuedTask::wait`]) abandons the
/// result but leaves the task queued; it still runs when admitted.
#[must_use = "the result is lost unless the handle is awaited"]
pub struct QueuedTask<T> {
    lane: LaneId,
    task_id: Uuid,
    rx: oneshot::Receiver<Result<T, QueueError>>,
    cancel: CancellationToken,
    deadline: Option<(Instant, Duration)>,
}

impl<T> QueuedTask<T> {
    pub(crate) fn new(
        lane: LaneId,
        task_id: Uuid,
        rx: oneshot::Receiver<Result<T, QueueError>>,
        cancel: CancellationToken,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            lane,
            task_id,
            rx,
            cancel,
            deadline: timeout.map(|t| (Instant::now() + t, t)),
        }
    }

    /// Lane the task was queued in.
    pub const fn lane(&self) -> &LaneId {
        &self.lane
    }

    /// Identifier assigned at enqueue time.
    pub const fn task_id(&self) -> Uuid {
        self.task_id
    }

    /// Wait for the task's result.
    ///
    /// Returns early with [`QueueError::Cancelled`] or
    /// [`QueueError::TimedOut`] when the caller's token fires or the timeout
    /// (counted from enqueue) elapses. Returning early does **not** stop the
    /// task: if it is still queued it will run later, and if it is running it
    /// runs to completion. Its result is then discarded.
    pub async fn wait(self) -> Result<T, QueueError> {
        let Self {
            rx,
            cancel,
            deadline,
            ..
        } = self;

        tokio::select! {
            biased;
            delivered = rx => delivered.unwrap_or_else(|_| {
                Err(QueueError::Internal(
                    "task ended without delivering a result".into(),
                ))
            }),
            () = cancel.cancelled() => Err(QueueError::Cancelled),
            elapsed = wait_deadline(deadline) => {
                cancel.cancel();
                Err(QueueError::TimedOut(elapsed))
            }
        }
    }
}

impl<T> fmt::Debug for QueuedTask<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueuedTask")
            .field("lane", &self.lane)
            .field("task_id", &self.task_id)
            .field("deadline", &self.deadline)
            .finish_non_exhaustive()
    }
}

async fn wait_deadline(deadline: Option<(Instant, Duration)>) -> Duration {
    match deadline {
        Some((at, timeout)) => {
            tokio::time::sleep_until(at).await;
            timeout
        }
        None => std::future::pending().await,
    }
}
