//! Error types for scheduler operations.

use std::time::Duration;

use thiserror::Error;

use crate::core::lane::LaneId;

/// Errors produced by the command queue.
///
/// Task failures are carried verbatim in [`QueueError::Task`]; every other
/// variant originates in the scheduler itself.
#[derive(Debug, Error)]
pub enum QueueError {
    /// The task ran and returned an error. The scheduler never inspects it.
    #[error(transparent)]
    Task(anyhow::Error),
    /// The caller's cancellation token fired before a result was delivered.
    #[error("cancelled while waiting for task result")]
    Cancelled,
    /// The caller's timeout elapsed before a result was delivered.
    #[error("timed out after {0:?} waiting for task result")]
    TimedOut(Duration),
    /// The entry was removed from its lane before it was admitted.
    #[error("evicted from lane `{0}` before execution")]
    Evicted(LaneId),
    /// The queue's spawner had no runtime to run admitted tasks on, e.g. a
    /// queue on the ambient runtime used from a thread outside any runtime.
    #[error("no runtime available to run queued tasks")]
    NoRuntime,
    /// Configuration rejected while building a queue.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    /// A job finished without delivering a result. Indicates a scheduler
    /// defect or a task that panicked.
    #[error("internal scheduler error: {0}")]
    Internal(String),
}

impl QueueError {
    /// Whether this error means the caller stopped waiting or the entry was
    /// withdrawn, as opposed to the task itself failing.
    pub const fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled | Self::TimedOut(_) | Self::Evicted(_))
    }

    /// Unwrap the task's own error, if that is what this is.
    pub fn into_task_error(self) -> Option<anyhow::Error> {
        match self {
            Self::Task(err) => Some(err),
            _ => None,
        }
    }
}

/// Result type returned by queued tasks.
pub type AppResult<T> = Result<T, anyhow::Error>;
