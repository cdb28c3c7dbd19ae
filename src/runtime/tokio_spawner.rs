//! Tokio runtime spawner implementation.

use std::future::Future;
use std::sync::Arc;

use crate::core::{QueueError, Spawn};

/// Tokio-based spawner that executes admitted tasks on a tokio runtime.
///
/// The default spawner targets whichever runtime is current at spawn time.
/// A handle-backed spawner always targets that runtime, so it can be used
/// from threads outside any runtime.
#[derive(Clone, Default)]
pub struct TokioSpawner {
    handle: Option<Arc<tokio::runtime::Handle>>,
}

impl TokioSpawner {
    /// Create a new TokioSpawner from a tokio runtime handle.
    pub fn new(handle: tokio::runtime::Handle) -> Self {
        Self {
            handle: Some(Arc::new(handle)),
        }
    }

    /// Spawner bound to the runtime the caller is running on, if any.
    pub fn try_current() -> Option<Self> {
        tokio::runtime::Handle::try_current().ok().map(Self::new)
    }
}

impl Spawn for TokioSpawner {
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        match &self.handle {
            Some(handle) => {
                handle.spawn(fut);
            }
            None => {
                tokio::spawn(fut);
            }
        }
    }

    fn ready(&self) -> Result<(), QueueError> {
        if self.handle.is_some() || tokio::runtime::Handle::try_current().is_ok() {
            Ok(())
        } else {
            Err(QueueError::NoRuntime)
        }
    }
}
