//! Runtime seam for executing admitted tasks.

use std::future::Future;

use crate::core::QueueError;

/// Abstraction for spawning task execution on a runtime.
///
/// Every admitted queue entry runs on its own spawned future; the drain step
/// itself runs inline in whichever caller touched the lane last.
pub trait Spawn: Clone + Send + Sync + 'static {
    /// Spawn a detached future.
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static;

    /// Whether `spawn` can run a future from the calling thread right now.
    ///
    /// The queue checks this before admitting work; entries are never
    /// popped from a lane only to be lost by a spawner that cannot run them.
    fn ready(&self) -> Result<(), QueueError> {
        Ok(())
    }
}
