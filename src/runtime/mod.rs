//! Runtime adapters and the process-wide default queue.

pub mod global;
pub mod tokio_spawner;

pub use global::{default_queue, enqueue, enqueue_in_lane};
pub use tokio_spawner::TokioSpawner;
