//! Core scheduling: lanes, queue entries, and the drain algorithm.

pub mod command_queue;
pub mod entry;
pub mod error;
pub mod lane;
mod registry;
pub mod spawn;
pub mod stats;

pub use command_queue::CommandQueue;
pub use entry::{EnqueueOptions, QueuedTask, TaskContext, WaitObserver, DEFAULT_WARN_AFTER};
pub use error::{AppResult, QueueError};
pub use lane::LaneId;
pub use spawn::Spawn;
pub use stats::LaneStats;
