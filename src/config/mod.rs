//! Configuration models for the queue and its lanes.

pub mod queue;

pub use queue::{LaneConfig, QueueConfig};
