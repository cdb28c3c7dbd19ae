//! # Lane Queue
//!
//! A lane-isolated command scheduler for agent workloads.
//!
//! Work is submitted to named *lanes*. Within a lane, tasks are admitted in
//! strict FIFO order up to the lane's concurrency ceiling (1 by default, so a
//! lane serializes its work). Lanes are fully independent: a slow or blocked
//! lane never delays admission in another.
//!
//! ## Key Features
//!
//! - **Lazy lanes**: any string names a lane; lanes are created on first use
//! - **Runtime-tunable concurrency**: raising a ceiling admits backlog at once,
//!   lowering it never interrupts running work
//! - **Typed results**: each call gets its own typed result channel
//! - **Wait observability**: per-call threshold and observer for long queue waits
//! - **Cancellation**: callers may stop waiting via a token or timeout, and
//!   queued work can be evicted with [`core::CommandQueue::clear_lane`]
//!
//! Non-goals: no persistence, no priorities inside a lane, no cross-lane
//! fairness, and no retries. Task errors are returned to the caller untouched.
//!
//! ## Example
//!
//! ```rust,ignore
//! use lane_queue::core::{lane, CommandQueue, EnqueueOptions};
//! use std::time::Duration;
//!
//! let queue = CommandQueue::new();
//! queue.set_lane_concurrency(lane::SUBAGENT, 3);
//!
//! let reply: String = queue
//!     .enqueue_in_lane(
//!         lane::SUBAGENT,
//!         |ctx| async move { Ok(format!("ran in {}", ctx.lane())) },
//!         EnqueueOptions::default().with_warn_after(Duration::from_millis(500)),
//!     )
//!     .await?;
//! ```
//!
//! Queues can also be built from configuration:
//!
//! ```rust,ignore
//! use lane_queue::builders::build_queue;
//! use lane_queue::config::QueueConfig;
//! use lane_queue::runtime::TokioSpawner;
//!
//! let cfg = QueueConfig::from_env()?;
//! let queue = build_queue(&cfg, TokioSpawner::default())?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core scheduling: lanes, entries, and the drain algorithm.
pub mod core;
/// Configuration models for the queue and its lanes.
pub mod config;
/// Builders to construct queues from configuration.
pub mod builders;
/// Runtime adapters and the process-wide default queue.
pub mod runtime;
/// Shared utilities.
pub mod util;

pub use crate::core::{
    lane, AppResult, CommandQueue, EnqueueOptions, LaneId, LaneStats, QueueError, QueuedTask,
    TaskContext,
};
