//! # paced-queue
//!
//! An in-process bounded-concurrency task queue for async workloads.
//!
//! Callers submit asynchronous units of work; the queue runs at most
//! `capacity` of them simultaneously, paces each settlement with a
//! configurable delay, deduplicates pending work by identifier, supports
//! pause/resume, and offers a drain operation that waits for full quiescence
//! and aggregates outcomes.
//!
//! ## Example
//!
//! ```rust,ignore
//! use paced_queue::config::QueueConfig;
//! use paced_queue::core::PacedQueue;
//! use std::time::Duration;
//!
//! let queue: PacedQueue<u32> = PacedQueue::new(
//!     QueueConfig::new()
//!         .with_capacity(3)
//!         .with_success_delay(Duration::from_millis(100)),
//! );
//!
//! queue.submit(|| async { Ok(fetch_page(1).await?) });
//! queue.submit(|| async { Ok(fetch_page(2).await?) });
//!
//! // Resolves once everything settled; fails with the first captured error.
//! let results = queue.drain().await?;
//! ```
//!
//! ## Semantics worth knowing
//!
//! - **Completion order**: drain results are ordered by settlement
//!   completion, not submission. The orders coincide only at capacity 1.
//! - **Dedup**: a submission whose identifier is already pending is silently
//!   discarded; the first submission wins.
//! - **Failures**: one failing task never halts the rest. Errors accumulate
//!   in settlement order and surface only through drain.
//! - **Pause**: withholds future dispatch only; in-flight tasks settle
//!   normally. Nothing cancels or times out a running task.
//!
//! This is not a distributed or persistent scheduler: no durability, no
//! multi-process coordination.

/// Core scheduling abstractions: task units, queue state machine, errors.
pub mod core;
/// Configuration models for queue capacity and pacing.
pub mod config;
/// Runtime adapters.
pub mod runtime;
/// Shared utilities.
pub mod util;

pub use crate::config::QueueConfig;
pub use crate::core::{DrainOptions, PacedQueue, TaskError, TaskResult, TaskUnit};
