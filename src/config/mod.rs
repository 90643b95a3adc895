//! Configuration models for queue capacity and pacing.

pub mod queue;

pub use queue::{QueueConfig, QueueConfigModel};
