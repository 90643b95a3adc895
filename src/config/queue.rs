//! Queue configuration: capacity and pacing intervals.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Capacity and pacing settings for a queue.
///
/// `error_delay` and `poll_interval` default to `success_delay` when not set
/// explicitly, so a single delay value paces successes, failures, and the
/// saturation/drain polling alike.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    capacity: u32,
    success_delay: Duration,
    error_delay: Option<Duration>,
    poll_interval: Option<Duration>,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            capacity: 1,
            success_delay: Duration::ZERO,
            error_delay: None,
            poll_interval: None,
        }
    }
}

impl QueueConfig {
    /// Start from the defaults: capacity 1, all delays zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of concurrently running tasks.
    #[must_use]
    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the pacing delay applied after a successful settlement.
    #[must_use]
    pub fn with_success_delay(mut self, delay: Duration) -> Self {
        self.success_delay = delay;
        self
    }

    /// Set the pacing delay applied after a failed settlement.
    #[must_use]
    pub fn with_error_delay(mut self, delay: Duration) -> Self {
        self.error_delay = Some(delay);
        self
    }

    /// Set the interval used when polling for free capacity or quiescence.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    /// Maximum number of concurrently running tasks.
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Pacing delay after a successful settlement.
    pub fn success_delay(&self) -> Duration {
        self.success_delay
    }

    /// Pacing delay after a failed settlement.
    pub fn error_delay(&self) -> Duration {
        self.error_delay.unwrap_or(self.success_delay)
    }

    /// Interval for saturation and quiescence polling.
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval.unwrap_or(self.success_delay)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.capacity == 0 {
            return Err("capacity must be greater than 0".into());
        }
        Ok(())
    }
}

/// Serializable form of [`QueueConfig`] with millisecond delay fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfigModel {
    /// Maximum concurrently running tasks.
    pub capacity: u32,
    /// Pacing delay after success, in milliseconds.
    #[serde(default)]
    pub success_delay_ms: u64,
    /// Pacing delay after failure, in milliseconds. Defaults to `success_delay_ms`.
    #[serde(default)]
    pub error_delay_ms: Option<u64>,
    /// Polling interval, in milliseconds. Defaults to `success_delay_ms`.
    #[serde(default)]
    pub poll_interval_ms: Option<u64>,
}

impl QueueConfigModel {
    /// Parse a configuration from a JSON string and validate it.
    pub fn from_json_str(input: &str) -> Result<QueueConfig, String> {
        let model: Self =
            serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        model.into_config()
    }

    /// Convert into a validated [`QueueConfig`].
    pub fn into_config(self) -> Result<QueueConfig, String> {
        let config = QueueConfig {
            capacity: self.capacity,
            success_delay: Duration::from_millis(self.success_delay_ms),
            error_delay: self.error_delay_ms.map(Duration::from_millis),
            poll_interval: self.poll_interval_ms.map(Duration::from_millis),
        };
        config.validate()?;
        Ok(config)
    }
}
