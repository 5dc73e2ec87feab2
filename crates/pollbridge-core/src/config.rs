//! Bridge timing and capacity settings

use crate::errors::{BridgeError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timing and capacity knobs for a [`Bridge`](crate::Bridge)
///
/// Every field has a default, so a partial config file or an empty
/// environment yields the design values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Upper bound a long-poll is held open
    pub poll_window_ms: u64,
    /// Quiet period that closes a non-empty batch
    pub settle_window_ms: u64,
    /// Per-waiter bound on a single reply delivery
    pub delivery_timeout_ms: u64,
    /// Outbound queue buffer size
    pub queue_capacity: usize,
    /// How long an enqueue may wait for buffer space before `QueueFull`
    pub enqueue_timeout_ms: u64,
    /// Buffered replies per registration
    pub reply_buffer: usize,
    /// Largest batch handed to one poll
    pub max_batch: usize,
    /// Timeout used for interactive calls
    pub default_call_timeout_ms: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            poll_window_ms: 20_000,
            settle_window_ms: 100,
            delivery_timeout_ms: 10,
            queue_capacity: 100,
            enqueue_timeout_ms: 1_000,
            reply_buffer: 1,
            max_batch: 1_000,
            default_call_timeout_ms: 5_000,
        }
    }
}

impl BridgeConfig {
    pub fn poll_window(&self) -> Duration {
        Duration::from_millis(self.poll_window_ms)
    }

    pub fn settle_window(&self) -> Duration {
        Duration::from_millis(self.settle_window_ms)
    }

    pub fn delivery_timeout(&self) -> Duration {
        Duration::from_millis(self.delivery_timeout_ms)
    }

    pub fn enqueue_timeout(&self) -> Duration {
        Duration::from_millis(self.enqueue_timeout_ms)
    }

    pub fn default_call_timeout(&self) -> Duration {
        Duration::from_millis(self.default_call_timeout_ms)
    }

    /// Reject values that would make the bridge unusable
    pub fn validate(&self) -> Result<()> {
        if self.queue_capacity == 0 {
            return Err(config_error("queue_capacity must be at least 1"));
        }
        if self.reply_buffer == 0 {
            return Err(config_error("reply_buffer must be at least 1"));
        }
        if self.max_batch == 0 {
            return Err(config_error("max_batch must be at least 1"));
        }
        if self.settle_window_ms > self.poll_window_ms {
            return Err(config_error(
                "settle_window_ms must not exceed poll_window_ms",
            ));
        }
        Ok(())
    }
}

fn config_error(message: &str) -> BridgeError {
    BridgeError::Config {
        message: message.to_string(),
    }
}
