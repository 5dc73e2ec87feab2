//! Outbound command queue drained by the host's long-poll
//!
//! A bounded FIFO handoff. Producers are correlated calls; the consumer is
//! whichever poll currently holds the receiver.

use crate::errors::{BridgeError, Result};
use crate::model::Command;
use std::time::Duration;
use tokio::sync::mpsc::{self, error::SendTimeoutError};
use tokio::sync::Mutex;
use tokio::time::{timeout_at, Instant};

/// Bounded, order-preserving command buffer
pub struct OutboundQueue {
    tx: mpsc::Sender<Command>,
    rx: Mutex<mpsc::Receiver<Command>>,
}

impl OutboundQueue {
    /// Create a queue holding at most `capacity` commands
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero; `BridgeConfig::validate` rejects that.
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity);
        Self {
            tx,
            rx: Mutex::new(rx),
        }
    }

    /// Hand a command to the next poll
    ///
    /// Waits up to `wait` for buffer space, then fails with
    /// `BridgeError::QueueFull`. The command is admitted at most once.
    pub async fn enqueue(&self, cmd: Command, wait: Duration) -> Result<()> {
        match self.tx.send_timeout(cmd, wait).await {
            Ok(()) => Ok(()),
            Err(SendTimeoutError::Timeout(cmd)) => Err(BridgeError::QueueFull {
                command_type: cmd.command_type,
            }),
            Err(SendTimeoutError::Closed(cmd)) => Err(BridgeError::ChannelClosed {
                command_type: cmd.command_type,
            }),
        }
    }

    /// Number of commands waiting for pickup
    pub fn pending(&self) -> usize {
        self.tx.max_capacity() - self.tx.capacity()
    }

    /// Collect one poll cycle's batch
    ///
    /// Blocks until the first command arrives or `window` elapses. Once a
    /// command is in hand the batch stays open while commands keep arriving
    /// within `settle` of each other, and closes on the first quiet `settle`
    /// period, at `max_batch` commands, or at the `window` deadline,
    /// whichever comes first. An empty batch is only returned at the deadline.
    pub async fn drain(&self, window: Duration, settle: Duration, max_batch: usize) -> Vec<Command> {
        let deadline = Instant::now() + window;
        let mut batch = Vec::new();

        // An overlapping poll waits its turn, but never past its own window
        let Ok(mut rx) = timeout_at(deadline, self.rx.lock()).await else {
            return batch;
        };

        match timeout_at(deadline, rx.recv()).await {
            Ok(Some(cmd)) => batch.push(cmd),
            _ => return batch,
        }

        while batch.len() < max_batch {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            match timeout_at((now + settle).min(deadline), rx.recv()).await {
                Ok(Some(cmd)) => batch.push(cmd),
                _ => break,
            }
        }

        batch
    }
}
