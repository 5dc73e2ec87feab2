//! Correlated calls over the pull-based host transport
//!
//! The host cannot be reached directly. A call registers a reply channel,
//! queues its command, and waits; the host picks the command up on its next
//! long-poll and later submits the reply, which the router fans back out.

use crate::config::BridgeConfig;
use crate::errors::{BridgeError, ExError, Result};
use crate::model::{Command, Reply};
use crate::queue::OutboundQueue;
use crate::router::{ReplySubscription, ResponseRouter};
use crate::{log_op_end, log_op_error, log_op_start};
use pollbridge_core_types::{CorrelationToken, RequestId};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tokio::time::Instant;

const OP_EXECUTE: &str = "execute_command";
const OP_POLL: &str = "poll";
const OP_SUBMIT: &str = "submit";

/// Per-batch fan-out totals returned by [`Bridge::submit`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubmitSummary {
    pub replies: usize,
    pub delivered: usize,
    pub skipped: usize,
    pub unroutable: usize,
}

/// The command bridge shared by request handlers, background jobs and the
/// host-facing endpoints
pub struct Bridge {
    queue: OutboundQueue,
    router: ResponseRouter,
    config: BridgeConfig,
}

impl Bridge {
    /// Build a bridge from a validated configuration
    pub fn new(config: BridgeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            queue: OutboundQueue::new(config.queue_capacity),
            router: ResponseRouter::new(config.delivery_timeout(), config.reply_buffer),
            config,
        })
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn queue(&self) -> &OutboundQueue {
        &self.queue
    }

    pub fn router(&self) -> &ResponseRouter {
        &self.router
    }

    /// Run a command on the host and wait for its reply
    ///
    /// Replies are matched on `command_type` alone: when several calls of
    /// the same type are in flight, each of them sees every reply of that
    /// type. Use [`execute_correlated`](Self::execute_correlated) when that
    /// is not acceptable.
    ///
    /// # Errors
    ///
    /// - `Timeout` if no reply arrives within `timeout`
    /// - `RemoteExecution` if the host reports failure
    /// - `QueueFull` if the command could not be queued
    /// - `Encode` / `Decode` if the request or result does not (de)serialize
    pub async fn execute_command<Req, Resp>(
        &self,
        command_type: &str,
        request: &Req,
        timeout: Duration,
    ) -> Result<Resp>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let command = Command::new(command_type, encode(command_type, request)?);
        let subscription = self.router.register(command_type);
        self.call(command, subscription, timeout).await
    }

    /// Like [`execute_command`](Self::execute_command), but the command
    /// carries a fresh correlation token and only the reply echoing that
    /// token completes the call
    pub async fn execute_correlated<Req, Resp>(
        &self,
        command_type: &str,
        request: &Req,
        timeout: Duration,
    ) -> Result<Resp>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let token = CorrelationToken::new();
        let command =
            Command::new(command_type, encode(command_type, request)?).with_token(token.clone());
        let subscription = self.router.register_correlated(command_type, token);
        self.call(command, subscription, timeout).await
    }

    async fn call<Resp: DeserializeOwned>(
        &self,
        command: Command,
        mut subscription: ReplySubscription<'_>,
        timeout: Duration,
    ) -> Result<Resp> {
        let request_id = RequestId::new();
        let command_type = command.command_type.clone();
        let start = Instant::now();
        log_op_start!(
            OP_EXECUTE,
            command_type = %command_type,
            request_id = %request_id,
            correlated = command.id.is_some(),
        );

        // Registered before enqueue so a fast host cannot beat us to it;
        // every exit below drops the subscription and deregisters.
        // Queueing and waiting share one deadline.
        let result = async {
            let enqueue_wait = self.config.enqueue_timeout().min(timeout);
            self.queue.enqueue(command, enqueue_wait).await?;

            let remaining = timeout.saturating_sub(start.elapsed());
            match tokio::time::timeout(remaining, subscription.recv()).await {
                Ok(Some(reply)) => decode_reply(reply),
                Ok(None) => Err(BridgeError::ChannelClosed {
                    command_type: command_type.clone(),
                }),
                Err(_) => Err(BridgeError::Timeout {
                    command_type: command_type.clone(),
                    timeout_ms: millis(timeout),
                }),
            }
        }
        .await;
        drop(subscription);

        let duration_ms = millis(start.elapsed());
        match &result {
            Ok(_) => log_op_end!(
                OP_EXECUTE,
                duration_ms = duration_ms,
                command_type = %command_type,
                request_id = %request_id,
            ),
            Err(err) => log_op_error!(
                OP_EXECUTE,
                ExError::from(err).with_request_id(request_id),
                duration_ms = duration_ms,
                command_type = %command_type,
            ),
        }
        result
    }

    /// Long-poll: hand the host everything queued within one poll cycle
    ///
    /// Holds for up to the configured poll window; an empty batch means the
    /// window elapsed with nothing to do.
    pub async fn poll(&self) -> Vec<Command> {
        let start = Instant::now();
        let batch = self
            .queue
            .drain(
                self.config.poll_window(),
                self.config.settle_window(),
                self.config.max_batch,
            )
            .await;

        tracing::debug!(
            op = OP_POLL,
            batch_len = batch.len(),
            duration_ms = millis(start.elapsed()),
            "poll cycle finished"
        );
        batch
    }

    /// Route a batch of host replies to their waiters
    ///
    /// Never fails: replies nobody waits for are dropped and slow waiters
    /// are skipped.
    pub async fn submit(&self, replies: Vec<Reply>) -> SubmitSummary {
        let mut summary = SubmitSummary {
            replies: replies.len(),
            ..SubmitSummary::default()
        };

        for reply in &replies {
            let outcome = self.router.dispatch(reply).await;
            summary.delivered += outcome.delivered;
            summary.skipped += outcome.skipped;
            if outcome.is_unroutable() {
                summary.unroutable += 1;
            }
        }

        tracing::debug!(
            op = OP_SUBMIT,
            replies = summary.replies,
            delivered = summary.delivered,
            skipped = summary.skipped,
            unroutable = summary.unroutable,
            "reply batch dispatched"
        );
        summary
    }

    /// Parse a raw reply batch, then [`submit`](Self::submit) it
    ///
    /// The whole batch is rejected if any element is malformed; nothing is
    /// dispatched in that case.
    pub async fn submit_raw(&self, body: &[u8]) -> Result<SubmitSummary> {
        let replies: Vec<Reply> =
            serde_json::from_slice(body).map_err(|e| BridgeError::MalformedBatch {
                message: e.to_string(),
            })?;
        Ok(self.submit(replies).await)
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn encode<Req: Serialize + ?Sized>(command_type: &str, request: &Req) -> Result<serde_json::Value> {
    serde_json::to_value(request).map_err(|e| BridgeError::Encode {
        command_type: command_type.to_string(),
        message: e.to_string(),
    })
}

fn decode_reply<Resp: DeserializeOwned>(reply: Reply) -> Result<Resp> {
    if !reply.success {
        return Err(BridgeError::RemoteExecution {
            command_type: reply.command_type,
            message: reply.message,
        });
    }
    serde_json::from_value(reply.result).map_err(|e| BridgeError::Decode {
        command_type: reply.command_type,
        message: e.to_string(),
    })
}
