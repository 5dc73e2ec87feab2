//! Reply fan-out registry
//!
//! Waiters register a channel under a command type. A reply is offered to
//! every waiter of its type (broadcast); waiters registered with a
//! correlation token only accept replies carrying that token. The registry
//! lock covers map mutation and the snapshot of senders, never a send.

use crate::model::Reply;
use futures::future::join_all;
use pollbridge_core_types::CorrelationToken;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};
use std::time::Duration;
use tokio::sync::mpsc;

/// Identifies one registration for removal
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReplyHandle {
    command_type: String,
    id: u64,
}

impl ReplyHandle {
    pub fn command_type(&self) -> &str {
        &self.command_type
    }
}

struct Registration {
    id: u64,
    token: Option<CorrelationToken>,
    tx: mpsc::Sender<Reply>,
}

impl Registration {
    fn accepts(&self, reply: &Reply) -> bool {
        match &self.token {
            None => true,
            Some(token) => reply.id.as_ref() == Some(token),
        }
    }
}

/// Outcome of offering one reply to its waiters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// Waiters that took the reply
    pub delivered: usize,
    /// Waiters that were full, gone, or too slow
    pub skipped: usize,
}

impl DispatchOutcome {
    /// Nobody was registered to take it
    pub fn is_unroutable(&self) -> bool {
        self.delivered == 0 && self.skipped == 0
    }
}

/// Registry of reply channels keyed by command type
pub struct ResponseRouter {
    handlers: RwLock<HashMap<String, Vec<Registration>>>,
    next_id: AtomicU64,
    delivery_timeout: Duration,
    reply_buffer: usize,
}

impl ResponseRouter {
    pub fn new(delivery_timeout: Duration, reply_buffer: usize) -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            delivery_timeout,
            reply_buffer: reply_buffer.max(1),
        }
    }

    /// Attach a fresh reply channel for `command_type`
    ///
    /// The returned subscription deregisters itself when dropped.
    pub fn register(&self, command_type: &str) -> ReplySubscription<'_> {
        self.register_inner(command_type, None)
    }

    /// Like [`register`](Self::register) but only replies echoing `token` are accepted
    pub fn register_correlated(
        &self,
        command_type: &str,
        token: CorrelationToken,
    ) -> ReplySubscription<'_> {
        self.register_inner(command_type, Some(token))
    }

    fn register_inner(
        &self,
        command_type: &str,
        token: Option<CorrelationToken>,
    ) -> ReplySubscription<'_> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(self.reply_buffer);

        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(command_type.to_string())
            .or_default()
            .push(Registration { id, token, tx });

        ReplySubscription {
            router: self,
            handle: ReplyHandle {
                command_type: command_type.to_string(),
                id,
            },
            rx,
        }
    }

    /// Remove a registration; returns false if it was already gone
    pub fn deregister(&self, handle: &ReplyHandle) -> bool {
        let mut handlers = self
            .handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        let Some(waiters) = handlers.get_mut(&handle.command_type) else {
            return false;
        };
        let before = waiters.len();
        waiters.retain(|r| r.id != handle.id);
        let removed = waiters.len() != before;

        if waiters.is_empty() {
            handlers.remove(&handle.command_type);
        }
        removed
    }

    /// Number of live registrations for `command_type`
    pub fn waiters(&self, command_type: &str) -> usize {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(command_type)
            .map_or(0, Vec::len)
    }

    /// Offer `reply` to every matching waiter
    ///
    /// Each delivery is bounded by the delivery timeout; a waiter that cannot
    /// take the reply in time is skipped. Replies nobody waits for are dropped.
    pub async fn dispatch(&self, reply: &Reply) -> DispatchOutcome {
        let targets: Vec<mpsc::Sender<Reply>> = {
            let handlers = self
                .handlers
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            match handlers.get(&reply.command_type) {
                Some(waiters) => waiters
                    .iter()
                    .filter(|r| r.accepts(reply))
                    .map(|r| r.tx.clone())
                    .collect(),
                None => Vec::new(),
            }
        };

        if targets.is_empty() {
            tracing::debug!(command_type = %reply.command_type, "dropping unroutable reply");
            return DispatchOutcome::default();
        }

        let sends = targets
            .iter()
            .map(|tx| tx.send_timeout(reply.clone(), self.delivery_timeout));
        let results = join_all(sends).await;

        let delivered = results.iter().filter(|r| r.is_ok()).count();
        let outcome = DispatchOutcome {
            delivered,
            skipped: results.len() - delivered,
        };
        if outcome.skipped > 0 {
            tracing::debug!(
                command_type = %reply.command_type,
                skipped = outcome.skipped,
                "skipped slow or abandoned reply waiters"
            );
        }
        outcome
    }
}

/// A live registration and its receiving end
pub struct ReplySubscription<'a> {
    router: &'a ResponseRouter,
    handle: ReplyHandle,
    rx: mpsc::Receiver<Reply>,
}

impl ReplySubscription<'_> {
    pub fn handle(&self) -> &ReplyHandle {
        &self.handle
    }

    /// Wait for the next delivered reply
    ///
    /// Returns `None` only if the registration was removed underneath us.
    pub async fn recv(&mut self) -> Option<Reply> {
        self.rx.recv().await
    }

    /// Take an already delivered reply without waiting
    pub fn try_recv(&mut self) -> Option<Reply> {
        self.rx.try_recv().ok()
    }
}

impl Drop for ReplySubscription<'_> {
    fn drop(&mut self) {
        self.router.deregister(&self.handle);
    }
}
