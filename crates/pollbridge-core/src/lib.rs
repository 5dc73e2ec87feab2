//! pollbridge core - command bridge to a polling remote host
//!
//! The remote host never accepts inbound connections; it long-polls for
//! work and posts results back. This crate turns that into call/response:
//! - Outbound queue drained by the host's long-poll in micro-batches
//! - Response router fanning replies out to waiters by command type
//! - `Bridge::execute_command`, a bounded-wait correlated call
//! - Structured error facility and logging facility shared by the workspace

pub mod bridge;
pub mod config;
pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod queue;
pub mod router;

pub use pollbridge_core_types as types;

#[doc(hidden)]
pub use tracing as __tracing;

// Re-export commonly used types
pub use bridge::{Bridge, SubmitSummary};
pub use config::BridgeConfig;
pub use errors::{BridgeError, ExError, ExErrorKind, Result};
pub use model::{Command, Reply};
pub use queue::OutboundQueue;
pub use router::{DispatchOutcome, ReplyHandle, ReplySubscription, ResponseRouter};
