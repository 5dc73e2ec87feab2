//! Structured logging for the bridge and the crates built on it
//!
//! Binaries call [`init`] once with the profile from their configuration;
//! libraries only emit events, mostly through the operation macros
//! [`log_op_start!`](crate::log_op_start), [`log_op_end!`](crate::log_op_end)
//! and [`log_op_error!`](crate::log_op_error). Field names come from
//! `pollbridge_core_types::schema`.
//!
//! Tests install [`init_test_capture`] instead and assert on the captured
//! events.

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
