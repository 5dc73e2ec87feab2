//! Core types shared across the pollbridge crates
//!
//! This crate provides foundational types used by the bridge, its error
//! facility and its logging facility:
//!
//! - **Correlation types**: RequestId, CorrelationToken
//! - **Schema constants**: Canonical field keys and event names

pub mod correlation;
pub mod schema;

pub use correlation::{CorrelationToken, RequestId};
