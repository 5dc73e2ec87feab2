//! pollbridge server - HTTP surface and background jobs around the bridge
//!
//! - `GET /bridge` long-poll and `POST /bridge` reply submission for the host
//! - xban admin handlers issuing Lua commands through the bridge
//! - Mod auto-update maintenance job
//! - Layered server configuration

pub mod app;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod jobs;
pub mod lua;
pub mod routes;
pub mod server;

pub use app::App;
pub use config::{MaintenanceConfig, ServerConfig};
pub use errors::ApiError;
pub use routes::create_router;
pub use server::{build_app, serve, serve_on};
