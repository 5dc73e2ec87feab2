//! xban admin endpoints
//!
//! Every handler sends one `lua` command and renders the reply result.

use crate::app::App;
use crate::errors::{invalid_input, unauthorised, ApiError};
use crate::lua::{self, LuaRequest, COMMAND_LUA};
use axum::extract::{Path, State};
use axum::{Extension, Json};
use pollbridge_core::errors::BridgeError;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

/// Authenticated admin, inserted as a request extension by the auth layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operator {
    pub username: String,
}

impl Operator {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct XBanRequest {
    pub playername: String,
    #[serde(default)]
    pub reason: String,
    /// Ban length in seconds; only used by temp bans
    #[serde(default)]
    pub time: i64,
}

async fn run_lua(app: &App, request: &LuaRequest) -> Result<Json<Value>, ApiError> {
    let timeout = app.bridge.config().default_call_timeout();
    send_lua_response(
        app.bridge
            .execute_command(COMMAND_LUA, request, timeout)
            .await,
    )
}

/// Render a Lua call outcome: the result as JSON, or the error as text
pub fn send_lua_response(result: Result<Value, BridgeError>) -> Result<Json<Value>, ApiError> {
    Ok(Json(result?))
}

fn require_operator(operator: Option<Extension<Operator>>, op: &str) -> Result<Operator, ApiError> {
    operator
        .map(|Extension(operator)| operator)
        .ok_or_else(|| unauthorised(op).into())
}

pub async fn ban_db_status(State(app): State<Arc<App>>) -> Result<Json<Value>, ApiError> {
    run_lua(&app, &LuaRequest::new(lua::BAN_DB_STATUS)).await
}

pub async fn banned_records(State(app): State<Arc<App>>) -> Result<Json<Value>, ApiError> {
    run_lua(&app, &LuaRequest::new(lua::BANNED_RECORDS)).await
}

impl XBanRequest {
    /// Reject requests that name no player
    fn validate(&self, op: &str) -> Result<(), ApiError> {
        if self.playername.trim().is_empty() {
            return Err(invalid_input(op, "playername is required").into());
        }
        Ok(())
    }
}

pub async fn ban_record(
    State(app): State<Arc<App>>,
    Path(playername): Path<String>,
) -> Result<Json<Value>, ApiError> {
    run_lua(&app, &lua::find_entry(&playername)).await
}

pub async fn ban_player(
    State(app): State<Arc<App>>,
    operator: Option<Extension<Operator>>,
    Json(req): Json<XBanRequest>,
) -> Result<Json<Value>, ApiError> {
    let operator = require_operator(operator, "ban_player")?;
    req.validate("ban_player")?;
    let request = lua::ban_player(&req.playername, &operator.username, None, &req.reason);
    run_lua(&app, &request).await
}

pub async fn temp_ban_player(
    State(app): State<Arc<App>>,
    operator: Option<Extension<Operator>>,
    Json(req): Json<XBanRequest>,
) -> Result<Json<Value>, ApiError> {
    let operator = require_operator(operator, "temp_ban_player")?;
    req.validate("temp_ban_player")?;
    let request = lua::ban_player(
        &req.playername,
        &operator.username,
        Some(req.time),
        &req.reason,
    );
    run_lua(&app, &request).await
}

pub async fn unban_player(
    State(app): State<Arc<App>>,
    operator: Option<Extension<Operator>>,
    Json(req): Json<XBanRequest>,
) -> Result<Json<Value>, ApiError> {
    let operator = require_operator(operator, "unban_player")?;
    req.validate("unban_player")?;
    run_lua(&app, &lua::unban_player(&req.playername, &operator.username)).await
}

pub async fn cleanup_ban_db(State(app): State<Arc<App>>) -> Result<Json<Value>, ApiError> {
    run_lua(&app, &LuaRequest::new(lua::CLEANUP_BAN_DB)).await
}
