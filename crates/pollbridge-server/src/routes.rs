use crate::app::App;
use crate::handlers::{bridge, xban};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

pub fn create_router(app: Arc<App>) -> Router {
    Router::new()
        .route("/bridge", get(bridge::poll).post(bridge::submit))
        .route("/api/xban/status", get(xban::ban_db_status))
        .route("/api/xban/records", get(xban::banned_records))
        .route("/api/xban/records/:playername", get(xban::ban_record))
        .route("/api/xban/ban", post(xban::ban_player))
        .route("/api/xban/tempban", post(xban::temp_ban_player))
        .route("/api/xban/unban", post(xban::unban_player))
        .route("/api/xban/cleanup", post(xban::cleanup_ban_db))
        .with_state(app)
}
