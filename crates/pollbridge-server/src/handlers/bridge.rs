//! Host-facing endpoints
//!
//! The remote host drives both: it long-polls `GET /bridge` for commands
//! and posts reply batches to `POST /bridge`.

use crate::app::App;
use crate::errors::ApiError;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use pollbridge_core::Command;
use std::sync::Arc;

/// Hold the request open until commands are available or the poll window ends
pub async fn poll(State(app): State<Arc<App>>) -> Json<Vec<Command>> {
    Json(app.bridge.poll().await)
}

/// Accept a JSON array of replies; a malformed body rejects the whole batch
pub async fn submit(State(app): State<Arc<App>>, body: Bytes) -> Result<StatusCode, ApiError> {
    let summary = app.bridge.submit_raw(&body).await?;
    if summary.unroutable > 0 {
        tracing::debug!(
            unroutable = summary.unroutable,
            "replies arrived with no waiting caller"
        );
    }
    Ok(StatusCode::OK)
}
