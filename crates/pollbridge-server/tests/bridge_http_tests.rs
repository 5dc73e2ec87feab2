#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use axum::http::{header, StatusCode};
use common::{body_text, get, post_json, test_app};
use pollbridge_core::Command;
use pollbridge_server::create_router;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tower::ServiceExt;

#[tokio::test(start_paused = true)]
async fn test_poll_returns_queued_commands_as_json_array() {
    let app = Arc::new(test_app());
    app.bridge
        .queue()
        .enqueue(Command::new("lua", json!({"code": "return 1"})), Duration::ZERO)
        .await
        .unwrap();

    let response = create_router(app.clone()).oneshot(get("/bridge")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let batch: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(batch, json!([{"type": "lua", "data": {"code": "return 1"}}]));
    assert_eq!(app.bridge.queue().pending(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_idle_poll_returns_empty_array_after_window() {
    let app = Arc::new(test_app());
    let started = Instant::now();

    let response = create_router(app).oneshot(get("/bridge")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "[]");
    assert!(started.elapsed() >= Duration::from_secs(20));
}

#[tokio::test]
async fn test_submit_routes_replies_to_waiters() {
    let app = Arc::new(test_app());
    let mut sub = app.bridge.router().register("lua");

    let response = create_router(app.clone())
        .oneshot(post_json(
            "/bridge",
            r#"[{"type":"lua","success":true,"message":"","result":2}]"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.is_empty());
    assert_eq!(sub.recv().await.unwrap().result, json!(2));
}

#[tokio::test]
async fn test_submit_without_waiters_still_succeeds() {
    let app = Arc::new(test_app());

    let response = create_router(app)
        .oneshot(post_json("/bridge", r#"[{"type":"nobody_waits"}]"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_malformed_batch_is_rejected_as_plain_text() {
    let app = Arc::new(test_app());
    let mut sub = app.bridge.router().register("lua");

    let response = create_router(app.clone())
        .oneshot(post_json("/bridge", r#"[{"type":"lua"}, 42]"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/plain; charset=UTF-8"
    );
    assert!(!body_text(response).await.is_empty());
    assert!(sub.try_recv().is_none());
}
