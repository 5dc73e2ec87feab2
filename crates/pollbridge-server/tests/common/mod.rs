use axum::body::{to_bytes, Body};
use axum::http::{Request, Response};
use pollbridge_core::{Bridge, BridgeConfig, Command, Reply};
use pollbridge_server::App;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// App around a default bridge with the default collaborators
#[allow(dead_code)]
pub fn test_app() -> App {
    App::new(Arc::new(Bridge::new(BridgeConfig::default()).unwrap()))
}

/// Simulated game server: long-polls forever and answers each command
/// with whatever `respond` returns
#[allow(dead_code)]
pub fn spawn_host<F>(bridge: Arc<Bridge>, respond: F) -> JoinHandle<()>
where
    F: Fn(&Command) -> Option<Reply> + Send + 'static,
{
    tokio::spawn(async move {
        loop {
            let batch = bridge.poll().await;
            let replies: Vec<Reply> = batch.iter().filter_map(&respond).collect();
            if !replies.is_empty() {
                bridge.submit(replies).await;
            }
        }
    })
}

#[allow(dead_code)]
pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[allow(dead_code)]
pub fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[allow(dead_code)]
pub async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
