use pollbridge_core::{Bridge, BridgeConfig, Command, Reply};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Bridge with design defaults
#[allow(dead_code)]
pub fn new_bridge() -> Arc<Bridge> {
    Arc::new(Bridge::new(BridgeConfig::default()).unwrap())
}

/// Bridge with a tweaked configuration
#[allow(dead_code)]
pub fn bridge_with(config: BridgeConfig) -> Arc<Bridge> {
    Arc::new(Bridge::new(config).unwrap())
}

/// Simulated remote host: long-polls forever and answers each command
/// with whatever `respond` returns (or nothing, for `None`)
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
