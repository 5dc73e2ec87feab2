//! Process wiring: build the shared state, bind, and serve until shutdown

use crate::app::App;
use crate::config::{MaintenanceConfig, ServerConfig};
use crate::errors::{bind_error, config_error, io_error, Result};
use crate::jobs::run_mod_autoupdate;
use crate::routes::create_router;
use pollbridge_core::Bridge;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Build the application state described by `config`
pub fn build_app(config: &ServerConfig) -> Result<Arc<App>> {
    let bridge = Bridge::new(config.bridge.clone()).map_err(config_error)?;
    let app = App::new(Arc::new(bridge)).with_maintenance_mode(config.maintenance_mode);
    Ok(Arc::new(app))
}

/// Bind the configured address and serve until Ctrl-C
pub async fn serve(config: &ServerConfig, app: Arc<App>) -> Result<()> {
    let addr = config.listen_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| bind_error(&config.listen, e))?;

    serve_on(listener, app, config.maintenance.clone(), shutdown_signal()).await
}

/// Serve on an already bound listener until `shutdown` resolves
///
/// Starts the maintenance job when enabled; it is aborted once the server
/// stops.
pub async fn serve_on<F>(
    listener: TcpListener,
    app: Arc<App>,
    maintenance: MaintenanceConfig,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let local_addr = listener.local_addr().map_err(|e| io_error("local_addr", e))?;

    let job = if maintenance.enabled {
        Some(tokio::spawn(run_mod_autoupdate(Arc::clone(&app), maintenance)))
    } else {
        None
    };

    tracing::info!(addr = %local_addr, "pollbridge listening");
    let result = axum::serve(listener, create_router(app))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| io_error("serve", e));

    if let Some(job) = job {
        job.abort();
    }
    tracing::info!("pollbridge stopped");
    result
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
