//! Serve command

use anyhow::Context;
use clap::Args;
use pollbridge_core::logging_facility;
use pollbridge_server::{build_app, serve, ServerConfig};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override the listen address, e.g. 0.0.0.0:8080
    #[arg(long)]
    pub listen: Option<String>,
}

pub fn execute(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = ServerConfig::load(args.config.as_deref())?;
    if let Some(listen) = args.listen {
        config.listen = listen;
        config.validate()?;
    }

    logging_facility::init(config.log_profile);
    tracing::info!(
        listen = %config.listen,
        maintenance_job = config.maintenance.enabled,
        "starting pollbridge"
    );

    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    runtime.block_on(async {
        let app = build_app(&config)?;
        serve(&config, app).await
    })?;
    Ok(())
}
