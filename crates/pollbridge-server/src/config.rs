//! Layered server configuration
//!
//! Sources, later ones winning: built-in defaults, an optional TOML file,
//! then `POLLBRIDGE__*` environment variables (`__` separates nesting
//! levels, e.g. `POLLBRIDGE__BRIDGE__POLL_WINDOW_MS=5000`).

use crate::errors::{config_error, Result};
use pollbridge_core::logging_facility::Profile;
use pollbridge_core::BridgeConfig;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

const ENV_PREFIX: &str = "POLLBRIDGE";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen: String,
    pub log_profile: Profile,
    /// Initial value of the process-wide maintenance flag
    pub maintenance_mode: bool,
    pub bridge: BridgeConfig,
    pub maintenance: MaintenanceConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:8080".to_string(),
            log_profile: Profile::default(),
            maintenance_mode: false,
            bridge: BridgeConfig::default(),
            maintenance: MaintenanceConfig::default(),
        }
    }
}

/// Mod auto-update job settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaintenanceConfig {
    pub enabled: bool,
    pub interval_secs: u64,
    pub notify_timeout_ms: u64,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 30 * 60,
            notify_timeout_ms: 5_000,
        }
    }
}

impl MaintenanceConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn notify_timeout(&self) -> Duration {
        Duration::from_millis(self.notify_timeout_ms)
    }
}

impl ServerConfig {
    /// Load defaults, then `path` (required when given), then the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let loaded: ServerConfig = builder
            .build()
            .and_then(config::Config::try_deserialize)
            .map_err(config_error)?;
        loaded.validate()?;
        Ok(loaded)
    }

    pub fn validate(&self) -> Result<()> {
        self.listen_addr()?;
        self.bridge.validate().map_err(config_error)?;
        if self.maintenance.interval_secs == 0 {
            return Err(config_error("maintenance.interval_secs must be at least 1"));
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen
            .parse()
            .map_err(|e| config_error(format!("invalid listen address '{}': {}", self.listen, e)))
    }
}
