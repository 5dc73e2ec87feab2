//! Unattended mod updates
//!
//! Every cycle refreshes the available versions, installs pending updates
//! for mods that opted in, writes an audit entry per attempt and, if
//! anything changed, tells the host through the bridge.

use super::collaborators::{LogCategory, LogEntry, Mod};
use crate::app::App;
use crate::config::MaintenanceConfig;
use crate::lua::COMMAND_NOTIFY_MODS_CHANGED;
use pollbridge_core::errors::ExError;
use serde::de::IgnoredAny;
use std::sync::Arc;
use std::time::Duration;

const AUDIT_EVENT: &str = "mods";

/// What one cycle did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AutoUpdateReport {
    /// Names of mods updated this cycle
    pub updated: Vec<String>,
    /// Names of mods whose update failed
    pub failed: Vec<String>,
    /// Whether the host acknowledged the change notification
    pub notified: bool,
}

/// Run one auto-update cycle
///
/// A failed update is logged, audited and skipped; a failed audit insert or
/// repository read aborts the cycle. The change notification is best effort.
pub async fn check_all_mods(app: &App, notify_timeout: Duration) -> Result<AutoUpdateReport, ExError> {
    app.mod_manager.check_updates().await.map_err(|e| {
        ExError::new(e.kind())
            .with_op("check_updates")
            .with_message("update check failed")
            .with_source(e)
    })?;

    let mods = app.mod_repository.get_all().await?;
    let mut report = AutoUpdateReport::default();

    for m in mods.iter().filter(|m| m.wants_auto_update()) {
        if let Err(err) = app.mod_manager.update(m, &m.latest_version).await {
            tracing::error!(
                error = %err,
                name = %m.name,
                version = %m.version,
                latest_version = %m.latest_version,
                id = %m.id,
                "mod auto update failed"
            );
            app.log_repository
                .insert(&audit(m, "Auto-update failed for"))
                .await?;
            report.failed.push(m.name.clone());
            continue;
        }

        app.log_repository
            .insert(&audit(m, "Auto-updated the"))
            .await?;
        report.updated.push(m.name.clone());
    }

    if !report.updated.is_empty() {
        match app
            .bridge
            .execute_command::<_, IgnoredAny>(COMMAND_NOTIFY_MODS_CHANGED, &(), notify_timeout)
            .await
        {
            Ok(_) => report.notified = true,
            Err(err) => tracing::warn!(error = %err, "mods updated notification failed"),
        }
    }

    Ok(report)
}

fn audit(m: &Mod, prefix: &str) -> LogEntry {
    LogEntry::new(
        LogCategory::Ui,
        AUDIT_EVENT,
        format!(
            "{} {} '{}' ({}) to version '{}'",
            prefix, m.mod_type, m.name, m.source_type, m.latest_version
        ),
    )
}

/// Auto-update loop; runs for the life of the process
pub async fn run_mod_autoupdate(app: Arc<App>, config: MaintenanceConfig) {
    loop {
        if !app.maintenance_mode() {
            match check_all_mods(&app, config.notify_timeout()).await {
                Ok(report) if !report.updated.is_empty() || !report.failed.is_empty() => {
                    tracing::info!(
                        updated = report.updated.len(),
                        failed = report.failed.len(),
                        notified = report.notified,
                        "mod auto-update cycle finished"
                    );
                }
                Ok(_) => {}
                Err(err) => tracing::warn!(error = %err, "mod auto-update failed"),
            }
        }
        tokio::time::sleep(config.interval()).await;
    }
}
