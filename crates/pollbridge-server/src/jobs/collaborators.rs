//! Collaborator interfaces consumed by the maintenance job
//!
//! Persistence and mod installation live outside this crate; the job only
//! needs these seams. The in-memory and noop implementations are the
//! defaults wired by the binary.

use crate::errors::unavailable;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pollbridge_core::errors::ExError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Mutex, PoisonError, RwLock};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModType {
    Mod,
    Game,
    #[serde(rename = "txp")]
    TexturePack,
}

impl fmt::Display for ModType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModType::Mod => write!(f, "mod"),
            ModType::Game => write!(f, "game"),
            ModType::TexturePack => write!(f, "txp"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    ContentDb,
    Git,
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceType::ContentDb => write!(f, "contentdb"),
            SourceType::Git => write!(f, "git"),
        }
    }
}

/// An installed extension tracked for updates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mod {
    pub id: String,
    pub name: String,
    pub mod_type: ModType,
    pub source_type: SourceType,
    pub version: String,
    pub latest_version: String,
    pub auto_update: bool,
}

impl Mod {
    /// An update is pending and the mod opted in to applying it unattended
    pub fn wants_auto_update(&self) -> bool {
        self.auto_update && self.version != self.latest_version
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogCategory {
    Ui,
    Minetest,
}

/// Audit log entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub category: LogCategory,
    pub event: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl LogEntry {
    pub fn new(category: LogCategory, event: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            category,
            event: event.into(),
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Checks for and installs mod updates
#[async_trait]
pub trait ModManager: Send + Sync {
    /// Refresh `latest_version` for every tracked mod
    async fn check_updates(&self) -> Result<(), ExError>;

    /// Install `version` of `m`
    async fn update(&self, m: &Mod, version: &str) -> Result<(), ExError>;
}

#[async_trait]
pub trait ModRepository: Send + Sync {
    async fn get_all(&self) -> Result<Vec<Mod>, ExError>;
}

#[async_trait]
pub trait LogRepository: Send + Sync {
    async fn insert(&self, entry: &LogEntry) -> Result<(), ExError>;
}

/// Mod manager for processes without an installer: never finds updates
/// and refuses to install.
pub struct NoopModManager;

#[async_trait]
impl ModManager for NoopModManager {
    async fn check_updates(&self) -> Result<(), ExError> {
        Ok(())
    }

    async fn update(&self, m: &Mod, _version: &str) -> Result<(), ExError> {
        Err(unavailable(
            "update_mod",
            &format!("No mod manager configured, cannot update '{}'", m.name),
        ))
    }
}

#[derive(Default)]
pub struct InMemoryModRepository {
    mods: RwLock<Vec<Mod>>,
}

impl InMemoryModRepository {
    pub fn new(mods: Vec<Mod>) -> Self {
        Self {
            mods: RwLock::new(mods),
        }
    }

    /// Insert or replace by id
    pub fn upsert(&self, m: Mod) {
        let mut mods = self.mods.write().unwrap_or_else(PoisonError::into_inner);
        match mods.iter_mut().find(|existing| existing.id == m.id) {
            Some(existing) => *existing = m,
            None => mods.push(m),
        }
    }
}

#[async_trait]
impl ModRepository for InMemoryModRepository {
    async fn get_all(&self) -> Result<Vec<Mod>, ExError> {
        Ok(self
            .mods
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }
}

#[derive(Default)]
pub struct InMemoryLogRepository {
    entries: Mutex<Vec<LogEntry>>,
}

impl InMemoryLogRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl LogRepository for InMemoryLogRepository {
    async fn insert(&self, entry: &LogEntry) -> Result<(), ExError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pollbridge_core::errors::ExErrorKind;

    fn sample(version: &str, latest: &str, auto_update: bool) -> Mod {
        Mod {
            id: "m1".into(),
            name: "mesecons".into(),
            mod_type: ModType::Mod,
            source_type: SourceType::ContentDb,
            version: version.into(),
            latest_version: latest.into(),
            auto_update,
        }
    }

    #[test]
    fn test_wants_auto_update() {
        assert!(sample("1", "2", true).wants_auto_update());
        assert!(!sample("1", "2", false).wants_auto_update());
        assert!(!sample("2", "2", true).wants_auto_update());
    }

    #[tokio::test]
    async fn test_noop_manager_refuses_updates() {
        let err = NoopModManager
            .update(&sample("1", "2", true), "2")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::ExternalService);
    }

    #[tokio::test]
    async fn test_in_memory_repository_upsert() {
        let repo = InMemoryModRepository::new(vec![sample("1", "2", true)]);
        repo.upsert(sample("2", "2", true));

        let mods = repo.get_all().await.unwrap();
        assert_eq!(mods.len(), 1);
        assert_eq!(mods[0].version, "2");
    }
}
