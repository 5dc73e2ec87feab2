//! Process-wide application state shared by handlers and jobs

use crate::jobs::{
    InMemoryLogRepository, InMemoryModRepository, LogRepository, ModManager, ModRepository,
    NoopModManager,
};
use pollbridge_core::Bridge;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub struct App {
    pub bridge: Arc<Bridge>,
    pub mod_manager: Arc<dyn ModManager>,
    pub mod_repository: Arc<dyn ModRepository>,
    pub log_repository: Arc<dyn LogRepository>,
    maintenance: AtomicBool,
}

impl App {
    /// App with the default collaborators: no installer, in-memory stores
    pub fn new(bridge: Arc<Bridge>) -> Self {
        Self {
            bridge,
            mod_manager: Arc::new(NoopModManager),
            mod_repository: Arc::new(InMemoryModRepository::default()),
            log_repository: Arc::new(InMemoryLogRepository::new()),
            maintenance: AtomicBool::new(false),
        }
    }

    pub fn with_mod_manager(mut self, manager: Arc<dyn ModManager>) -> Self {
        self.mod_manager = manager;
        self
    }

    pub fn with_mod_repository(mut self, repository: Arc<dyn ModRepository>) -> Self {
        self.mod_repository = repository;
        self
    }

    pub fn with_log_repository(mut self, repository: Arc<dyn LogRepository>) -> Self {
        self.log_repository = repository;
        self
    }

    pub fn with_maintenance_mode(self, enabled: bool) -> Self {
        self.set_maintenance_mode(enabled);
        self
    }

    /// Background jobs skip their work while this is set
    pub fn maintenance_mode(&self) -> bool {
        self.maintenance.load(Ordering::Acquire)
    }

    pub fn set_maintenance_mode(&self, enabled: bool) {
        self.maintenance.store(enabled, Ordering::Release);
    }
}
