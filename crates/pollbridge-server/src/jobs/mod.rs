//! Background jobs
//!
//! Each job is a single long-lived task that sleeps on a fixed interval,
//! skips its work while the process is in maintenance mode, and logs
//! failures instead of terminating.

pub mod collaborators;
pub mod mod_autoupdate;

pub use collaborators::{
    InMemoryLogRepository, InMemoryModRepository, LogCategory, LogEntry, LogRepository, Mod,
    ModManager, ModRepository, ModType, NoopModManager, SourceType,
};
pub use mod_autoupdate::{check_all_mods, run_mod_autoupdate, AutoUpdateReport};
