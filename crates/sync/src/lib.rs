//! Cross-tool orchestration: install, remove, sync, and update skills.
//!
//! The engine fans each operation out over the selected tools, treating
//! every target independently so one broken tool never blocks the rest,
//! and fires plugin hooks after each lifecycle operation. Source fetching
//! sits behind [`skillsync_fetch::ResolveSource`], so the orchestration
//! logic never cares where skill files come from.

pub mod engine;
#[cfg(feature = "file-watcher")]
pub mod watcher;

pub use engine::{
    InstallOptions, InstallResult, InstalledTarget, OutdatedSkill, RemoveResult, SkillStatus,
    SyncEngine, SyncReport, ToolStatus, UpdateReport,
};
#[cfg(feature = "file-watcher")]
pub use watcher::{SkillWatchEvent, SkillWatcher};
