use std::path::PathBuf;

use {
    serde::{Deserialize, Serialize},
    skillsync_tools::Scope,
};

/// Root configuration for the `skillsync` CLI.
///
/// Everything is optional; an absent config file behaves like
/// `SyncConfig::default()`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Tool id used when `--tool` is omitted and no tool is detected.
    pub default_tool: Option<String>,
    /// Scope used when `--scope` is omitted.
    pub default_scope: Scope,
    /// Base URL of the skill registry index.
    pub registry_url: Option<String>,
    /// Plugins root. Defaults to `<data_dir>/plugins`.
    pub plugins_dir: Option<PathBuf>,
}

/// Registry index URL used when the config does not set one.
pub const DEFAULT_REGISTRY_URL: &str = "https://registry.skillsync.dev";

impl SyncConfig {
    /// Effective registry base URL.
    #[must_use]
    pub fn registry_url(&self) -> &str {
        self.registry_url.as_deref().unwrap_or(DEFAULT_REGISTRY_URL)
    }

    /// Effective plugins root directory.
    #[must_use]
    pub fn plugins_root(&self) -> PathBuf {
        self.plugins_dir
            .clone()
            .unwrap_or_else(|| crate::data_dir().join("plugins"))
    }
}
