//! Data and config directory resolution with test/CLI overrides.
//!
//! Resolution order for each directory: programmatic override, environment
//! variable, platform default. Overrides are process-wide.

use std::{
    path::{Path, PathBuf},
    sync::RwLock,
};

use once_cell::sync::Lazy;

static DATA_DIR_OVERRIDE: Lazy<RwLock<Option<PathBuf>>> = Lazy::new(|| RwLock::new(None));
static CONFIG_DIR_OVERRIDE: Lazy<RwLock<Option<PathBuf>>> = Lazy::new(|| RwLock::new(None));

fn read_override(cell: &RwLock<Option<PathBuf>>) -> Option<PathBuf> {
    match cell.read() {
        Ok(guard) => guard.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

fn write_override(cell: &RwLock<Option<PathBuf>>, value: Option<PathBuf>) {
    match cell.write() {
        Ok(mut guard) => *guard = value,
        Err(poisoned) => *poisoned.into_inner() = value,
    }
}

/// The skillsync data directory (`~/.skillsync` by default).
///
/// Holds installed plugins and other machine-managed state. Skills
/// themselves live under each tool's own directories, never here.
#[must_use]
pub fn data_dir() -> PathBuf {
    if let Some(dir) = read_override(&DATA_DIR_OVERRIDE) {
        return dir;
    }
    if let Ok(dir) = std::env::var("SKILLSYNC_DATA_DIR")
        && !dir.is_empty()
    {
        return PathBuf::from(dir);
    }
    dirs_next::home_dir()
        .map(|home| home.join(".skillsync"))
        .unwrap_or_else(|| PathBuf::from(".skillsync"))
}

/// Override the data directory for this process (tests, `--data-dir`).
pub fn set_data_dir(path: impl AsRef<Path>) {
    write_override(&DATA_DIR_OVERRIDE, Some(path.as_ref().to_path_buf()));
}

/// Remove a previously set data directory override.
pub fn clear_data_dir() {
    write_override(&DATA_DIR_OVERRIDE, None);
}

/// The user-global config directory (`~/.config/skillsync` on Linux).
#[must_use]
pub fn config_dir() -> PathBuf {
    if let Some(dir) = read_override(&CONFIG_DIR_OVERRIDE) {
        return dir;
    }
    if let Ok(dir) = std::env::var("SKILLSYNC_CONFIG_DIR")
        && !dir.is_empty()
    {
        return PathBuf::from(dir);
    }
    directories::ProjectDirs::from("", "", "skillsync")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| data_dir().join("config"))
}

/// Override the config directory for this process.
pub fn set_config_dir(path: impl AsRef<Path>) {
    write_override(&CONFIG_DIR_OVERRIDE, Some(path.as_ref().to_path_buf()));
}

/// Remove a previously set config directory override.
pub fn clear_config_dir() {
    write_override(&CONFIG_DIR_OVERRIDE, None);
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn override_wins_and_clears() {
        set_data_dir("/tmp/skillsync-test-data");
        assert_eq!(data_dir(), PathBuf::from("/tmp/skillsync-test-data"));
        clear_data_dir();
        assert_ne!(data_dir(), PathBuf::from("/tmp/skillsync-test-data"));
    }

    #[test]
    fn config_override_wins_and_clears() {
        set_config_dir("/tmp/skillsync-test-config");
        assert_eq!(config_dir(), PathBuf::from("/tmp/skillsync-test-config"));
        clear_config_dir();
        assert_ne!(config_dir(), PathBuf::from("/tmp/skillsync-test-config"));
    }
}
