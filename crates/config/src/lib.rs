//! Configuration loading and directory resolution.
//!
//! Config files: `skillsync.toml`, `skillsync.yaml`, or `skillsync.json`,
//! searched in the project directory then `~/.config/skillsync/`.
//!
//! Supports `${ENV_VAR}` substitution in all string values.

pub mod dirs;
pub mod loader;
pub mod schema;

pub use {
    dirs::{clear_config_dir, clear_data_dir, config_dir, data_dir, set_config_dir, set_data_dir},
    loader::{discover_and_load, load_config, save_config},
    schema::{DEFAULT_REGISTRY_URL, SyncConfig},
};
