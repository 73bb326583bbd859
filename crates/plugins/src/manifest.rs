//! `plugin.json` manifest parsing.
//!
//! Every plugin directory carries a `plugin.json` naming at minimum `name`,
//! `version`, `type`, and `main`:
//!
//! ```json
//! {
//!   "name": "slack-notify",
//!   "version": "1.2.0",
//!   "description": "Post install events to Slack",
//!   "type": "hook",
//!   "main": "notify.sh",
//!   "config": { "events": ["post-install"], "timeout": 5 }
//! }
//! ```
//!
//! `config` is free-form JSON. For hook plugins it carries the subscribed
//! event names plus optional `timeout` (seconds) and `env` entries.

use std::{
    collections::HashMap,
    fmt,
    path::{Path, PathBuf},
    time::Duration,
};

use {
    serde::{Deserialize, Serialize},
    serde_json::Value,
    tracing::warn,
};

use skillsync_common::{Error, Result};

use crate::hooks::HookEvent;

/// Manifest file expected in every plugin directory.
pub const PLUGIN_MANIFEST_FILENAME: &str = "plugin.json";

/// Seconds a hook subprocess may run before it is killed, unless the
/// plugin's `config.timeout` overrides it.
pub const DEFAULT_HOOK_TIMEOUT_SECS: u64 = 10;

// ── PluginKind ──────────────────────────────────────────────────────────────

/// What a plugin extends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PluginKind {
    Command,
    IdeAdapter,
    Hook,
}

impl fmt::Display for PluginKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Command => write!(f, "command"),
            Self::IdeAdapter => write!(f, "ide-adapter"),
            Self::Hook => write!(f, "hook"),
        }
    }
}

// ── PluginManifest ──────────────────────────────────────────────────────────

/// Parsed contents of a `plugin.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginManifest {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub kind: PluginKind,
    /// Entry point, relative to the plugin directory.
    pub main: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
}

impl PluginManifest {
    /// Events a hook plugin subscribes to, from `config.events`.
    ///
    /// Unrecognized event names are logged and dropped rather than failing
    /// the whole plugin.
    #[must_use]
    pub fn hook_events(&self) -> Vec<HookEvent> {
        let Some(items) = self
            .config
            .as_ref()
            .and_then(|c| c.get("events"))
            .and_then(Value::as_array)
        else {
            return Vec::new();
        };

        let mut events = Vec::new();
        for item in items {
            match item.as_str().and_then(HookEvent::from_name) {
                Some(event) => events.push(event),
                None => warn!(plugin = %self.name, event = %item, "unknown hook event name"),
            }
        }
        events
    }

    /// Subprocess timeout for hook plugins, from `config.timeout` (seconds).
    #[must_use]
    pub fn hook_timeout(&self) -> Duration {
        let secs = self
            .config
            .as_ref()
            .and_then(|c| c.get("timeout"))
            .and_then(Value::as_u64)
            .unwrap_or(DEFAULT_HOOK_TIMEOUT_SECS);
        Duration::from_secs(secs)
    }

    /// Extra environment variables for the hook subprocess, from `config.env`.
    #[must_use]
    pub fn hook_env(&self) -> HashMap<String, String> {
        let Some(map) = self
            .config
            .as_ref()
            .and_then(|c| c.get("env"))
            .and_then(Value::as_object)
        else {
            return HashMap::new();
        };

        map.iter()
            .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
            .collect()
    }
}

// ── Plugin ──────────────────────────────────────────────────────────────────

/// A plugin loaded from disk: its manifest plus the directory it lives in.
#[derive(Debug, Clone)]
pub struct Plugin {
    pub manifest: PluginManifest,
    /// Plugin directory root (the directory containing `plugin.json`).
    pub path: PathBuf,
}

impl Plugin {
    /// Absolute path of the plugin's entry point.
    #[must_use]
    pub fn entry_point(&self) -> PathBuf {
        self.path.join(&self.manifest.main)
    }
}

/// Read and validate the `plugin.json` inside `dir`.
pub fn read_manifest(dir: &Path) -> Result<PluginManifest> {
    let manifest_path = dir.join(PLUGIN_MANIFEST_FILENAME);
    let raw = std::fs::read_to_string(&manifest_path).map_err(|e| {
        Error::plugin_invalid(dir, format!("missing {PLUGIN_MANIFEST_FILENAME}: {e}"))
    })?;
    let manifest: PluginManifest =
        serde_json::from_str(&raw).map_err(|e| Error::plugin_invalid(dir, e))?;

    if manifest.name.trim().is_empty() {
        return Err(Error::plugin_invalid(dir, "empty plugin name"));
    }
    if manifest.main.trim().is_empty() {
        return Err(Error::plugin_invalid(dir, "empty entry point"));
    }
    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest_from(json: &str) -> PluginManifest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn parse_full_manifest() {
        let m = manifest_from(
            r#"{
                "name": "slack-notify",
                "version": "1.2.0",
                "description": "Post install events to Slack",
                "type": "hook",
                "main": "notify.sh",
                "config": { "events": ["post-install", "post-remove"], "timeout": 5 }
            }"#,
        );
        assert_eq!(m.name, "slack-notify");
        assert_eq!(m.kind, PluginKind::Hook);
        assert_eq!(
            m.hook_events(),
            vec![HookEvent::PostInstall, HookEvent::PostRemove]
        );
        assert_eq!(m.hook_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn parse_minimal_manifest_defaults() {
        let m = manifest_from(
            r#"{"name": "fmt", "version": "0.1.0", "type": "command", "main": "fmt.sh"}"#,
        );
        assert_eq!(m.description, "");
        assert!(m.config.is_none());
        assert!(m.hook_events().is_empty());
        assert_eq!(m.hook_timeout(), Duration::from_secs(DEFAULT_HOOK_TIMEOUT_SECS));
        assert!(m.hook_env().is_empty());
    }

    #[test]
    fn missing_main_is_rejected() {
        let res: std::result::Result<PluginManifest, _> =
            serde_json::from_str(r#"{"name": "x", "version": "1.0.0", "type": "hook"}"#);
        assert!(res.is_err());
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let res: std::result::Result<PluginManifest, _> = serde_json::from_str(
            r#"{"name": "x", "version": "1.0.0", "type": "theme", "main": "x.sh"}"#,
        );
        assert!(res.is_err());
    }

    #[test]
    fn unknown_event_names_are_dropped() {
        let m = manifest_from(
            r#"{
                "name": "x", "version": "1.0.0", "type": "hook", "main": "x.sh",
                "config": { "events": ["post-install", "on-boot"] }
            }"#,
        );
        assert_eq!(m.hook_events(), vec![HookEvent::PostInstall]);
    }

    #[test]
    fn hook_env_extracts_string_values() {
        let m = manifest_from(
            r#"{
                "name": "x", "version": "1.0.0", "type": "hook", "main": "x.sh",
                "config": { "env": { "WEBHOOK_URL": "https://example.test", "RETRIES": 3 } }
            }"#,
        );
        let env = m.hook_env();
        assert_eq!(env.get("WEBHOOK_URL").map(String::as_str), Some("https://example.test"));
        assert!(!env.contains_key("RETRIES"));
    }

    #[test]
    fn read_manifest_rejects_bad_directories() {
        let tmp = tempfile::tempdir().unwrap();

        let err = read_manifest(tmp.path()).unwrap_err();
        assert!(matches!(err, Error::PluginInvalid { .. }));

        std::fs::write(tmp.path().join(PLUGIN_MANIFEST_FILENAME), "not json").unwrap();
        let err = read_manifest(tmp.path()).unwrap_err();
        assert!(matches!(err, Error::PluginInvalid { .. }));
    }

    #[test]
    fn read_manifest_rejects_blank_fields() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join(PLUGIN_MANIFEST_FILENAME),
            r#"{"name": "  ", "version": "1.0.0", "type": "hook", "main": "x.sh"}"#,
        )
        .unwrap();
        let err = read_manifest(tmp.path()).unwrap_err();
        assert!(err.to_string().contains("empty plugin name"));
    }

    #[test]
    fn entry_point_joins_plugin_dir() {
        let plugin = Plugin {
            manifest: manifest_from(
                r#"{"name": "x", "version": "1.0.0", "type": "hook", "main": "hooks/run.sh"}"#,
            ),
            path: PathBuf::from("/plugins/x"),
        };
        assert_eq!(plugin.entry_point(), PathBuf::from("/plugins/x/hooks/run.sh"));
    }

    #[test]
    fn kind_display_matches_wire_names() {
        assert_eq!(PluginKind::IdeAdapter.to_string(), "ide-adapter");
        assert_eq!(PluginKind::Hook.to_string(), "hook");
    }
}
