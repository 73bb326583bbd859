use std::path::{Path, PathBuf};

use {
    skillsync_common::{Context, Error, Result},
    tracing::{debug, warn},
};

use crate::schema::SyncConfig;

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "skillsync.toml",
    "skillsync.yaml",
    "skillsync.yml",
    "skillsync.json",
];

/// Load config from the given path (any supported format).
///
/// `${ENV_VAR}` placeholders in the raw text are substituted before parsing.
pub fn load_config(path: &Path) -> Result<SyncConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `<project_dir>/skillsync.{toml,yaml,yml,json}`
/// 2. `<config_dir>/skillsync.{toml,yaml,yml,json}`
///
/// Returns `SyncConfig::default()` if no config file is found or the found
/// file fails to parse.
#[must_use]
pub fn discover_and_load(project_dir: &Path) -> SyncConfig {
    if let Some(path) = find_config_file(project_dir) {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(cfg) => return cfg,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            },
        }
    } else {
        debug!("no config file found, using defaults");
    }
    SyncConfig::default()
}

/// Find the first config file in standard locations.
fn find_config_file(project_dir: &Path) -> Option<PathBuf> {
    for name in CONFIG_FILENAMES {
        let p = project_dir.join(name);
        if p.exists() {
            return Some(p);
        }
    }

    let config_dir = crate::config_dir();
    for name in CONFIG_FILENAMES {
        let p = config_dir.join(name);
        if p.exists() {
            return Some(p);
        }
    }

    None
}

/// Serialize `config` to TOML and write it to the user-global config path.
///
/// Creates parent directories if needed. Returns the path written to.
pub fn save_config(config: &SyncConfig) -> Result<PathBuf> {
    let path = crate::config_dir().join("skillsync.toml");
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(config).context("serialize config")?;
    std::fs::write(&path, toml_str)?;
    debug!(path = %path.display(), "saved config");
    Ok(path)
}

fn parse_config(raw: &str, path: &Path) -> Result<SyncConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => toml::from_str(raw).with_context(|| format!("parse {}", path.display())),
        "yaml" | "yml" => {
            serde_yaml::from_str(raw).with_context(|| format!("parse {}", path.display()))
        },
        "json" => serde_json::from_str(raw).with_context(|| format!("parse {}", path.display())),
        _ => Err(Error::message(format!("unsupported config format: .{ext}"))),
    }
}

// ── Env substitution ────────────────────────────────────────────────────────

/// Replace `${ENV_VAR}` placeholders in config text.
///
/// Unresolvable variables are left as-is.
fn substitute_env(input: &str) -> String {
    substitute_env_with(input, |name| std::env::var(name).ok())
}

fn substitute_env_with(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && chars.peek() == Some(&'{') {
            chars.next();
            let mut var_name = String::new();
            let mut closed = false;
            for c in chars.by_ref() {
                if c == '}' {
                    closed = true;
                    break;
                }
                var_name.push(c);
            }
            if closed && !var_name.is_empty() {
                match lookup(&var_name) {
                    Some(val) => result.push_str(&val),
                    None => {
                        result.push_str("${");
                        result.push_str(&var_name);
                        result.push('}');
                    },
                }
            } else {
                result.push_str("${");
                result.push_str(&var_name);
            }
        } else {
            result.push(ch);
        }
    }

    result
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn loads_project_local_toml() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("skillsync.toml"),
            "default_tool = \"cursor\"\n",
        )
        .unwrap();

        let cfg = discover_and_load(dir.path());
        assert_eq!(cfg.default_tool.as_deref(), Some("cursor"));
    }

    #[test]
    fn yaml_and_json_parse_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let yaml = dir.path().join("skillsync.yaml");
        std::fs::write(&yaml, "default_tool: codex\n").unwrap();
        assert_eq!(
            load_config(&yaml).unwrap().default_tool.as_deref(),
            Some("codex")
        );

        let json = dir.path().join("skillsync.json");
        std::fs::write(&json, "{\"default_tool\": \"zed\"}").unwrap();
        assert_eq!(
            load_config(&json).unwrap().default_tool.as_deref(),
            Some("zed")
        );
    }

    #[test]
    fn malformed_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("skillsync.toml"), "default_tool = [broken").unwrap();

        let cfg = discover_and_load(dir.path());
        assert!(cfg.default_tool.is_none());
    }

    #[test]
    fn env_placeholders_substitute_or_stay() {
        let lookup = |name: &str| match name {
            "SKILLSYNC_TEST_URL" => Some("https://example.test".to_string()),
            _ => None,
        };
        assert_eq!(
            substitute_env_with("registry_url = \"${SKILLSYNC_TEST_URL}\"", lookup),
            "registry_url = \"https://example.test\""
        );
        assert_eq!(
            substitute_env_with("${SKILLSYNC_UNSET_XYZ}", |_| None),
            "${SKILLSYNC_UNSET_XYZ}"
        );
    }
}
