use std::path::Path;

use serde::{Deserialize, Serialize};
use skillsync_common::{Context, Error, Result};

/// Provenance sidecar filename, one per installed skill directory.
pub const METADATA_FILENAME: &str = ".skillsync.json";

/// Where an installed skill came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Git,
    Local,
    Registry,
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Git => write!(f, "git"),
            Self::Local => write!(f, "local"),
            Self::Registry => write!(f, "registry"),
        }
    }
}

/// Provenance record for one installed skill.
///
/// Presence of the sidecar is the sole signal that update tracking is
/// possible; skills without one are treated as externally managed.
/// Discovery never reads this file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// Raw locator string as the user supplied it.
    pub source: String,
    pub source_type: SourceType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subpath: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry_name: Option<String>,
    /// Stamped at write time when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installed_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_sha: Option<String>,
}

impl SourceMetadata {
    #[must_use]
    pub fn new(source: impl Into<String>, source_type: SourceType) -> Self {
        Self {
            source: source.into(),
            source_type,
            repo_url: None,
            subpath: None,
            local_path: None,
            registry_name: None,
            installed_at_ms: None,
            version: None,
            commit_sha: None,
        }
    }
}

/// Read the sidecar, distinguishing a missing file from a corrupt one.
pub fn try_read(skill_dir: &Path) -> Result<Option<SourceMetadata>> {
    let path = skill_dir.join(METADATA_FILENAME);
    let raw = match std::fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    serde_json::from_str(&raw).map(Some).map_err(|_| Error::MetadataCorrupt { path })
}

/// Read the sidecar, treating corrupt or unreadable files as untracked.
#[must_use]
pub fn read(skill_dir: &Path) -> Option<SourceMetadata> {
    match try_read(skill_dir) {
        Ok(meta) => meta,
        Err(e) => {
            tracing::warn!(%e, "ignoring skill metadata");
            None
        },
    }
}

/// Write the full record, stamping `installed_at_ms` if unset.
///
/// Last write wins; there is no locking across concurrent installs.
pub fn write(skill_dir: &Path, mut meta: SourceMetadata) -> Result<()> {
    if meta.installed_at_ms.is_none() {
        meta.installed_at_ms = Some(skillsync_common::time::now_ms());
    }

    let path = skill_dir.join(METADATA_FILENAME);
    let json = serde_json::to_string_pretty(&meta).context("serialize skill metadata")?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json.as_bytes())
        .with_context(|| format!("write {}", tmp.display()))?;
    std::fs::rename(&tmp, &path).with_context(|| format!("rename to {}", path.display()))?;
    Ok(())
}

#[must_use]
pub fn has(skill_dir: &Path) -> bool {
    skill_dir.join(METADATA_FILENAME).is_file()
}
