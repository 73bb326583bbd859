use std::path::{Path, PathBuf};

use {serde::Serialize, skillsync_tools::Scope};

/// Filename of a skill's manifest inside its directory.
pub const MANIFEST_FILENAME: &str = "SKILL.md";

/// One discovered capability bundle.
///
/// Materialized transiently on every discovery pass and never persisted:
/// the record is stale the moment the filesystem changes, so callers
/// re-discover before any operation with side effects instead of caching.
#[derive(Debug, Clone, Serialize)]
pub struct Skill {
    pub name: String,
    pub description: String,
    /// Whether the skill was found in a project or global directory.
    pub location: Scope,
    /// Absolute path to the skill's manifest file.
    pub path: PathBuf,
    /// Id of the tool whose directory the skill was found in.
    pub tool_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

impl Skill {
    /// The skill's directory (parent of the manifest file).
    #[must_use]
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or(&self.path)
    }
}
