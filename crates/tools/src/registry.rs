//! The supported-tool table and install-path resolution.
//!
//! The registry is immutable: it is constructed once (resolving the user's
//! home directory at that point, not per call) and passed by reference to
//! every component that needs tool information.

use std::path::{Path, PathBuf};

use {
    serde::{Deserialize, Serialize},
    skillsync_common::{Error, Result},
    tracing::debug,
};

use crate::builtin::builtin_tools;

/// Installation scope for a skill.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    #[default]
    Project,
    Global,
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Project => write!(f, "project"),
            Self::Global => write!(f, "global"),
        }
    }
}

impl std::str::FromStr for Scope {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "project" => Ok(Self::Project),
            "global" => Ok(Self::Global),
            other => Err(Error::message(format!(
                "invalid scope '{other}' (expected 'project' or 'global')"
            ))),
        }
    }
}

/// On-disk convention a tool uses to advertise skills to its agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ManifestFormat {
    /// Skill directories are consumed as-is (manifest passthrough).
    NativeManifest,
    /// A project/user instructions document (`AGENTS.md` and friends).
    InstructionsDoc,
    /// A rules file or rules directory (`.cursorrules` and friends).
    RulesDoc,
    /// Per-skill agent-definition JSON descriptors.
    AgentJson,
}

/// Static descriptor of one supported AI tool.
#[derive(Debug, Clone, Serialize)]
pub struct ToolConfig {
    pub id: &'static str,
    pub display_name: &'static str,
    pub manifest_format: ManifestFormat,
    /// Absolute global skills directory; `None` for project-only tools.
    pub global_path: Option<PathBuf>,
    /// Skills directory relative to a project root.
    pub project_relative_path: &'static str,
    /// Relative paths whose presence implies the tool is in use.
    pub detection_markers: &'static [&'static str],
    /// Lower is preferred; total order across the registry.
    pub priority: u8,
    /// Whether skills must be converted rather than copied verbatim.
    pub requires_conversion: bool,
    /// Project-relative document that receives the generated skills section.
    pub instructions_file: Option<&'static str>,
    /// Absolute document for global-scope injection, when the tool has one.
    pub global_instructions_file: Option<PathBuf>,
    /// Project-relative directory for synthesized agent descriptors.
    pub agent_dir: Option<&'static str>,
    /// Absolute global directory for synthesized agent descriptors.
    pub global_agent_dir: Option<PathBuf>,
}

impl ToolConfig {
    /// The document the aggregate skills section is injected into for the
    /// given scope, if the tool has one.
    #[must_use]
    pub fn doc_path(&self, scope: Scope, project_dir: &Path) -> Option<PathBuf> {
        match scope {
            Scope::Project => self.instructions_file.map(|rel| project_dir.join(rel)),
            Scope::Global => self.global_instructions_file.clone(),
        }
    }

    /// The agent-descriptor directory for the given scope, if any.
    #[must_use]
    pub fn agent_dir_path(&self, scope: Scope, project_dir: &Path) -> Option<PathBuf> {
        match scope {
            Scope::Project => self.agent_dir.map(|rel| project_dir.join(rel)),
            Scope::Global => self.global_agent_dir.clone(),
        }
    }
}

/// Immutable table of every supported tool, sorted by priority.
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    tools: Vec<ToolConfig>,
}

impl ToolRegistry {
    /// Build the built-in registry, resolving global paths against the
    /// current user's home directory.
    #[must_use]
    pub fn builtin() -> Self {
        let home = dirs_next::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::with_home(&home)
    }

    /// Build the built-in registry against an explicit home directory.
    #[must_use]
    pub fn with_home(home: &Path) -> Self {
        let mut tools = builtin_tools(home);
        tools.sort_by_key(|t| t.priority);
        Self { tools }
    }

    /// All tools in priority order.
    #[must_use]
    pub fn tools(&self) -> &[ToolConfig] {
        &self.tools
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ToolConfig> {
        self.tools.iter().find(|t| t.id == id)
    }

    /// Look up a tool id, failing with [`Error::UnknownTool`].
    pub fn require(&self, id: &str) -> Result<&ToolConfig> {
        self.get(id).ok_or_else(|| Error::UnknownTool(id.to_string()))
    }

    /// The preferred default tool (lowest priority number).
    #[must_use]
    pub fn default_tool(&self) -> &ToolConfig {
        // builtin_tools is never empty
        &self.tools[0]
    }

    /// Tools whose detection markers exist under the user's home directory.
    #[must_use]
    pub fn detect_global(&self, home: &Path) -> Vec<&ToolConfig> {
        self.detect_at(home)
    }

    /// Tools whose detection markers exist under a project directory.
    #[must_use]
    pub fn detect_in_project(&self, project_dir: &Path) -> Vec<&ToolConfig> {
        self.detect_at(project_dir)
    }

    fn detect_at(&self, root: &Path) -> Vec<&ToolConfig> {
        let detected: Vec<&ToolConfig> = self
            .tools
            .iter()
            .filter(|tool| {
                tool.detection_markers
                    .iter()
                    .any(|marker| root.join(marker).exists())
            })
            .collect();
        debug!(
            root = %root.display(),
            tools = ?detected.iter().map(|t| t.id).collect::<Vec<_>>(),
            "tool detection"
        );
        detected
    }

    /// Root skills directory for a tool and scope, with the documented
    /// fallback: `Global` on a tool without a global path resolves to
    /// project scope. Returns the effective scope alongside the path.
    pub fn skills_root(
        &self,
        tool: &ToolConfig,
        scope: Scope,
        working_dir: Option<&Path>,
    ) -> Result<(PathBuf, Scope)> {
        if scope == Scope::Global
            && let Some(global) = &tool.global_path
        {
            return Ok((global.clone(), Scope::Global));
        }

        let base = match working_dir {
            Some(dir) => dir.to_path_buf(),
            None => std::env::current_dir()?,
        };
        Ok((base.join(tool.project_relative_path), Scope::Project))
    }

    /// Absolute installation path for one skill.
    ///
    /// Fails with [`Error::UnknownTool`] for an unregistered id. Project
    /// paths are resolved against `working_dir` (or the process working
    /// directory); global paths were resolved at registry construction.
    pub fn install_path(
        &self,
        tool_id: &str,
        scope: Scope,
        skill_name: &str,
        working_dir: Option<&Path>,
    ) -> Result<PathBuf> {
        let tool = self.require(tool_id)?;
        let (root, _) = self.skills_root(tool, scope, working_dir)?;
        Ok(root.join(skill_name))
    }
}
