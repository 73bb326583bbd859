//! Install, remove, sync, and update orchestration across tools.
//!
//! Operations fan out over the selected tools one target at a time. A
//! failing target is logged and dropped from the result; only source
//! resolution is fatal to an install. Lifecycle hooks fire after each
//! operation and can never fail it.

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use {
    serde::Serialize,
    tracing::{debug, info, warn},
};

use {
    skillsync_adapters::inject,
    skillsync_common::{Error, Result},
    skillsync_fetch::{ResolveSource, parse_source},
    skillsync_plugins::{HookContext, HookEvent, HookRegistry},
    skillsync_skills::{
        FsSkillScanner, MANIFEST_FILENAME, Skill, SkillDiscoverer, SourceMetadata, metadata,
        parse_frontmatter,
    },
    skillsync_tools::{Scope, ToolConfig, ToolRegistry},
};

// ── Operation inputs and reports ────────────────────────────────────────────

/// Target selection shared by install and remove.
#[derive(Debug, Clone, Default)]
pub struct InstallOptions {
    /// Restrict to this tool id; otherwise every detected tool.
    pub tool: Option<String>,
    /// Defaults to the engine's configured scope.
    pub scope: Option<Scope>,
}

/// One tool a skill was written into.
#[derive(Debug, Clone, Serialize)]
pub struct InstalledTarget {
    pub tool_id: String,
    pub scope: Scope,
    pub path: PathBuf,
}

/// Outcome of [`SyncEngine::install_skill`].
#[derive(Debug, Serialize)]
pub struct InstallResult {
    /// True whenever the source resolved, even if every target failed.
    pub success: bool,
    pub skill: String,
    pub installed: Vec<InstalledTarget>,
    pub failed_count: usize,
}

/// Outcome of [`SyncEngine::remove_skill`].
#[derive(Debug, Serialize)]
pub struct RemoveResult {
    pub skill: String,
    /// Empty when the skill was not installed anywhere.
    pub removed: Vec<InstalledTarget>,
}

/// Outcome of [`SyncEngine::sync`].
#[derive(Debug, Default, Serialize)]
pub struct SyncReport {
    pub synced_tools: usize,
    /// Documents whose generated section is now current.
    pub docs: Vec<PathBuf>,
    /// Descriptor files deleted because their skill vanished.
    pub pruned_descriptors: Vec<PathBuf>,
}

/// Outcome of [`SyncEngine::update`].
#[derive(Debug, Default, Serialize)]
pub struct UpdateReport {
    pub updated: Vec<String>,
    /// Skills without a provenance sidecar, left untouched.
    pub skipped: Vec<String>,
    pub failed: Vec<String>,
}

/// A skill whose upstream moved past the installed revision.
#[derive(Debug, Serialize)]
pub struct OutdatedSkill {
    pub name: String,
    pub source: String,
    /// Recorded commit or version at install time, when known.
    pub current: Option<String>,
    pub latest: String,
}

/// One installed skill in the per-tool status matrix.
#[derive(Debug, Serialize)]
pub struct SkillStatus {
    pub name: String,
    pub scope: Scope,
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Whether a provenance sidecar makes this skill updatable.
    pub managed: bool,
}

/// Installation state of one tool, for the `manage` view.
#[derive(Debug, Serialize)]
pub struct ToolStatus {
    pub tool_id: String,
    pub display_name: String,
    pub detected: bool,
    pub skills: Vec<SkillStatus>,
}

// ── Engine ──────────────────────────────────────────────────────────────────

/// Coordinates fetchers, the tool registry, adapters, and hooks.
///
/// Holds only configuration; every operation re-reads the filesystem, so
/// one engine can serve a whole CLI session without going stale.
pub struct SyncEngine {
    tools: ToolRegistry,
    resolver: Box<dyn ResolveSource>,
    hooks: HookRegistry,
    working_dir: PathBuf,
    home: PathBuf,
    staging_root: PathBuf,
    default_tool: Option<String>,
    default_scope: Scope,
}

impl SyncEngine {
    pub fn new(
        tools: ToolRegistry,
        resolver: Box<dyn ResolveSource>,
        working_dir: impl Into<PathBuf>,
        home: impl Into<PathBuf>,
    ) -> Self {
        Self {
            tools,
            resolver,
            hooks: HookRegistry::new(),
            working_dir: working_dir.into(),
            home: home.into(),
            staging_root: skillsync_config::data_dir().join("staging"),
            default_tool: None,
            default_scope: Scope::default(),
        }
    }

    #[must_use]
    pub fn with_hooks(mut self, hooks: HookRegistry) -> Self {
        self.hooks = hooks;
        self
    }

    #[must_use]
    pub fn with_staging_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_root = dir.into();
        self
    }

    /// Tool to fall back on when none is detected, typically from config.
    #[must_use]
    pub fn with_default_tool(mut self, tool: Option<String>) -> Self {
        self.default_tool = tool;
        self
    }

    #[must_use]
    pub fn with_default_scope(mut self, scope: Scope) -> Self {
        self.default_scope = scope;
        self
    }

    #[must_use]
    pub fn registry(&self) -> &ToolRegistry {
        &self.tools
    }

    #[must_use]
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    fn scanner(&self) -> FsSkillScanner {
        FsSkillScanner::new(self.tools.clone(), &self.working_dir)
    }

    // ── Install ─────────────────────────────────────────────────────────

    /// Install a skill from `source` into every selected target tool.
    ///
    /// The source is resolved and fetched once into a staging directory,
    /// then fanned out. Each target is installed independently: failures
    /// are logged, counted, and excluded from `installed`, and the result
    /// reports success as long as the source itself resolved.
    pub async fn install_skill(
        &self,
        source: &str,
        options: &InstallOptions,
    ) -> Result<InstallResult> {
        let targets = self.select_targets(options.tool.as_deref())?;
        let scope = options.scope.unwrap_or(self.default_scope);

        let parsed = parse_source(source)?;
        let fetcher = self.resolver.resolve(source)?;

        let staging = self.staging_root.join(parsed.default_name());
        if staging.exists() {
            tokio::fs::remove_dir_all(&staging).await?;
        }
        let source_meta = fetcher.fetch(&staging).await?;

        let manifest = tokio::fs::read_to_string(staging.join(MANIFEST_FILENAME))
            .await
            .map_err(|e| {
                Error::source_resolution(source, format!("fetched source has no {MANIFEST_FILENAME}: {e}"))
            })?;
        let skill_name = parse_frontmatter(&manifest)
            .ok()
            .and_then(|fm| fm.name)
            .filter(|name| is_path_segment(name))
            .unwrap_or_else(|| parsed.default_name());

        let mut installed = Vec::new();
        let mut failed_count = 0;
        for &tool in &targets {
            match self.install_into(tool, scope, &skill_name, &staging, &source_meta).await {
                Ok(target) => {
                    info!(
                        tool = tool.id,
                        skill = %skill_name,
                        path = %target.path.display(),
                        "installed skill"
                    );
                    installed.push(target);
                },
                Err(e) => {
                    failed_count += 1;
                    warn!(tool = tool.id, skill = %skill_name, error = %e, "skipping failed target");
                },
            }
        }

        let _ = tokio::fs::remove_dir_all(&staging).await;

        let context = HookContext {
            skill: Some(skill_name.clone()),
            tools: installed.iter().map(|t| t.tool_id.clone()).collect(),
            scope: Some(scope.to_string()),
            paths: installed.iter().map(|t| t.path.clone()).collect(),
        };
        self.hooks.dispatch(HookEvent::PostInstall, &context).await;

        Ok(InstallResult {
            success: true,
            skill: skill_name,
            installed,
            failed_count,
        })
    }

    /// The explicit tool, else every tool detected on this machine, else
    /// the configured or built-in default.
    fn select_targets(&self, tool: Option<&str>) -> Result<Vec<&ToolConfig>> {
        if let Some(id) = tool {
            return Ok(vec![self.tools.require(id)?]);
        }
        let detected = self.tools.detect_global(&self.home);
        if !detected.is_empty() {
            return Ok(detected);
        }
        let fallback = match &self.default_tool {
            Some(id) => self.tools.require(id)?,
            None => self.tools.default_tool(),
        };
        Ok(vec![fallback])
    }

    async fn install_into(
        &self,
        tool: &ToolConfig,
        scope: Scope,
        skill_name: &str,
        staged: &Path,
        source_meta: &SourceMetadata,
    ) -> Result<InstalledTarget> {
        let (root, effective_scope) =
            self.tools.skills_root(tool, scope, Some(&self.working_dir))?;
        let target_dir = root.join(skill_name);

        inject::inject_skill(tool, skill_name, staged, &target_dir, effective_scope, &self.working_dir)?;
        metadata::write(&target_dir, source_meta.clone())
            .map_err(|e| Error::injection(tool.id, e))?;
        self.refresh_tool_docs(tool).await?;

        Ok(InstalledTarget {
            tool_id: tool.id.to_string(),
            scope: effective_scope,
            path: target_dir,
        })
    }

    /// Regenerate the skills sections of one tool's config documents.
    ///
    /// The project document lists everything the tool can see from the
    /// working directory; the global document lists global skills only.
    async fn refresh_tool_docs(&self, tool: &ToolConfig) -> Result<()> {
        let skills = self.scanner().discover(Some(tool.id)).await?;
        inject::sync_tool_doc(tool, Scope::Project, &self.working_dir, &skills)?;
        let global: Vec<Skill> = skills
            .iter()
            .filter(|s| s.location == Scope::Global)
            .cloned()
            .collect();
        inject::sync_tool_doc(tool, Scope::Global, &self.working_dir, &global)?;
        Ok(())
    }

    // ── Remove ──────────────────────────────────────────────────────────

    /// Remove `name` from the selected tools and refresh their documents.
    ///
    /// Without an explicit tool every registered tool is swept, in both
    /// scopes unless one was requested. Targets where the skill is not
    /// present are skipped; a skill installed nowhere yields an empty
    /// `removed` list rather than an error.
    pub async fn remove_skill(&self, name: &str, options: &InstallOptions) -> Result<RemoveResult> {
        let tools: Vec<&ToolConfig> = match options.tool.as_deref() {
            Some(id) => vec![self.tools.require(id)?],
            None => self.tools.tools().iter().collect(),
        };
        let scopes = match options.scope {
            Some(scope) => vec![scope],
            None => vec![Scope::Project, Scope::Global],
        };

        let mut removed = Vec::new();
        let mut seen: HashSet<(&str, PathBuf)> = HashSet::new();
        let mut touched: Vec<&ToolConfig> = Vec::new();
        for &tool in &tools {
            for &scope in &scopes {
                let (root, effective_scope) =
                    self.tools.skills_root(tool, scope, Some(&self.working_dir))?;
                let target_dir = root.join(name);
                // A tool without a global root aliases its project dir.
                if !seen.insert((tool.id, target_dir.clone())) {
                    continue;
                }
                match inject::remove_skill(tool, name, &target_dir, effective_scope, &self.working_dir) {
                    Ok(true) => {
                        info!(tool = tool.id, skill = name, "removed skill");
                        removed.push(InstalledTarget {
                            tool_id: tool.id.to_string(),
                            scope: effective_scope,
                            path: target_dir,
                        });
                        if !touched.iter().any(|t| t.id == tool.id) {
                            touched.push(tool);
                        }
                    },
                    Ok(false) => {},
                    Err(e) => {
                        warn!(tool = tool.id, skill = name, error = %e, "failed to remove skill from tool");
                    },
                }
            }
        }

        for tool in touched {
            if let Err(e) = self.refresh_tool_docs(tool).await {
                warn!(tool = tool.id, error = %e, "failed to refresh tool documents");
            }
        }

        let context = HookContext {
            skill: Some(name.to_string()),
            tools: removed.iter().map(|t| t.tool_id.clone()).collect(),
            scope: options.scope.map(|s| s.to_string()),
            paths: removed.iter().map(|t| t.path.clone()).collect(),
        };
        self.hooks.dispatch(HookEvent::PostRemove, &context).await;

        Ok(RemoveResult {
            skill: name.to_string(),
            removed,
        })
    }

    // ── Sync ────────────────────────────────────────────────────────────

    /// Re-discover skills and bring every doc-based target back in line.
    ///
    /// Rewrites each tool's generated sections from what is actually on
    /// disk and prunes descriptors whose skill vanished. Per-tool write
    /// failures are logged and skipped so one broken doc cannot stall
    /// the rest.
    pub async fn sync(&self, tool_filter: Option<&str>) -> Result<SyncReport> {
        let tools: Vec<&ToolConfig> = match tool_filter {
            Some(id) => vec![self.tools.require(id)?],
            None => self.tools.tools().iter().collect(),
        };

        let scanner = self.scanner();
        let mut report = SyncReport::default();
        for &tool in &tools {
            let skills = scanner.discover(Some(tool.id)).await?;
            let keep: Vec<String> = skills.iter().map(|s| s.name.clone()).collect();
            for scope in [Scope::Project, Scope::Global] {
                let listed: Vec<Skill> = match scope {
                    Scope::Project => skills.clone(),
                    Scope::Global => skills
                        .iter()
                        .filter(|s| s.location == Scope::Global)
                        .cloned()
                        .collect(),
                };
                match inject::sync_tool_doc(tool, scope, &self.working_dir, &listed) {
                    Ok(Some(path)) => {
                        if path.is_file() && !report.docs.contains(&path) {
                            report.docs.push(path);
                        }
                    },
                    Ok(None) => {},
                    Err(e) => {
                        warn!(tool = tool.id, scope = %scope, error = %e, "failed to sync tool document");
                    },
                }
                match inject::prune_descriptors(tool, scope, &self.working_dir, &keep) {
                    Ok(pruned) => report.pruned_descriptors.extend(pruned),
                    Err(e) => {
                        warn!(tool = tool.id, scope = %scope, error = %e, "failed to prune descriptors");
                    },
                }
            }
            report.synced_tools += 1;
        }

        info!(
            tools = report.synced_tools,
            docs = report.docs.len(),
            pruned = report.pruned_descriptors.len(),
            "sync complete"
        );

        let context = HookContext {
            skill: None,
            tools: tools.iter().map(|t| t.id.to_string()).collect(),
            scope: None,
            paths: report.docs.clone(),
        };
        self.hooks.dispatch(HookEvent::PostSync, &context).await;

        Ok(report)
    }

    // ── Update ──────────────────────────────────────────────────────────

    /// Refresh installed skills from their recorded sources.
    ///
    /// With `names`, only those skills are considered; names that match
    /// nothing are reported as failed. Skills without a provenance
    /// sidecar are skipped as externally managed. Per-skill fetch
    /// failures are logged and do not stop the pass.
    pub async fn update(&self, names: Option<&[String]>) -> Result<UpdateReport> {
        let scanner = self.scanner();
        let mut report = UpdateReport::default();
        let mut seen_dirs: HashSet<PathBuf> = HashSet::new();
        let mut touched: Vec<&ToolConfig> = Vec::new();

        for tool in self.tools.tools() {
            for skill in scanner.discover(Some(tool.id)).await? {
                if let Some(filter) = names
                    && !filter.iter().any(|n| *n == skill.name)
                {
                    continue;
                }
                let dir = skill.dir().to_path_buf();
                if !seen_dirs.insert(dir.clone()) {
                    continue;
                }
                let Some(meta) = metadata::read(&dir) else {
                    debug!(skill = %skill.name, "no provenance sidecar, leaving alone");
                    push_unique(&mut report.skipped, &skill.name);
                    continue;
                };
                match self.update_one(&dir, &meta).await {
                    Ok(()) => {
                        info!(skill = %skill.name, source = %meta.source, "updated skill");
                        push_unique(&mut report.updated, &skill.name);
                        if !touched.iter().any(|t| t.id == tool.id) {
                            touched.push(tool);
                        }
                    },
                    Err(e) => {
                        warn!(skill = %skill.name, source = %meta.source, error = %e, "failed to update skill");
                        push_unique(&mut report.failed, &skill.name);
                    },
                }
            }
        }

        if let Some(filter) = names {
            for name in filter {
                let known = |list: &[String]| list.iter().any(|n| n == name);
                if !known(&report.updated) && !known(&report.skipped) && !known(&report.failed) {
                    warn!(skill = %name, "skill not installed, cannot update");
                    report.failed.push(name.clone());
                }
            }
        }

        let context = HookContext {
            skill: None,
            tools: touched.iter().map(|t| t.id.to_string()).collect(),
            scope: None,
            paths: Vec::new(),
        };
        for tool in touched {
            if let Err(e) = self.refresh_tool_docs(tool).await {
                warn!(tool = tool.id, error = %e, "failed to refresh tool documents");
            }
        }
        self.hooks.dispatch(HookEvent::PostUpdate, &context).await;

        Ok(report)
    }

    async fn update_one(&self, dir: &Path, meta: &SourceMetadata) -> Result<()> {
        let fetcher = self.resolver.resolve(&meta.source)?;
        let fresh = fetcher.fetch(dir).await?;
        metadata::write(dir, fresh)?;
        Ok(())
    }

    // ── Outdated ────────────────────────────────────────────────────────

    /// Compare recorded provenance against upstream revisions.
    ///
    /// Skills without a sidecar are not update-tracked and never listed.
    /// Upstream lookup failures are logged per skill and skipped so one
    /// unreachable source cannot hide the rest.
    pub async fn outdated(&self) -> Result<Vec<OutdatedSkill>> {
        let mut outdated = Vec::new();
        for skill in self.scanner().discover(None).await? {
            let Some(meta) = metadata::read(skill.dir()) else {
                continue;
            };
            let fetcher = match self.resolver.resolve(&meta.source) {
                Ok(fetcher) => fetcher,
                Err(e) => {
                    warn!(skill = %skill.name, error = %e, "cannot resolve recorded source");
                    continue;
                },
            };
            let latest = match fetcher.latest_revision().await {
                Ok(Some(rev)) => rev,
                Ok(None) => continue,
                Err(e) => {
                    warn!(skill = %skill.name, error = %e, "failed to query upstream revision");
                    continue;
                },
            };
            let current = meta.commit_sha.clone().or_else(|| meta.version.clone());
            if current.as_deref() != Some(latest.as_str()) {
                outdated.push(OutdatedSkill {
                    name: skill.name,
                    source: meta.source,
                    current,
                    latest,
                });
            }
        }
        Ok(outdated)
    }

    // ── Status ──────────────────────────────────────────────────────────

    /// Per-tool installation matrix for the `manage` view.
    pub async fn status(&self) -> Result<Vec<ToolStatus>> {
        let scanner = self.scanner();
        let global: HashSet<&str> =
            self.tools.detect_global(&self.home).iter().map(|t| t.id).collect();
        let project: HashSet<&str> =
            self.tools.detect_in_project(&self.working_dir).iter().map(|t| t.id).collect();

        let mut statuses = Vec::new();
        for tool in self.tools.tools() {
            let mut skills = Vec::new();
            for skill in scanner.discover(Some(tool.id)).await? {
                let dir = skill.dir().to_path_buf();
                let meta = metadata::read(&dir);
                skills.push(SkillStatus {
                    name: skill.name,
                    scope: skill.location,
                    path: dir,
                    source: meta.as_ref().map(|m| m.source.clone()),
                    version: skill
                        .version
                        .or_else(|| meta.as_ref().and_then(|m| m.version.clone())),
                    managed: meta.is_some(),
                });
            }
            statuses.push(ToolStatus {
                tool_id: tool.id.to_string(),
                display_name: tool.display_name.to_string(),
                detected: global.contains(tool.id) || project.contains(tool.id),
                skills,
            });
        }
        Ok(statuses)
    }

    /// Directories a file watcher should observe for manifest changes.
    #[must_use]
    pub fn discovery_roots(&self) -> Vec<PathBuf> {
        let mut roots = Vec::new();
        for tool in self.tools.tools() {
            roots.push(self.working_dir.join(tool.project_relative_path));
            if let Some(global) = &tool.global_path {
                roots.push(global.clone());
            }
        }
        roots.sort();
        roots.dedup();
        roots
    }
}

/// A skill name is used as a directory name and must stay one segment.
fn is_path_segment(name: &str) -> bool {
    !name.is_empty() && !name.contains(['/', '\\']) && name != "." && name != ".."
}

fn push_unique(list: &mut Vec<String>, name: &str) {
    if !list.iter().any(|n| n == name) {
        list.push(name.to_string());
    }
}
