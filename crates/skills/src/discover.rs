use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use skillsync_common::Result;
use skillsync_tools::{Scope, ToolConfig, ToolRegistry};

use crate::{
    frontmatter,
    types::{MANIFEST_FILENAME, Skill},
};

/// Discovers skills from filesystem paths.
#[async_trait]
pub trait SkillDiscoverer: Send + Sync {
    /// Scan every registered tool's skill directories and return the
    /// discovered skills, deduplicated by name.
    ///
    /// With `tool_filter`, only that tool's directories are scanned; an
    /// unknown id is an error.
    async fn discover(&self, tool_filter: Option<&str>) -> Result<Vec<Skill>>;
}

/// Default filesystem-based scanner over the registered tools.
pub struct FsSkillScanner {
    registry: ToolRegistry,
    working_dir: PathBuf,
}

impl FsSkillScanner {
    #[must_use]
    pub fn new(registry: ToolRegistry, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            registry,
            working_dir: working_dir.into(),
        }
    }
}

#[async_trait]
impl SkillDiscoverer for FsSkillScanner {
    async fn discover(&self, tool_filter: Option<&str>) -> Result<Vec<Skill>> {
        let tools: Vec<&ToolConfig> = match tool_filter {
            Some(id) => vec![self.registry.require(id)?],
            None => self.registry.tools().iter().collect(),
        };

        let mut skills = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for tool in tools {
            // Project scope shadows global scope for the same name, and
            // earlier tools shadow later ones.
            let project_root = self.working_dir.join(tool.project_relative_path);
            scan_dir(&project_root, tool, Scope::Project, &mut seen, &mut skills);
            if let Some(global_root) = &tool.global_path {
                scan_dir(global_root, tool, Scope::Global, &mut seen, &mut skills);
            }
        }

        Ok(skills)
    }
}

/// Scan one skills root one level deep for manifest-bearing directories.
fn scan_dir(
    root: &Path,
    tool: &ToolConfig,
    scope: Scope,
    seen: &mut HashSet<String>,
    skills: &mut Vec<Skill>,
) {
    let entries = match std::fs::read_dir(root) {
        Ok(e) => e,
        Err(_) => return,
    };

    for entry in entries.flatten() {
        let skill_dir = entry.path();
        // is_dir() follows symlinks, so broken links fall out here.
        if !skill_dir.is_dir() {
            continue;
        }
        let manifest_path = skill_dir.join(MANIFEST_FILENAME);
        if !manifest_path.is_file() {
            continue;
        }
        let content = match std::fs::read_to_string(&manifest_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(?manifest_path, %e, "failed to read skill manifest");
                continue;
            },
        };
        let parsed = match frontmatter::parse_skill(&content) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(?skill_dir, %e, "failed to parse skill manifest");
                continue;
            },
        };

        let fm = parsed.frontmatter;
        let name = fm.name.unwrap_or_else(|| dir_name(&skill_dir));
        if !seen.insert(name.clone()) {
            continue;
        }
        skills.push(Skill {
            name,
            description: fm.description.unwrap_or_default(),
            location: scope,
            path: manifest_path,
            tool_id: tool.id.to_string(),
            version: fm.version,
            author: fm.author,
        });
    }
}

fn dir_name(dir: &Path) -> String {
    dir.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use {super::*, skillsync_common::Error};

    fn write_skill(root: &Path, dir: &str, frontmatter: &str) {
        let skill_dir = root.join(dir);
        std::fs::create_dir_all(&skill_dir).unwrap();
        std::fs::write(
            skill_dir.join(MANIFEST_FILENAME),
            format!("---\n{frontmatter}\n---\nbody\n"),
        )
        .unwrap();
    }

    fn scanner(home: &Path, work: &Path) -> FsSkillScanner {
        FsSkillScanner::new(ToolRegistry::with_home(home), work)
    }

    #[tokio::test]
    async fn test_discover_skills_in_temp_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let work = tmp.path().join("work");
        write_skill(
            &work.join(".claude/skills"),
            "my-skill",
            "name: my-skill\ndescription: test",
        );

        let skills = scanner(&tmp.path().join("home"), &work)
            .discover(None)
            .await
            .unwrap();
        assert_eq!(skills.len(), 1);
        assert_eq!(skills[0].name, "my-skill");
        assert_eq!(skills[0].tool_id, "claude-code");
        assert_eq!(skills[0].location, Scope::Project);
        assert!(skills[0].path.ends_with("my-skill/SKILL.md"));
    }

    #[tokio::test]
    async fn test_project_shadows_global_for_same_name() {
        let tmp = tempfile::tempdir().unwrap();
        let home = tmp.path().join("home");
        let work = tmp.path().join("work");
        write_skill(
            &home.join(".claude/skills"),
            "pdf",
            "name: pdf\ndescription: global copy",
        );
        write_skill(
            &work.join(".claude/skills"),
            "pdf",
            "name: pdf\ndescription: project copy",
        );

        let skills = scanner(&home, &work).discover(None).await.unwrap();
        assert_eq!(skills.len(), 1);
        assert_eq!(skills[0].description, "project copy");
        assert_eq!(skills[0].location, Scope::Project);
    }

    #[tokio::test]
    async fn test_earlier_tool_wins_across_tools() {
        let tmp = tempfile::tempdir().unwrap();
        let work = tmp.path().join("work");
        write_skill(
            &work.join(".claude/skills"),
            "pdf",
            "name: pdf\ndescription: claude copy",
        );
        write_skill(
            &work.join(".codex/skills"),
            "pdf",
            "name: pdf\ndescription: codex copy",
        );

        let skills = scanner(&tmp.path().join("home"), &work)
            .discover(None)
            .await
            .unwrap();
        assert_eq!(skills.len(), 1);
        assert_eq!(skills[0].tool_id, "claude-code");
        assert_eq!(skills[0].description, "claude copy");
    }

    #[tokio::test]
    async fn test_unnamed_manifest_uses_directory_name() {
        let tmp = tempfile::tempdir().unwrap();
        let work = tmp.path().join("work");
        write_skill(
            &work.join(".claude/skills"),
            "spreadsheet",
            "description: tables",
        );

        let skills = scanner(&tmp.path().join("home"), &work)
            .discover(None)
            .await
            .unwrap();
        assert_eq!(skills.len(), 1);
        assert_eq!(skills[0].name, "spreadsheet");
    }

    #[tokio::test]
    async fn test_filter_limits_scan_to_one_tool() {
        let tmp = tempfile::tempdir().unwrap();
        let work = tmp.path().join("work");
        write_skill(&work.join(".claude/skills"), "a", "name: a\ndescription: x");
        write_skill(&work.join(".codex/skills"), "b", "name: b\ndescription: y");

        let skills = scanner(&tmp.path().join("home"), &work)
            .discover(Some("codex"))
            .await
            .unwrap();
        assert_eq!(skills.len(), 1);
        assert_eq!(skills[0].name, "b");
    }

    #[tokio::test]
    async fn test_unknown_tool_filter_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = scanner(&tmp.path().join("home"), &tmp.path().join("work"))
            .discover(Some("not-a-tool"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnknownTool(_)));
    }

    #[tokio::test]
    async fn test_discover_skips_invalid_manifests() {
        let tmp = tempfile::tempdir().unwrap();
        let work = tmp.path().join("work");
        let skill_dir = work.join(".claude/skills/bad-skill");
        std::fs::create_dir_all(&skill_dir).unwrap();
        std::fs::write(skill_dir.join(MANIFEST_FILENAME), "no frontmatter here").unwrap();

        let skills = scanner(&tmp.path().join("home"), &work)
            .discover(None)
            .await
            .unwrap();
        assert!(skills.is_empty());
    }

    #[tokio::test]
    async fn test_discover_skips_dirs_without_manifest() {
        let tmp = tempfile::tempdir().unwrap();
        let work = tmp.path().join("work");
        let dir = work.join(".claude/skills/not-a-skill");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("README.md"), "hello").unwrap();

        let skills = scanner(&tmp.path().join("home"), &work)
            .discover(None)
            .await
            .unwrap();
        assert!(skills.is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_broken_symlinks_are_ignored() {
        let tmp = tempfile::tempdir().unwrap();
        let work = tmp.path().join("work");
        let skills_root = work.join(".claude/skills");
        std::fs::create_dir_all(&skills_root).unwrap();
        std::os::unix::fs::symlink(tmp.path().join("gone"), skills_root.join("dangling")).unwrap();

        let skills = scanner(&tmp.path().join("home"), &work)
            .discover(None)
            .await
            .unwrap();
        assert!(skills.is_empty());
    }
}
