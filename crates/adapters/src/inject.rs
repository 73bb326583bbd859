//! Per-skill injection into tool directories and config documents.

use std::path::{Path, PathBuf};

use serde::Serialize;
use skillsync_common::{Context, Error, Result};
use skillsync_skills::Skill;
use skillsync_tools::{Scope, ToolConfig};

use crate::{prompt, section};

// ── Per-skill injection ─────────────────────────────────────────────────────

/// Install one skill into a tool: copy its files into `target_dir` and,
/// for tools that cannot read the native manifest, synthesize an agent
/// descriptor pointing back at the CLI.
pub fn inject_skill(
    tool: &ToolConfig,
    skill_name: &str,
    source_dir: &Path,
    target_dir: &Path,
    scope: Scope,
    working_dir: &Path,
) -> Result<()> {
    copy_skill_files(source_dir, target_dir).map_err(|e| Error::injection(tool.id, e))?;
    if tool.requires_conversion {
        write_agent_descriptor(tool, skill_name, scope, working_dir)
            .map_err(|e| Error::injection(tool.id, e))?;
    }
    Ok(())
}

/// Remove one skill from a tool, including any synthesized descriptor.
///
/// Returns true when a skill directory or descriptor was actually deleted,
/// false when nothing for this skill was present.
pub fn remove_skill(
    tool: &ToolConfig,
    skill_name: &str,
    target_dir: &Path,
    scope: Scope,
    working_dir: &Path,
) -> Result<bool> {
    let mut removed = false;
    if target_dir.is_dir() {
        std::fs::remove_dir_all(target_dir).map_err(|e| Error::injection(tool.id, e))?;
        removed = true;
    }
    if tool.requires_conversion
        && let Some(agent_dir) = tool.agent_dir_path(scope, working_dir)
    {
        for path in [
            descriptor_path(&agent_dir, skill_name),
            legacy_descriptor_path(&agent_dir, skill_name),
        ] {
            if path.is_file() {
                std::fs::remove_file(&path).map_err(|e| Error::injection(tool.id, e))?;
                removed = true;
            }
        }
    }
    Ok(removed)
}

/// Delete synthesized descriptors whose skill is no longer present.
///
/// Scans the tool's agent directory and removes current and legacy
/// descriptor files not named in `keep`. Returns the removed paths.
pub fn prune_descriptors(
    tool: &ToolConfig,
    scope: Scope,
    working_dir: &Path,
    keep: &[String],
) -> Result<Vec<PathBuf>> {
    if !tool.requires_conversion {
        return Ok(Vec::new());
    }
    let Some(agent_dir) = tool.agent_dir_path(scope, working_dir) else {
        return Ok(Vec::new());
    };
    let entries = match std::fs::read_dir(&agent_dir) {
        Ok(e) => e,
        Err(_) => return Ok(Vec::new()),
    };

    let mut removed = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        let Some(skill) = descriptor_skill_name(&path) else {
            continue;
        };
        if keep.iter().any(|k| *k == skill) {
            continue;
        }
        std::fs::remove_file(&path).map_err(|e| Error::injection(tool.id, e))?;
        removed.push(path);
    }
    Ok(removed)
}

/// Skill name encoded in a descriptor filename, current or legacy.
fn descriptor_skill_name(path: &Path) -> Option<String> {
    if !path.is_file() {
        return None;
    }
    let name = path.file_name()?.to_str()?;
    let base = name.strip_suffix(".json")?;
    Some(base.strip_suffix(".agent").unwrap_or(base).to_string())
}

fn copy_skill_files(src: &Path, dest: &Path) -> Result<()> {
    std::fs::create_dir_all(dest)?;

    for entry in walkdir::WalkDir::new(src).min_depth(1) {
        let entry = entry.context("walk skill directory")?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .context("strip source prefix")?;
        let target = dest.join(relative);

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::copy(entry.path(), &target)?;
        }
    }

    Ok(())
}

// ── Agent descriptor synthesis ──────────────────────────────────────────────

#[derive(Serialize)]
struct AgentDescriptor<'a> {
    name: &'a str,
    description: String,
    instructions: String,
}

fn descriptor_path(agent_dir: &Path, skill_name: &str) -> PathBuf {
    agent_dir.join(format!("{skill_name}.json"))
}

/// Filename written by earlier releases; superseded by `<name>.json`.
fn legacy_descriptor_path(agent_dir: &Path, skill_name: &str) -> PathBuf {
    agent_dir.join(format!("{skill_name}.agent.json"))
}

fn write_agent_descriptor(
    tool: &ToolConfig,
    skill_name: &str,
    scope: Scope,
    working_dir: &Path,
) -> Result<()> {
    let Some(agent_dir) = tool.agent_dir_path(scope, working_dir) else {
        return Ok(());
    };
    std::fs::create_dir_all(&agent_dir)?;

    let descriptor = AgentDescriptor {
        name: skill_name,
        description: "Installed skill; load its instructions through the skillsync CLI before use."
            .to_string(),
        instructions: format!(
            "Run `skillsync read {skill_name}` to load this skill's full instructions, then \
             follow them for matching tasks. `skillsync list` and `skillsync search <query>` \
             enumerate the other installed skills."
        ),
    };
    let json = serde_json::to_string_pretty(&descriptor).context("serialize agent descriptor")?;
    std::fs::write(descriptor_path(&agent_dir, skill_name), json + "\n")?;

    // A leftover legacy file would shadow the current descriptor.
    let legacy = legacy_descriptor_path(&agent_dir, skill_name);
    if legacy.exists() {
        std::fs::remove_file(&legacy)?;
    }
    Ok(())
}

// ── Config document sync ────────────────────────────────────────────────────

/// Bring the generated section of a tool's config document in line with
/// `skills`. Returns the document path when this tool has one for the
/// given scope; tools without config documents are a no-op.
pub fn sync_tool_doc(
    tool: &ToolConfig,
    scope: Scope,
    working_dir: &Path,
    skills: &[Skill],
) -> Result<Option<PathBuf>> {
    let Some(doc_path) = tool.doc_path(scope, working_dir) else {
        return Ok(None);
    };

    let block = prompt::generate(skills, tool.manifest_format);
    let existing = std::fs::read_to_string(&doc_path).unwrap_or_default();

    let updated = if block.is_empty() {
        section::remove_section(&existing).unwrap_or_else(|| existing.clone())
    } else {
        section::replace_section(&existing, &block)
    };

    if updated != existing {
        if let Some(parent) = doc_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::injection(tool.id, e))?;
        }
        std::fs::write(&doc_path, updated).map_err(|e| Error::injection(tool.id, e))?;
    }
    Ok(Some(doc_path))
}

#[cfg(test)]
mod tests {
    use {super::*, skillsync_tools::ToolRegistry};

    fn skill(name: &str, description: &str) -> Skill {
        Skill {
            name: name.to_string(),
            description: description.to_string(),
            location: Scope::Project,
            path: PathBuf::from(format!("/tmp/{name}/SKILL.md")),
            tool_id: "claude-code".to_string(),
            version: None,
            author: None,
        }
    }

    fn stage_skill(root: &Path) -> PathBuf {
        let src = root.join("staged/pdf");
        std::fs::create_dir_all(src.join("reference")).unwrap();
        std::fs::write(src.join("SKILL.md"), "---\nname: pdf\n---\nbody\n").unwrap();
        std::fs::write(src.join("reference/notes.md"), "extra\n").unwrap();
        src
    }

    #[test]
    fn native_injection_copies_the_skill_tree() {
        let tmp = tempfile::tempdir().unwrap();
        let work = tmp.path().join("work");
        let src = stage_skill(tmp.path());
        let registry = ToolRegistry::with_home(&tmp.path().join("home"));
        let tool = registry.get("claude-code").unwrap();
        let target = work.join(".claude/skills/pdf");

        inject_skill(tool, "pdf", &src, &target, Scope::Project, &work).unwrap();

        assert!(target.join("SKILL.md").is_file());
        assert!(target.join("reference/notes.md").is_file());
    }

    #[test]
    fn conversion_injection_writes_only_the_current_descriptor() {
        let tmp = tempfile::tempdir().unwrap();
        let work = tmp.path().join("work");
        let src = stage_skill(tmp.path());
        let registry = ToolRegistry::with_home(&tmp.path().join("home"));
        let tool = registry.get("opencode").unwrap();
        let target = work.join(".opencode/skills/pdf");

        let agent_dir = tool.agent_dir_path(Scope::Project, &work).unwrap();
        std::fs::create_dir_all(&agent_dir).unwrap();
        std::fs::write(agent_dir.join("pdf.agent.json"), "{}").unwrap();

        inject_skill(tool, "pdf", &src, &target, Scope::Project, &work).unwrap();

        let descriptor = std::fs::read_to_string(agent_dir.join("pdf.json")).unwrap();
        assert!(descriptor.contains("skillsync read pdf"));
        assert!(!agent_dir.join("pdf.agent.json").exists());
        assert!(target.join("SKILL.md").is_file());
    }

    #[test]
    fn remove_clears_files_and_descriptors() {
        let tmp = tempfile::tempdir().unwrap();
        let work = tmp.path().join("work");
        let src = stage_skill(tmp.path());
        let registry = ToolRegistry::with_home(&tmp.path().join("home"));
        let tool = registry.get("opencode").unwrap();
        let target = work.join(".opencode/skills/pdf");

        inject_skill(tool, "pdf", &src, &target, Scope::Project, &work).unwrap();
        assert!(remove_skill(tool, "pdf", &target, Scope::Project, &work).unwrap());

        assert!(!target.exists());
        let agent_dir = tool.agent_dir_path(Scope::Project, &work).unwrap();
        assert!(!agent_dir.join("pdf.json").exists());

        // nothing left for this skill, second pass is a no-op
        assert!(!remove_skill(tool, "pdf", &target, Scope::Project, &work).unwrap());
    }

    #[test]
    fn prune_removes_descriptors_for_vanished_skills() {
        let tmp = tempfile::tempdir().unwrap();
        let work = tmp.path().join("work");
        let registry = ToolRegistry::with_home(&tmp.path().join("home"));
        let tool = registry.get("opencode").unwrap();

        let agent_dir = tool.agent_dir_path(Scope::Project, &work).unwrap();
        std::fs::create_dir_all(&agent_dir).unwrap();
        std::fs::write(agent_dir.join("pdf.json"), "{}").unwrap();
        std::fs::write(agent_dir.join("ghost.json"), "{}").unwrap();
        std::fs::write(agent_dir.join("old.agent.json"), "{}").unwrap();
        std::fs::write(agent_dir.join("notes.txt"), "keep me").unwrap();

        let removed =
            prune_descriptors(tool, Scope::Project, &work, &["pdf".to_string()]).unwrap();

        assert_eq!(removed.len(), 2);
        assert!(agent_dir.join("pdf.json").is_file());
        assert!(agent_dir.join("notes.txt").is_file());
        assert!(!agent_dir.join("ghost.json").exists());
        assert!(!agent_dir.join("old.agent.json").exists());
    }

    #[test]
    fn prune_is_a_noop_for_native_tools() {
        let tmp = tempfile::tempdir().unwrap();
        let registry = ToolRegistry::with_home(&tmp.path().join("home"));
        let tool = registry.get("claude-code").unwrap();
        let removed = prune_descriptors(tool, Scope::Project, tmp.path(), &[]).unwrap();
        assert!(removed.is_empty());
    }

    #[test]
    fn doc_sync_appends_then_replaces() {
        let tmp = tempfile::tempdir().unwrap();
        let work = tmp.path().join("work");
        std::fs::create_dir_all(&work).unwrap();
        std::fs::write(work.join("AGENTS.md"), "# Project notes\n").unwrap();
        let registry = ToolRegistry::with_home(&tmp.path().join("home"));
        let tool = registry.get("codex").unwrap();

        let doc = sync_tool_doc(tool, Scope::Project, &work, &[skill("pdf", "Extract text")])
            .unwrap()
            .unwrap();
        let first = std::fs::read_to_string(&doc).unwrap();
        assert!(first.starts_with("# Project notes"));
        assert!(first.contains("- **pdf** (project): Extract text"));

        sync_tool_doc(
            tool,
            Scope::Project,
            &work,
            &[skill("pdf", "Extract text"), skill("docx", "Edit documents")],
        )
        .unwrap();
        let second = std::fs::read_to_string(&doc).unwrap();
        assert!(second.contains("- **docx** (project): Edit documents"));
        assert_eq!(second.matches(section::SECTION_START).count(), 1);
    }

    #[test]
    fn doc_sync_without_skills_blanks_the_section() {
        let tmp = tempfile::tempdir().unwrap();
        let work = tmp.path().join("work");
        std::fs::create_dir_all(&work).unwrap();
        let registry = ToolRegistry::with_home(&tmp.path().join("home"));
        let tool = registry.get("codex").unwrap();

        sync_tool_doc(tool, Scope::Project, &work, &[skill("pdf", "Extract text")]).unwrap();
        sync_tool_doc(tool, Scope::Project, &work, &[]).unwrap();

        let content = std::fs::read_to_string(work.join("AGENTS.md")).unwrap();
        assert!(content.contains(section::SECTION_START));
        assert!(content.contains(section::REMOVED_NOTICE));
        assert!(!content.contains("- **pdf**"));
    }

    #[test]
    fn doc_sync_skips_tools_without_documents() {
        let tmp = tempfile::tempdir().unwrap();
        let registry = ToolRegistry::with_home(&tmp.path().join("home"));
        let tool = registry.get("claude-code").unwrap();

        let doc = sync_tool_doc(
            tool,
            Scope::Project,
            &tmp.path().join("work"),
            &[skill("pdf", "Extract text")],
        )
        .unwrap();
        assert!(doc.is_none());
    }

    #[test]
    fn doc_sync_creates_missing_rules_file() {
        let tmp = tempfile::tempdir().unwrap();
        let work = tmp.path().join("work");
        let registry = ToolRegistry::with_home(&tmp.path().join("home"));
        let tool = registry.get("cursor").unwrap();

        sync_tool_doc(tool, Scope::Project, &work, &[skill("pdf", "Extract text")]).unwrap();

        let content = std::fs::read_to_string(work.join(".cursorrules")).unwrap();
        assert!(content.starts_with("<skills priority=\"high\">"));
        assert!(content.contains("<name>pdf</name>"));
    }
}
