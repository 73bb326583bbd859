//! The built-in tool table.
//!
//! One entry per supported tool. `priority` doubles as the registry order:
//! discovery iterates tools ascending, and the lowest entry is the default
//! install target when nothing is detected.

use std::path::Path;

use crate::registry::{ManifestFormat, ToolConfig};

/// Construct the full tool table with global paths resolved against `home`.
pub(crate) fn builtin_tools(home: &Path) -> Vec<ToolConfig> {
    vec![
        ToolConfig {
            id: "claude-code",
            display_name: "Claude Code",
            manifest_format: ManifestFormat::NativeManifest,
            global_path: Some(home.join(".claude/skills")),
            project_relative_path: ".claude/skills",
            detection_markers: &[".claude", "CLAUDE.md"],
            priority: 0,
            requires_conversion: false,
            instructions_file: None,
            global_instructions_file: None,
            agent_dir: None,
            global_agent_dir: None,
        },
        ToolConfig {
            id: "codex",
            display_name: "Codex CLI",
            manifest_format: ManifestFormat::InstructionsDoc,
            global_path: Some(home.join(".codex/skills")),
            project_relative_path: ".codex/skills",
            detection_markers: &[".codex", "AGENTS.md"],
            priority: 1,
            requires_conversion: false,
            instructions_file: Some("AGENTS.md"),
            global_instructions_file: Some(home.join(".codex/AGENTS.md")),
            agent_dir: None,
            global_agent_dir: None,
        },
        ToolConfig {
            id: "cursor",
            display_name: "Cursor",
            manifest_format: ManifestFormat::RulesDoc,
            global_path: Some(home.join(".cursor/skills")),
            project_relative_path: ".cursor/skills",
            detection_markers: &[".cursor", ".cursorrules"],
            priority: 2,
            requires_conversion: false,
            instructions_file: Some(".cursorrules"),
            global_instructions_file: None,
            agent_dir: None,
            global_agent_dir: None,
        },
        ToolConfig {
            id: "gemini-cli",
            display_name: "Gemini CLI",
            manifest_format: ManifestFormat::InstructionsDoc,
            global_path: Some(home.join(".gemini/skills")),
            project_relative_path: ".gemini/skills",
            detection_markers: &[".gemini", "GEMINI.md"],
            priority: 3,
            requires_conversion: false,
            instructions_file: Some("GEMINI.md"),
            global_instructions_file: Some(home.join(".gemini/GEMINI.md")),
            agent_dir: None,
            global_agent_dir: None,
        },
        ToolConfig {
            id: "opencode",
            display_name: "opencode",
            manifest_format: ManifestFormat::AgentJson,
            global_path: Some(home.join(".config/opencode/skills")),
            project_relative_path: ".opencode/skills",
            detection_markers: &[".opencode"],
            priority: 4,
            requires_conversion: true,
            instructions_file: None,
            global_instructions_file: None,
            agent_dir: Some(".opencode/agent"),
            global_agent_dir: Some(home.join(".config/opencode/agent")),
        },
        ToolConfig {
            id: "windsurf",
            display_name: "Windsurf",
            manifest_format: ManifestFormat::RulesDoc,
            global_path: Some(home.join(".codeium/windsurf/skills")),
            project_relative_path: ".windsurf/skills",
            detection_markers: &[".windsurf", ".windsurfrules"],
            priority: 5,
            requires_conversion: false,
            instructions_file: Some(".windsurfrules"),
            global_instructions_file: Some(home.join(".codeium/windsurf/memories/global_rules.md")),
            agent_dir: None,
            global_agent_dir: None,
        },
        ToolConfig {
            id: "cline",
            display_name: "Cline",
            manifest_format: ManifestFormat::RulesDoc,
            global_path: None,
            project_relative_path: ".cline/skills",
            detection_markers: &[".clinerules"],
            priority: 6,
            requires_conversion: false,
            instructions_file: Some(".clinerules"),
            global_instructions_file: None,
            agent_dir: None,
            global_agent_dir: None,
        },
        ToolConfig {
            id: "github-copilot",
            display_name: "GitHub Copilot",
            manifest_format: ManifestFormat::InstructionsDoc,
            global_path: None,
            project_relative_path: ".github/skills",
            detection_markers: &[".github/copilot-instructions.md"],
            priority: 7,
            requires_conversion: false,
            instructions_file: Some(".github/copilot-instructions.md"),
            global_instructions_file: None,
            agent_dir: None,
            global_agent_dir: None,
        },
        ToolConfig {
            id: "aider",
            display_name: "Aider",
            manifest_format: ManifestFormat::InstructionsDoc,
            global_path: Some(home.join(".aider/skills")),
            project_relative_path: ".aider/skills",
            detection_markers: &[".aider.conf.yml", "CONVENTIONS.md"],
            priority: 8,
            requires_conversion: false,
            instructions_file: Some("CONVENTIONS.md"),
            global_instructions_file: None,
            agent_dir: None,
            global_agent_dir: None,
        },
        ToolConfig {
            id: "continue",
            display_name: "Continue",
            manifest_format: ManifestFormat::RulesDoc,
            global_path: Some(home.join(".continue/skills")),
            project_relative_path: ".continue/skills",
            detection_markers: &[".continue"],
            priority: 9,
            requires_conversion: false,
            instructions_file: Some(".continue/rules/skillsync.md"),
            global_instructions_file: Some(home.join(".continue/rules/skillsync.md")),
            agent_dir: None,
            global_agent_dir: None,
        },
        ToolConfig {
            id: "zed",
            display_name: "Zed",
            manifest_format: ManifestFormat::RulesDoc,
            global_path: Some(home.join(".config/zed/skills")),
            project_relative_path: ".zed/skills",
            detection_markers: &[".zed", ".rules"],
            priority: 10,
            requires_conversion: false,
            instructions_file: Some(".rules"),
            global_instructions_file: None,
            agent_dir: None,
            global_agent_dir: None,
        },
        ToolConfig {
            id: "roo",
            display_name: "Roo Code",
            manifest_format: ManifestFormat::RulesDoc,
            global_path: None,
            project_relative_path: ".roo/skills",
            detection_markers: &[".roo", ".roorules"],
            priority: 11,
            requires_conversion: false,
            instructions_file: Some(".roorules"),
            global_instructions_file: None,
            agent_dir: None,
            global_agent_dir: None,
        },
        ToolConfig {
            id: "amp",
            display_name: "Amp",
            manifest_format: ManifestFormat::InstructionsDoc,
            global_path: Some(home.join(".config/amp/skills")),
            project_relative_path: ".amp/skills",
            detection_markers: &[".amp", "AGENT.md"],
            priority: 12,
            requires_conversion: false,
            instructions_file: Some("AGENT.md"),
            global_instructions_file: Some(home.join(".config/amp/AGENT.md")),
            agent_dir: None,
            global_agent_dir: None,
        },
    ]
}
