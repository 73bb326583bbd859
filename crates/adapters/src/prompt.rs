//! Aggregate "available skills" block generation.
//!
//! Each manifest format gets the markup its tool prefers: a structured
//! tag block for rules files, Markdown between sentinel comments for
//! instructions documents, and embedded JSON for agent-definition
//! formats. All of them instruct the agent to read skills on demand via
//! the CLI instead of preloading their content.

use serde::Serialize;
use skillsync_skills::Skill;
use skillsync_tools::ManifestFormat;

use crate::section::{SECTION_END, SECTION_START};

/// Priority attribute stamped on generated tag blocks.
pub const SECTION_PRIORITY: &str = "high";

const USAGE_MD: &str = "Run `skillsync read <name>` to load a skill's full instructions \
when a task matches its description. Use `skillsync list` and `skillsync search <query>` \
to explore. Read skills on demand instead of preloading them.";

const USAGE_TAG: &str = "Run `skillsync read NAME` to load a skill's full instructions \
when a task matches its description. Use `skillsync list` and `skillsync search QUERY` \
to explore. Read skills on demand instead of preloading them.";

/// Render the aggregate block for `format`.
///
/// Returns an empty string when there are no skills to describe.
#[must_use]
pub fn generate(skills: &[Skill], format: ManifestFormat) -> String {
    if skills.is_empty() {
        return String::new();
    }
    match format {
        ManifestFormat::RulesDoc => generate_tag_block(skills),
        ManifestFormat::AgentJson => generate_json_block(skills),
        ManifestFormat::NativeManifest | ManifestFormat::InstructionsDoc => {
            generate_markdown_block(skills)
        },
    }
}

fn generate_markdown_block(skills: &[Skill]) -> String {
    let mut out = String::new();
    out.push_str(SECTION_START);
    out.push_str("\n## Available skills\n\n");
    out.push_str(USAGE_MD);
    out.push_str("\n\n");
    for skill in skills {
        out.push_str(&format!(
            "- **{}** ({}): {}\n",
            skill.name, skill.location, skill.description
        ));
    }
    out.push_str(SECTION_END);
    out
}

fn generate_tag_block(skills: &[Skill]) -> String {
    let mut out = String::new();
    out.push_str(&format!("<skills priority=\"{SECTION_PRIORITY}\">\n"));
    out.push_str(&format!("  <usage>{USAGE_TAG}</usage>\n"));
    for skill in skills {
        out.push_str("  <skill>\n");
        out.push_str(&format!("    <name>{}</name>\n", escape_markup(&skill.name)));
        out.push_str(&format!(
            "    <description>{}</description>\n",
            escape_markup(&skill.description)
        ));
        out.push_str(&format!("    <location>{}</location>\n", skill.location));
        out.push_str("  </skill>\n");
    }
    out.push_str("</skills>");
    out
}

#[derive(Serialize)]
struct SkillEntry<'a> {
    name: &'a str,
    description: &'a str,
    location: String,
}

fn generate_json_block(skills: &[Skill]) -> String {
    let entries: Vec<SkillEntry<'_>> = skills
        .iter()
        .map(|s| SkillEntry {
            name: &s.name,
            description: &s.description,
            location: s.location.to_string(),
        })
        .collect();
    let json = serde_json::to_string_pretty(&entries).unwrap_or_default();

    let mut out = String::new();
    out.push_str(SECTION_START);
    out.push_str("\nAvailable skills. ");
    out.push_str(USAGE_MD);
    out.push_str("\n\n```json\n");
    out.push_str(&json);
    out.push_str("\n```\n");
    out.push_str(SECTION_END);
    out
}

fn escape_markup(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
