//! CLI commands for inspecting skills, dependencies, and tools.

use std::collections::HashSet;

use {
    skillsync_fetch::RegistryClient,
    skillsync_skills::{FsSkillScanner, Skill, SkillDiscoverer, deps, parse_skill},
    skillsync_sync::SyncEngine,
};

fn scanner(engine: &SyncEngine) -> FsSkillScanner {
    FsSkillScanner::new(engine.registry().clone(), engine.working_dir())
}

fn find_skill<'a>(skills: &'a [Skill], name: &str) -> Option<&'a Skill> {
    skills.iter().find(|s| s.name.eq_ignore_ascii_case(name))
}

pub async fn handle_list(
    engine: &SyncEngine,
    tool: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let skills = scanner(engine).discover(tool).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&skills)?);
        return Ok(());
    }
    if skills.is_empty() {
        println!("No skills found.");
        return Ok(());
    }
    for skill in &skills {
        let version = skill
            .version
            .as_deref()
            .map(|v| format!(" v{v}"))
            .unwrap_or_default();
        println!(
            "  {}{} — {} [{}, {}]",
            skill.name, version, skill.description, skill.tool_id, skill.location
        );
    }
    Ok(())
}

pub async fn handle_search(registry_url: &str, query: &str, json: bool) -> anyhow::Result<()> {
    let entries = RegistryClient::new(registry_url).search(query).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }
    if entries.is_empty() {
        println!("No skills matching '{query}'.");
        return Ok(());
    }
    for entry in &entries {
        let version = entry
            .version
            .as_deref()
            .map(|v| format!(" v{v}"))
            .unwrap_or_default();
        println!("  {}{} — {} [{}]", entry.name, version, entry.description, entry.source);
    }
    Ok(())
}

pub async fn handle_read(engine: &SyncEngine, names: &[String]) -> anyhow::Result<()> {
    let skills = scanner(engine).discover(None).await?;

    let mut missing = false;
    for name in names {
        let Some(skill) = find_skill(&skills, name) else {
            eprintln!("Skill '{name}' not found.");
            missing = true;
            continue;
        };

        let content = parse_skill(&std::fs::read_to_string(&skill.path)?)?;
        println!("Name:        {}", skill.name);
        println!("Description: {}", skill.description);
        if let Some(ref version) = skill.version {
            println!("Version:     {version}");
        }
        if let Some(ref author) = skill.author {
            println!("Author:      {author}");
        }
        println!("Path:        {}", skill.path.display());
        if !content.body.trim().is_empty() {
            println!("\n{}", content.body.trim());
        }
        println!();
    }

    if missing {
        std::process::exit(1);
    }
    Ok(())
}

pub async fn handle_deps(engine: &SyncEngine, name: &str, json: bool) -> anyhow::Result<()> {
    let skills = scanner(engine).discover(None).await?;
    let Some(skill) = find_skill(&skills, name) else {
        eprintln!("Skill '{name}' not found.");
        std::process::exit(1);
    };

    let installed: Vec<String> = skills.iter().map(|s| s.name.clone()).collect();
    let report = deps::check(&skill.path, &installed);

    let lookup = |dep: &str| find_skill(&skills, dep).map(|s| s.path.clone());
    let mut visited = HashSet::new();
    let closure = deps::resolve_transitive(&skill.path, &lookup, &mut visited);

    if json {
        let out = serde_json::json!({
            "skill": skill.name,
            "satisfied": report.satisfied,
            "missing": report.missing,
            "optional_missing": report.optional_missing,
            "closure": closure,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else if closure.is_empty() {
        println!("'{}' has no dependencies.", skill.name);
    } else {
        println!("Dependencies of '{}':", skill.name);
        for dep in &closure {
            let mark = if find_skill(&skills, &dep.name).is_some() {
                "✓"
            } else {
                "✗"
            };
            let optional = if dep.optional { " (optional)" } else { "" };
            println!("  {mark} {}{optional}", dep.name);
        }
    }

    if !report.satisfied {
        if !json {
            let names: Vec<&str> = report.missing.iter().map(|d| d.name.as_str()).collect();
            println!("Missing required: {}", names.join(", "));
        }
        std::process::exit(1);
    }
    Ok(())
}

pub async fn handle_manage(engine: &SyncEngine, json: bool) -> anyhow::Result<()> {
    let statuses = engine.status().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&statuses)?);
        return Ok(());
    }
    for tool in &statuses {
        let marker = if tool.detected { "●" } else { "○" };
        println!("{marker} {} ({})", tool.display_name, tool.tool_id);
        if tool.skills.is_empty() {
            println!("    no skills installed");
            continue;
        }
        for skill in &tool.skills {
            let version = skill
                .version
                .as_deref()
                .map(|v| format!(" v{v}"))
                .unwrap_or_default();
            let origin = skill.source.as_deref().unwrap_or("unmanaged");
            println!("    {}{} [{}] — {}", skill.name, version, skill.scope, origin);
        }
    }
    Ok(())
}
