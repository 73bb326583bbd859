//! CLI commands that drive the sync engine: install, remove, update, sync.

use {
    skillsync_sync::{InstallOptions, SyncEngine, SyncReport},
    skillsync_tools::Scope,
};

fn install_options(tool: Option<String>, scope: Option<String>) -> anyhow::Result<InstallOptions> {
    let scope = scope.map(|s| s.parse::<Scope>()).transpose()?;
    Ok(InstallOptions { tool, scope })
}

pub async fn handle_add(
    engine: &SyncEngine,
    source: &str,
    tool: Option<String>,
    scope: Option<String>,
) -> anyhow::Result<()> {
    let options = install_options(tool, scope)?;
    let result = engine.install_skill(source, &options).await?;

    if result.installed.is_empty() {
        eprintln!(
            "'{}' could not be installed into any tool ({} target(s) failed).",
            result.skill, result.failed_count
        );
        std::process::exit(1);
    }
    for target in &result.installed {
        println!(
            "Installed '{}' for {} ({}) at {}",
            result.skill,
            target.tool_id,
            target.scope,
            target.path.display()
        );
    }
    if result.failed_count > 0 {
        eprintln!("{} target(s) failed; re-run with --log-level info for details.", result.failed_count);
    }
    Ok(())
}

pub async fn handle_remove(
    engine: &SyncEngine,
    name: &str,
    tool: Option<String>,
    scope: Option<String>,
) -> anyhow::Result<()> {
    let options = install_options(tool, scope)?;
    let result = engine.remove_skill(name, &options).await?;

    if result.removed.is_empty() {
        println!("'{name}' was not installed.");
        return Ok(());
    }
    for target in &result.removed {
        println!("Removed '{}' from {} ({})", result.skill, target.tool_id, target.scope);
    }
    Ok(())
}

pub async fn handle_update(engine: &SyncEngine, names: &[String]) -> anyhow::Result<()> {
    let filter = if names.is_empty() { None } else { Some(names) };
    let report = engine.update(filter).await?;

    for name in &report.updated {
        println!("Updated '{name}'.");
    }
    for name in &report.skipped {
        println!("Skipped '{name}' (not managed by skillsync).");
    }
    for name in &report.failed {
        eprintln!("Failed to update '{name}'.");
    }
    if report.updated.is_empty() && report.skipped.is_empty() && report.failed.is_empty() {
        println!("Nothing to update.");
    }
    if !report.failed.is_empty() {
        std::process::exit(1);
    }
    Ok(())
}

pub async fn handle_outdated(engine: &SyncEngine, json: bool) -> anyhow::Result<()> {
    let outdated = engine.outdated().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outdated)?);
        return Ok(());
    }
    if outdated.is_empty() {
        println!("Everything is up to date.");
        return Ok(());
    }
    for skill in &outdated {
        let current = skill.current.as_deref().unwrap_or("unknown");
        println!("  {}: {} -> {} [{}]", skill.name, current, skill.latest, skill.source);
    }
    Ok(())
}

pub async fn handle_sync(
    engine: &SyncEngine,
    tool: Option<&str>,
    watch: bool,
) -> anyhow::Result<()> {
    let report = engine.sync(tool).await?;
    print_sync_report(&report);

    if watch {
        #[cfg(feature = "file-watcher")]
        return watch_and_sync(engine, tool).await;
        #[cfg(not(feature = "file-watcher"))]
        anyhow::bail!("this build does not include file watching");
    }
    Ok(())
}

fn print_sync_report(report: &SyncReport) {
    println!("Synced {} tool(s).", report.synced_tools);
    for doc in &report.docs {
        println!("  updated {}", doc.display());
    }
    for path in &report.pruned_descriptors {
        println!("  pruned {}", path.display());
    }
}

#[cfg(feature = "file-watcher")]
async fn watch_and_sync(engine: &SyncEngine, tool: Option<&str>) -> anyhow::Result<()> {
    use skillsync_sync::SkillWatcher;

    let roots = engine.discovery_roots();
    let (_watcher, mut changes) = SkillWatcher::start(&roots)?;
    println!("Watching skill directories; press ctrl-c to stop.");

    while changes.recv().await.is_some() {
        match engine.sync(tool).await {
            Ok(report) => print_sync_report(&report),
            Err(e) => eprintln!("sync failed: {e}"),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_flag_parses() {
        let options = install_options(Some("codex".to_string()), Some("global".to_string())).unwrap();
        assert_eq!(options.tool.as_deref(), Some("codex"));
        assert_eq!(options.scope, Some(Scope::Global));
    }

    #[test]
    fn bad_scope_flag_is_rejected() {
        assert!(install_options(None, Some("user".to_string())).is_err());
    }
}
