//! CLI commands for plugin management.

use std::path::{Path, PathBuf};

use {
    clap::Subcommand,
    skillsync_plugins::{PluginKind, install_plugin, load_plugins, uninstall_plugin},
};

#[derive(Subcommand)]
pub enum PluginAction {
    /// List installed plugins.
    List {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Install a plugin from a local directory.
    Add {
        /// Directory containing plugin.json.
        path: PathBuf,
    },
    /// Uninstall a plugin by name.
    Remove {
        /// Plugin name.
        name: String,
    },
}

pub async fn handle_plugin(action: PluginAction, plugins_root: &Path) -> anyhow::Result<()> {
    match action {
        PluginAction::List { json } => {
            let plugins = load_plugins(plugins_root);

            if json {
                let entries: Vec<serde_json::Value> = plugins
                    .iter()
                    .map(|p| {
                        serde_json::json!({
                            "name": p.manifest.name,
                            "version": p.manifest.version,
                            "type": p.manifest.kind,
                            "description": p.manifest.description,
                            "path": p.path,
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&entries)?);
                return Ok(());
            }
            if plugins.is_empty() {
                println!("No plugins installed.");
                println!(
                    "Place one under {} or run 'skillsync plugin add <dir>'.",
                    plugins_root.display()
                );
                return Ok(());
            }
            for plugin in &plugins {
                let m = &plugin.manifest;
                println!("  {} v{} [{}] — {}", m.name, m.version, m.kind, m.description);
                if m.kind == PluginKind::Hook {
                    let events: Vec<&str> =
                        m.hook_events().iter().map(|e| e.as_str()).collect();
                    println!("    events: {}", events.join(", "));
                }
            }
        },
        PluginAction::Add { path } => {
            let plugin = install_plugin(&path, plugins_root).await?;
            println!(
                "Installed plugin '{}' v{} ({}).",
                plugin.manifest.name, plugin.manifest.version, plugin.manifest.kind
            );
        },
        PluginAction::Remove { name } => {
            uninstall_plugin(&name, plugins_root).await?;
            println!("Removed plugin '{name}'.");
        },
    }
    Ok(())
}
