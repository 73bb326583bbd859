mod plugin_commands;
mod skill_commands;
mod sync_commands;

use std::path::Path;

use {
    clap::{Parser, Subcommand},
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use {
    skillsync_config::SyncConfig,
    skillsync_fetch::SourceResolver,
    skillsync_plugins::{HookRegistry, load_plugins},
    skillsync_sync::SyncEngine,
    skillsync_tools::ToolRegistry,
};

#[derive(Parser)]
#[command(
    name = "skillsync",
    about = "Skillsync — install and synchronize agent skills across tools",
    version,
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Custom data directory (overrides default ~/.skillsync).
    #[arg(long, global = true, env = "SKILLSYNC_DATA_DIR")]
    data_dir: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Install a skill from a source (GitHub repo, local path, or registry name).
    #[command(alias = "install")]
    Add {
        /// Source, e.g. owner/repo, owner/repo/sub/dir, ./local-skill, or a registry name.
        source: String,
        /// Install only for this tool instead of every detected one.
        #[arg(long)]
        tool: Option<String>,
        /// Installation scope: project or global.
        #[arg(long)]
        scope: Option<String>,
    },
    /// Remove an installed skill.
    Remove {
        /// Skill name.
        name: String,
        /// Remove only from this tool instead of every tool.
        #[arg(long)]
        tool: Option<String>,
        /// Only this scope: project or global.
        #[arg(long)]
        scope: Option<String>,
    },
    /// List discovered skills across tools.
    List {
        /// Restrict to one tool.
        #[arg(long)]
        tool: Option<String>,
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Search the skill registry.
    Search {
        /// Query matched against names and descriptions.
        query: String,
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Rewrite generated doc sections from the skills on disk.
    Sync {
        /// Restrict to one tool.
        #[arg(long)]
        tool: Option<String>,
        /// Keep watching skill directories and re-sync on changes.
        #[arg(long)]
        watch: bool,
    },
    /// Print skill manifests.
    Read {
        /// Skill names.
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Re-install tracked skills from their recorded sources.
    Update {
        /// Skill names; all tracked skills when omitted.
        names: Vec<String>,
    },
    /// Show the per-tool installation matrix.
    Manage {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Show a skill's dependencies and whether they are satisfied.
    Deps {
        /// Skill name.
        name: String,
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// List skills whose upstream moved past the installed revision.
    Outdated {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Plugin management.
    Plugin {
        #[command(subcommand)]
        action: plugin_commands::PluginAction,
    },
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr so they never corrupt --json output.
    if cli.json_logs {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

fn build_engine(working_dir: &Path, home: &Path, config: &SyncConfig) -> SyncEngine {
    let plugins = load_plugins(&config.plugins_root());
    let hooks = HookRegistry::from_plugins(&plugins);

    SyncEngine::new(
        ToolRegistry::with_home(home),
        Box::new(SourceResolver::new(config.registry_url())),
        working_dir,
        home,
    )
    .with_default_tool(config.default_tool.clone())
    .with_default_scope(config.default_scope)
    .with_hooks(hooks)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    if let Some(ref dir) = cli.data_dir {
        skillsync_config::set_data_dir(dir);
    }

    let working_dir = std::env::current_dir()?;
    let home = dirs_next::home_dir().unwrap_or_else(|| working_dir.clone());
    let config = skillsync_config::discover_and_load(&working_dir);
    let engine = build_engine(&working_dir, &home, &config);

    info!(version = env!("CARGO_PKG_VERSION"), "skillsync starting");

    match cli.command {
        Commands::Add { source, tool, scope } => {
            sync_commands::handle_add(&engine, &source, tool, scope).await
        },
        Commands::Remove { name, tool, scope } => {
            sync_commands::handle_remove(&engine, &name, tool, scope).await
        },
        Commands::List { tool, json } => {
            skill_commands::handle_list(&engine, tool.as_deref(), json).await
        },
        Commands::Search { query, json } => {
            skill_commands::handle_search(config.registry_url(), &query, json).await
        },
        Commands::Sync { tool, watch } => {
            sync_commands::handle_sync(&engine, tool.as_deref(), watch).await
        },
        Commands::Read { names } => skill_commands::handle_read(&engine, &names).await,
        Commands::Update { names } => sync_commands::handle_update(&engine, &names).await,
        Commands::Manage { json } => skill_commands::handle_manage(&engine, json).await,
        Commands::Deps { name, json } => skill_commands::handle_deps(&engine, &name, json).await,
        Commands::Outdated { json } => sync_commands::handle_outdated(&engine, json).await,
        Commands::Plugin { action } => {
            plugin_commands::handle_plugin(action, &config.plugins_root()).await
        },
    }
}
