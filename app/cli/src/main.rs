//! plugsync - keep plugin install and enable state in sync across scopes.

mod config;
mod logging;
mod output;
mod serve;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use clap::Subcommand;
use serde::Serialize;
use tokio::task::JoinHandle;

use plugsync_plugin::BulkReport;
use plugsync_plugin::ClaudePaths;
use plugsync_plugin::CliCommandExecutor;
use plugsync_plugin::ConfigStore;
use plugsync_plugin::FsMarketplaceScanner;
use plugsync_plugin::LocalExecutor;
use plugsync_plugin::MarketplaceScanner;
use plugsync_plugin::MergedPlugin;
use plugsync_plugin::PluginCommandExecutor;
use plugsync_plugin::PluginOrchestrator;
use plugsync_plugin::PluginScope;
use plugsync_plugin::ToggleOutcome;

use crate::config::CliConfig;
use crate::config::ConfigOverrides;
use crate::config::ExecutorKind;
use crate::config::default_config_path;
use crate::config::load_config;
use crate::logging::init_logging;

#[derive(Parser)]
#[command(name = "plugsync")]
#[command(about = "Install, enable and update Claude plugins per scope")]
struct Cli {
    /// Workspace root for project and local scopes (default: current directory)
    #[arg(long, global = true)]
    project: Option<PathBuf>,

    /// Scope for install/enable/disable/update: user, project or local
    #[arg(long, global = true, default_value = "user")]
    scope: PluginScope,

    /// How changes are applied (overrides the config file)
    #[arg(long, global = true, value_enum)]
    executor: Option<ExecutorKind>,

    /// Path to config file (default: ~/.claude/plugsync.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Per-command timeout for the CLI executor
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List installed plugins
    List,

    /// List every plugin offered by known marketplaces
    Available,

    /// Install a plugin (installing also enables it)
    Install {
        /// Plugin id (name@marketplace)
        plugin_id: String,
    },

    /// Enable a plugin, installing it first if needed
    Enable {
        /// Plugin id (name@marketplace)
        plugin_id: String,
    },

    /// Disable a plugin
    Disable {
        /// Plugin id (name@marketplace)
        plugin_id: String,
    },

    /// Update an installed plugin
    Update {
        /// Plugin id (name@marketplace)
        plugin_id: String,
    },

    /// Update every installed plugin
    UpdateAll,

    /// Enable every plugin of a marketplace
    EnableMarketplace {
        /// Marketplace name
        name: String,
    },

    /// Disable every plugin of a marketplace in all scopes
    DisableMarketplace {
        /// Marketplace name
        name: String,
    },

    /// Show resources declared by more than one installed plugin
    Conflicts,

    /// Answer newline-delimited JSON requests on stdin
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let paths = ClaudePaths::discover()?;
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| default_config_path(&paths));
    let config = load_config(&config_path)?.with_overrides(&ConfigOverrides {
        executor: cli.executor,
        timeout_secs: cli.timeout_secs,
    });
    init_logging(&config.logging);

    // Canonicalize so records compare equal regardless of how the path was typed.
    let project = cli
        .project
        .clone()
        .or_else(|| std::env::current_dir().ok())
        .map(|p| p.canonicalize().unwrap_or(p));

    let orchestrator = build_orchestrator(paths, &config, project);
    run(&cli, &orchestrator).await
}

fn build_orchestrator(
    paths: ClaudePaths,
    config: &CliConfig,
    project: Option<PathBuf>,
) -> PluginOrchestrator {
    let store = ConfigStore::on_disk(paths);
    let scanner: Arc<dyn MarketplaceScanner> =
        Arc::new(FsMarketplaceScanner::new(store.paths().marketplaces_dir()));
    let executor: Arc<dyn PluginCommandExecutor> = match config.executor.kind {
        ExecutorKind::Cli => Arc::new(
            CliCommandExecutor::new(project.clone())
                .with_program(&config.executor.program)
                .with_timeout(config.executor.timeout()),
        ),
        ExecutorKind::Local => Arc::new(LocalExecutor::new(
            store.clone(),
            Arc::clone(&scanner),
            project.clone(),
        )),
    };
    tracing::debug!(executor = ?config.executor.kind, project = ?project, "Built orchestrator");
    PluginOrchestrator::new(store, executor, scanner, project)
}

async fn run(cli: &Cli, orchestrator: &PluginOrchestrator) -> anyhow::Result<()> {
    let scope = cli.scope;
    match &cli.command {
        Command::List => {
            let plugins: Vec<MergedPlugin> = orchestrator
                .refresh()
                .await?
                .into_iter()
                .filter(MergedPlugin::is_installed)
                .collect();
            emit(cli.json, &plugins, || output::render_plugins(&plugins))
        }
        Command::Available => {
            let plugins = orchestrator.list_available().await?;
            emit(cli.json, &plugins, || output::render_plugins(&plugins))
        }
        Command::Install { plugin_id } => {
            let outcome = orchestrator.install(plugin_id, scope).await?;
            emit_outcome(cli.json, plugin_id, outcome)
        }
        Command::Enable { plugin_id } => {
            let outcome = orchestrator.toggle(plugin_id, scope, true).await?;
            emit_outcome(cli.json, plugin_id, outcome)
        }
        Command::Disable { plugin_id } => {
            let outcome = orchestrator.toggle(plugin_id, scope, false).await?;
            emit_outcome(cli.json, plugin_id, outcome)
        }
        Command::Update { plugin_id } => {
            let outcome = orchestrator.update(plugin_id, scope).await?;
            emit_outcome(cli.json, plugin_id, outcome)
        }
        Command::UpdateAll => {
            let printer = spawn_progress_printer(cli.json, orchestrator);
            let report = orchestrator.update_all().await;
            printer.abort();
            emit_report(cli.json, report?)
        }
        Command::EnableMarketplace { name } => {
            let items = marketplace_items(orchestrator, name).await?;
            let printer = spawn_progress_printer(cli.json, orchestrator);
            let report = orchestrator.bulk_enable(name, &items, scope).await;
            printer.abort();
            emit_report(cli.json, report?)
        }
        Command::DisableMarketplace { name } => {
            let items = marketplace_items(orchestrator, name).await?;
            let printer = spawn_progress_printer(cli.json, orchestrator);
            let report = orchestrator.bulk_disable(name, &items).await;
            printer.abort();
            emit_report(cli.json, report?)
        }
        Command::Conflicts => {
            let conflicts = orchestrator.conflicts().await?;
            emit(cli.json, &conflicts, || output::render_conflicts(&conflicts))
        }
        Command::Serve => {
            serve::serve(
                orchestrator,
                tokio::io::BufReader::new(tokio::io::stdin()),
                tokio::io::stdout(),
            )
            .await
        }
    }
}

/// Ids of every plugin the marketplace offers or has installed.
async fn marketplace_items(
    orchestrator: &PluginOrchestrator,
    marketplace: &str,
) -> anyhow::Result<Vec<String>> {
    let items: Vec<String> = orchestrator
        .refresh()
        .await?
        .into_iter()
        .filter(|p| p.marketplace_name.as_deref() == Some(marketplace))
        .map(|p| p.id)
        .collect();
    if items.is_empty() {
        anyhow::bail!("No plugins found for marketplace '{marketplace}'");
    }
    Ok(items)
}

fn emit<T: Serialize>(json: bool, value: &T, human: impl FnOnce() -> String) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        print!("{}", human());
    }
    Ok(())
}

fn emit_outcome(json: bool, plugin_id: &str, outcome: ToggleOutcome) -> anyhow::Result<()> {
    emit(json, &outcome, || output::render_outcome(plugin_id, outcome))
}

/// Print the report; any failed item makes the command fail.
fn emit_report(json: bool, report: Option<BulkReport>) -> anyhow::Result<()> {
    emit(json, &report, || output::render_report(report.as_ref()))?;
    if let Some(report) = &report
        && !report.failed.is_empty()
    {
        anyhow::bail!("{} of {} item(s) failed", report.failed.len(), report.progress.total);
    }
    Ok(())
}

/// Echo bulk progress to stderr until aborted.
fn spawn_progress_printer(json: bool, orchestrator: &PluginOrchestrator) -> JoinHandle<()> {
    let mut progress = orchestrator.subscribe_progress();
    tokio::spawn(async move {
        if json {
            return;
        }
        while progress.changed().await.is_ok() {
            let event = progress.borrow_and_update().clone();
            if let Some(event) = event {
                let progress = event.progress;
                let done = if progress.is_complete() { " done" } else { "" };
                eprintln!("[{}/{}] {}{done}", progress.current, progress.total, progress.action);
            }
        }
    })
}
