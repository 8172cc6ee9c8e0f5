mod cli;
mod commands;
mod output;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use phasesync_api::DynTrackerApi;
use phasesync_cli::config::loader::{DEFAULT_CONFIG_FILE, load_config};
use phasesync_cli::{AppConfig, observability};
use phasesync_engine::{Reconciler, ReconcilerOptions};
use phasesync_http::HttpTrackerClient;

use cli::{Cli, Commands, ConfigCommands};
use output::print_error;

#[tokio::main]
async fn main() {
    // Load .env if present
    let _ = dotenvy::dotenv();

    if let Err(e) = run().await {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let format = cli.format.unwrap_or_default();

    let cfg = load_config(cli.config.as_deref()).map_err(anyhow::Error::msg)?;
    observability::init_tracing_with_level(&cfg.logging.level);

    match &cli.command {
        Commands::Apply(args) => {
            let reconciler = make_reconciler(&cli, &cfg, args.project.as_deref())?;
            commands::reconcile::apply(&reconciler, args.phase_type, &args.file, format).await?;
        }
        Commands::Plan(args) => {
            let reconciler = make_reconciler(&cli, &cfg, args.project.as_deref())?;
            commands::reconcile::plan(&reconciler, args.phase_type, &args.file, format).await?;
        }
        Commands::Show(args) => {
            let api = make_api(&cli, &cfg)?;
            let project = args
                .project
                .as_deref()
                .or(cfg.reconcile.project_scope.as_deref());
            commands::show::show(api.as_ref(), args.phase_type, project, format).await?;
        }
        Commands::Config(args) => match &args.command {
            ConfigCommands::Show => {
                commands::config::show(&cfg, config_source(&cli).as_deref(), format)?;
            }
        },
    }

    Ok(())
}

fn make_api(cli: &Cli, cfg: &AppConfig) -> Result<DynTrackerApi> {
    let server = cli
        .server
        .clone()
        .or_else(|| cfg.api.base_url.clone())
        .context(
            "No tracker URL configured. Use --server, set PHASESYNC_URL, or set api.base_url in phasesync.toml",
        )?;
    let client = HttpTrackerClient::new(cfg.api.client_settings(server))?;
    tracing::debug!(base_url = client.base_url(), "Tracker client ready");
    Ok(Arc::new(client))
}

fn make_reconciler(cli: &Cli, cfg: &AppConfig, project: Option<&str>) -> Result<Reconciler> {
    let api = make_api(cli, cfg)?;
    let options = ReconcilerOptions {
        project_scope: project
            .map(str::to_string)
            .or_else(|| cfg.reconcile.project_scope.clone()),
    };
    Ok(Reconciler::with_options(api, options))
}

fn config_source(cli: &Cli) -> Option<String> {
    match &cli.config {
        Some(path) => Some(path.clone()),
        None => Path::new(DEFAULT_CONFIG_FILE)
            .exists()
            .then(|| DEFAULT_CONFIG_FILE.to_string()),
    }
}
