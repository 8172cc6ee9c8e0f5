use clap::{Parser, Subcommand, ValueEnum};
use phasesync_core::PhaseType;

#[derive(Parser)]
#[command(name = "phasesync")]
#[command(about = "PhaseSync: reconcile project phases and deliverables with a tracker")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (defaults to ./phasesync.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Tracker base URL (overrides config and PHASESYNC_URL env var)
    #[arg(short, long, global = true, env = "PHASESYNC_URL")]
    pub server: Option<String>,

    /// Output format
    #[arg(short, long, global = true)]
    pub format: Option<OutputFormat>,
}

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Table,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Reconcile a phase with the desired state in a file
    Apply(ReconcileArgs),
    /// Show what `apply` would change, without writing
    Plan(ReconcileArgs),
    /// Show a phase and its active deliverables
    Show(ShowArgs),
    /// Inspect configuration
    Config(ConfigArgs),
}

#[derive(clap::Args)]
pub struct ReconcileArgs {
    /// Methodology of the phase (waterfall, scrum, kanban, hybrid)
    #[arg(short = 't', long = "type")]
    pub phase_type: PhaseType,
    /// Path to the desired-state JSON file (reads from stdin if omitted)
    #[arg(long)]
    pub file: Option<String>,
    /// Project scope (overrides reconcile.project_scope)
    #[arg(short = 'p', long)]
    pub project: Option<String>,
}

#[derive(clap::Args)]
pub struct ShowArgs {
    /// Methodology of the phase (waterfall, scrum, kanban, hybrid)
    #[arg(short = 't', long = "type")]
    pub phase_type: PhaseType,
    /// Project scope (overrides reconcile.project_scope)
    #[arg(short = 'p', long)]
    pub project: Option<String>,
}

#[derive(clap::Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration, secrets masked
    Show,
}
