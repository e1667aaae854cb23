mod commands;
mod logging;
mod render;
mod utils;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use meetsync_core::{Settings, SourceFormat};

#[derive(Parser)]
#[command(name = "meetsync")]
#[command(about = "Turn upcoming calendar meetings into Reminders and on-screen alerts")]
#[command(version)]
struct Cli {
    /// Use this config file instead of ~/.config/meetsync/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create reminders for meetings in the sync horizon
    Sync {
        /// Override the configured source kind
        #[arg(short, long, value_enum)]
        source: Option<SourceKind>,
    },
    /// Poll the calendar and show an alert shortly before each meeting
    Watch,
    /// List events that already have a reminder
    Ledger,
    /// Show configuration and file locations
    Config,
}

#[derive(Clone, Copy, ValueEnum)]
enum SourceKind {
    Ical,
    GoogleApi,
}

impl From<SourceKind> for SourceFormat {
    fn from(kind: SourceKind) -> Self {
        match kind {
            SourceKind::Ical => SourceFormat::Ical,
            SourceKind::GoogleApi => SourceFormat::GoogleApi,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let created_config = match &cli.config {
        Some(_) => None,
        None => Some(Settings::config_path()?).filter(|path| !path.exists()),
    };

    let settings = match &cli.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };

    // One-shot commands print their own summary; keep the terminal quiet.
    let terminal_level = match cli.command {
        Commands::Watch => "info",
        _ => "warn",
    };
    let _log_guard = logging::init(settings.log_file().as_deref(), terminal_level)?;

    if let Some(path) = &created_config {
        eprintln!("{}", commands::config::created_notice(path));
    }

    match cli.command {
        Commands::Sync { source } => commands::sync::run(settings, source.map(Into::into)).await,
        Commands::Watch => commands::watch::run(settings).await,
        Commands::Ledger => commands::ledger::run(&settings),
        Commands::Config => commands::config::run(&settings, cli.config.as_deref()),
    }
}
