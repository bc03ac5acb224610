//! memory-master-mind CLI: the user-facing command-line interface.

use std::path::{Path, PathBuf};
use std::process;
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod tui;

#[derive(Parser)]
#[command(name = "mmm", version, about = "Memory Master Mind: memory training in the terminal")]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Settings database path (overrides config and MMM_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive trainer
    Play {
        /// Challenge to open ("static", "timed", "math", "quotes")
        #[arg(long)]
        challenge: Option<String>,

        /// Keep settings in memory only
        #[arg(long)]
        ephemeral: bool,
    },

    /// Show or edit challenge and app settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },

    /// Summarize the stats log
    Stats {
        /// Stats CSV file (defaults to the configured stats_path)
        #[arg(long)]
        path: Option<PathBuf>,
    },

    /// Check a quote source
    Quotes {
        /// Quote CSV file (defaults to the configured source)
        #[arg(long)]
        path: Option<PathBuf>,

        /// Count quotes with at most this many words
        #[arg(long)]
        words_max: Option<u32>,
    },

    /// Create a starter mmm.toml
    Init,
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Print stored settings as JSON
    Show {
        /// Challenge name or "app"; all records when omitted
        target: Option<String>,
    },
    /// Set fields, e.g. `mmm settings set math negatives=True operations=+-`
    Set {
        /// Challenge name or "app"
        target: String,
        /// key=value pairs
        #[arg(required = true)]
        fields: Vec<String>,
    },
    /// Restore default settings
    Reset {
        /// Challenge name or "app"
        target: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    if let Commands::Init = cli.command {
        init_logging(None)?;
        return commands::init::execute();
    }

    let config = commands::load_config(cli.config.as_deref(), cli.db)?;
    let log_file =
        matches!(cli.command, Commands::Play { .. }).then_some(config.log_file.as_path());
    init_logging(log_file)?;

    match cli.command {
        Commands::Play {
            challenge,
            ephemeral,
        } => commands::play::execute(&config, challenge, ephemeral).await,
        Commands::Settings { action } => match action {
            SettingsAction::Show { target } => commands::settings::show(&config, target),
            SettingsAction::Set { target, fields } => {
                commands::settings::set(&config, &target, &fields)
            }
            SettingsAction::Reset { target } => commands::settings::reset(&config, &target),
        },
        Commands::Stats { path } => commands::stats::execute(&config, path),
        Commands::Quotes { path, words_max } => {
            commands::quotes::execute(&config, path, words_max)
        }
        Commands::Init => commands::init::execute(),
    }
}

/// Log to stderr, or to `log_file` while the terminal UI owns the screen.
fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mmm=info"));

    let result = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file: {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init(),
    };
    result.map_err(|e| anyhow!("failed to initialise logging: {e}"))
}
