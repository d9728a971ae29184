use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use glide_core::AppConfig;

mod commands;

#[derive(Parser)]
#[command(name = "glide")]
#[command(author, version, about = "Drag, spring and autoplay motion engine playground")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Use this configuration file instead of ~/.config/glide/config.toml
    #[arg(short = 'c', long = "config", global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive carousel
    Run,
    /// Replay a scripted event file and print the resulting frames
    Simulate {
        /// Script file (.toml or .json)
        file: PathBuf,
        /// Print the trace as JSON
        #[arg(long)]
        json: bool,
    },
    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the configuration file path
    Path,
    /// Print the effective configuration
    Show,
    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Validate a configuration file
    Check {
        /// File to check (defaults to the configuration path)
        file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            let config = Arc::new(load_config(config_path)?);
            // The alternate screen owns the terminal, so logs go to a file
            init_logging(Some(config.log_path()), &config.general.log_level)?;
            commands::run::run(config).await
        }
        Commands::Simulate { file, json } => {
            let config = load_config(config_path)?;
            init_logging(None, &config.general.log_level)?;
            commands::simulate::run(&file, json)
        }
        // Loads on its own: reporting a broken file is the point of `check`
        Commands::Config { action } => {
            init_logging(None, "warn")?;
            match action {
                ConfigAction::Path => commands::config::path(config_path),
                ConfigAction::Show => commands::config::show(&load_config(config_path)?),
                ConfigAction::Init { force } => commands::config::init(config_path, force),
                ConfigAction::Check { file } => {
                    commands::config::check(file.as_deref().or(config_path))
                }
            }
        }
    }
}

fn load_config(path: Option<&std::path::Path>) -> Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };
    config.context("Failed to load configuration")
}

/// Initialize logging to stderr, or to `log_file` when the TUI is active
fn init_logging(log_file: Option<PathBuf>, default_level: &str) -> Result<()> {
    let filter = EnvFilter::new(std::env::var("RUST_LOG").unwrap_or_else(|_| default_level.into()));
    let registry = tracing_subscriber::registry().with(filter);

    match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_target(false)
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .init();
        }
        None => {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_target(false)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
    }

    Ok(())
}
