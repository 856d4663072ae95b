//! sicct-replay: turn SICCT APDU captures into signed card scenarios

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod service;
mod utils;

use commands::*;

#[derive(Parser)]
#[command(version, about = "Replay SICCT APDU captures as signed card scenarios")]
struct Cli {
    /// Configuration file (default: sicct.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Debug level output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> eyre::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    let config = config::load_config(cli.config.as_deref())?;

    match &cli.command {
        Commands::Extract {
            capture,
            all,
            detailed,
        } => extract_command(capture, *all, *detailed)?,
        Commands::Scenario { source, session_id } => {
            scenario_command(&config, source, session_id.as_deref())?
        }
        Commands::Sign { source, session_id } => {
            sign_command(&config, source, session_id.as_deref())?
        }
        Commands::Send {
            source,
            card_handle,
            dry_run,
        } => send_command(&config, source, card_handle.as_deref(), *dry_run)?,
    }

    Ok(())
}

fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .init();
}
