//! Sylo CLI
//!
//! Command-line transport for the Sylo orchestrator

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use sylo_core::logging_facility;

mod app;
mod commands;
mod config;
mod transport;

#[derive(Debug, Parser)]
#[command(name = "sylo")]
#[command(about = "Sylo - Command orchestration", long_about = None)]
struct Cli {
    /// TOML configuration file (defaults to $SYLO_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    identity: app::IdentityArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Dispatch one command and print its response envelope
    Exec(commands::exec::ExecArgs),
    /// Dispatch a JSON array of commands
    Batch(commands::batch::BatchArgs),
    /// List the commands available to the caller
    Commands(commands::introspect::CommandsArgs),
    /// Print documentation for every registered command
    Docs,
    /// Report orchestrator health
    Health,
}

async fn run(cli: Cli) -> anyhow::Result<i32> {
    let config = config::AppConfig::load(cli.config.as_deref())?;
    logging_facility::init(config.log.profile);

    let orchestrator = app::build_orchestrator(&config)?;

    match cli.command {
        Commands::Exec(args) => commands::exec::execute(args, &orchestrator, &cli.identity).await,
        Commands::Batch(args) => commands::batch::execute(args, &orchestrator, &cli.identity).await,
        Commands::Commands(args) => {
            commands::introspect::commands(args, &orchestrator, &cli.identity).await
        }
        Commands::Docs => commands::introspect::docs(&orchestrator),
        Commands::Health => commands::health::execute(&orchestrator).await,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}
