use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "modeldb")]
#[command(about = "ModelDB syncer - records model training metadata into ModelDB", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sync the configured project, experiment and run, and print their ids
    Setup {
        /// Configuration file (defaults to <config dir>/modeldb/syncer.toml)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Use an in-memory store instead of connecting to ModelDB
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the resolved configuration as TOML
    Config {
        /// Configuration file (defaults to <config dir>/modeldb/syncer.toml)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Setup { config, dry_run } => {
            commands::setup::run(config.as_deref(), dry_run).await?
        }
        Commands::Config { config } => commands::config::show(config.as_deref())?,
    }

    Ok(())
}
