//! RWE CLI - Reflective World Engine
//!
//! Drives a run from the terminal:
//! - run the reflective iteration loop against a model service or the simulator
//! - re-run the offline stages (clustering, epochs, atlas) on a run directory
//! - inspect the saved world state and run log

use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod error;
mod output;

use commands::{offline, run, status, Context};
use error::CliResult;

/// RWE CLI application
#[derive(Parser)]
#[command(name = "rwe")]
#[command(about = "RWE - Reflective World Engine", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "RWE_CONFIG")]
    config: Option<PathBuf>,

    /// Run output directory
    #[arg(short, long, env = "RWE_OUT", default_value = "outputs")]
    out: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Run the iteration loop, then cluster, segment and build the atlas
    Run(run::RunArgs),

    /// Cluster the run's embeddings into clusters.json
    Cluster,

    /// Segment clusters.json into epochs.json
    Epochs,

    /// Cluster, segment and build the PDF atlas
    Atlas,

    /// Show the saved world state and run log summary
    Status {
        /// Print the world state as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the effective configuration
    Config,
}

async fn dispatch(cli: Cli) -> CliResult<()> {
    let ctx = Context::load(cli.config, cli.out)?;
    match cli.command {
        Commands::Run(args) => run::execute(args, &ctx).await,
        Commands::Cluster => offline::cluster(&ctx),
        Commands::Epochs => offline::epochs(&ctx),
        Commands::Atlas => offline::atlas(&ctx),
        Commands::Status { json } => status::execute(&ctx, json),
        Commands::Config => {
            output::print_json(&ctx.config)?;
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    if let Err(e) = dispatch(cli).await {
        eprintln!("{} {}", "✗".red(), e);
        std::process::exit(1);
    }
}
