//! simdyna CLI - Train, inspect and export similarity-scaled Dyna agents
//!
//! This CLI provides a unified interface for:
//! - Training agents against each other over a persistent value store
//! - Inspecting table sizes and the values recorded for a state
//! - Exporting the value table as CSV or a MessagePack snapshot

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "simdyna")]
#[command(version, about = "Similarity-scaled Dyna learning for turn-based card games", long_about = None)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train agents against each other
    Train(Box<simdyna::cli::commands::train::TrainArgs>),

    /// Show table sizes and the values of a state
    Inspect(simdyna::cli::commands::inspect::InspectArgs),

    /// Export the value table
    Export(simdyna::cli::commands::export::ExportArgs),
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "simdyna=debug" } else { "simdyna=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Train(args) => simdyna::cli::commands::train::execute(*args),
        Commands::Inspect(args) => simdyna::cli::commands::inspect::execute(args),
        Commands::Export(args) => simdyna::cli::commands::export::execute(args),
    }
}
