//! iga-sync CLI - SparrowVision IGA user synchronization
//!
//! This CLI enables operators to:
//! - Run a full user retrieval and export it to JSON
//! - Generate security, department, compliance, and monitoring reports
//! - Diagnose connection and configuration issues

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod error;
mod models;
mod output;

use error::CliResult;

/// SparrowVision IGA user synchronization
#[derive(Parser)]
#[command(name = "iga-sync")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Retrieve all users from the IGA platform and export them
    Sync(commands::sync::SyncArgs),

    /// Generate a report from an export or a fresh retrieval
    Report(commands::report::ReportArgs),

    /// Diagnose connection and configuration issues
    Doctor(commands::doctor::DoctorArgs),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            e.print();
            std::process::exit(e.exit_code());
        }
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    match cli.command {
        Commands::Sync(args) => commands::sync::execute(args).await,
        Commands::Report(args) => commands::report::execute(args).await,
        Commands::Doctor(args) => commands::doctor::execute(args).await,
    }
}
