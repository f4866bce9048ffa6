use crate::errors::AppResult;
use clap::{Parser, Subcommand};

pub mod commands;

/// Store uptime/downtime reporting
#[derive(Parser)]
#[command(name = "store-uptime")]
#[command(about = "Store uptime and downtime within business hours")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Load the source CSV files into the database
    Load(commands::load::LoadCommand),
    /// Trigger a report and run it to completion
    Report(commands::report::ReportCommand),
    /// Poll a report's status, or its file once complete
    GetReport(commands::status::GetReportCommand),
    /// Print a report's full job record as JSON
    DebugReport(commands::status::DebugReportCommand),
    /// Compute and print report rows without recording a job
    Compute(commands::compute::ComputeCommand),
}

pub async fn run() -> AppResult<()> {
    // Uses RUST_LOG environment variable (defaults to "error" if not set)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("error")),
        )
        .try_init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Load(command) => command.run(),
        Commands::Report(command) => command.run().await,
        Commands::GetReport(command) => command.run(),
        Commands::DebugReport(command) => command.run(),
        Commands::Compute(command) => command.run().await,
    }
}
