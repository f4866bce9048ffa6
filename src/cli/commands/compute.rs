use super::{load_app_config, open_database};
use crate::database::SourceOperations;
use crate::errors::AppResult;
use crate::processor::run_sharded;
use crate::reports::{OutputFormat, ReportFormatter};
use crate::utils::math::RoundingPolicy;
use chrono::Utc;
use clap::Args;
use std::path::PathBuf;

/// Run the engine on the current database and print rows without recording a job
#[derive(Args)]
pub struct ComputeCommand {
    /// Database path (overrides config.toml and env vars)
    #[arg(long)]
    database_path: Option<PathBuf>,

    /// Output format (console, json or csv)
    #[arg(long, default_value = "console")]
    format: String,

    /// Number of parallel workers (overrides config.toml)
    #[arg(long)]
    workers: Option<usize>,

    /// Rounding policy: half_up or truncate (overrides config.toml)
    #[arg(long)]
    rounding: Option<RoundingPolicy>,
}

impl ComputeCommand {
    pub async fn run(&self) -> AppResult<()> {
        let app_config = load_app_config()?;
        let database = open_database(&self.database_path, &app_config)?;

        let mut options = app_config.report.options();
        if let Some(rounding) = self.rounding {
            options.conversion.rounding = rounding;
        }
        let workers = self.workers.unwrap_or(app_config.report.workers);

        // Same fallback a report job uses: the moment the run was requested
        options.fallback_reference_time = Some(Utc::now());

        let snapshot = database.load_snapshot()?;
        let (outcome, _stats) = run_sharded(&snapshot, &options, workers).await?;

        print!(
            "{}",
            ReportFormatter::format_outcome(&outcome, OutputFormat::parse(&self.format))?
        );
        Ok(())
    }
}
