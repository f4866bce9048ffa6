use super::{load_app_config, open_database};
use crate::engine::FailurePolicy;
use crate::errors::AppResult;
use crate::processor::{LoadConfig, ReportJob, ReportJobConfig};
use crate::types::ReportStatus;
use crate::utils::math::RoundingPolicy;
use clap::Args;
use std::path::PathBuf;
use tracing::info;

#[derive(Args)]
pub struct ReportCommand {
    /// Database path (overrides config.toml and env vars)
    #[arg(long)]
    database_path: Option<PathBuf>,

    /// Directory for report files (overrides config.toml)
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Number of parallel workers (overrides config.toml)
    #[arg(long)]
    workers: Option<usize>,

    /// Rounding policy: half_up or truncate (overrides config.toml)
    #[arg(long)]
    rounding: Option<RoundingPolicy>,

    /// Failure policy: record_per_store or abort_run (overrides config.toml)
    #[arg(long)]
    failure_policy: Option<FailurePolicy>,

    /// Load source CSVs first if the database has no observations
    #[arg(long)]
    load_if_needed: bool,

    /// Directory holding the source CSV files, used with --load-if-needed
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

impl ReportCommand {
    pub async fn run(&self) -> AppResult<()> {
        info!("=== Store Uptime - Report ===");
        let app_config = load_app_config()?;

        let mut config = ReportJobConfig::from_app_config(&app_config);
        if let Some(output_dir) = &self.output_dir {
            config.output_dir = output_dir.clone();
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if let Some(rounding) = self.rounding {
            config.options.conversion.rounding = rounding;
        }
        if let Some(policy) = self.failure_policy {
            config.options.failure_policy = policy;
        }
        if self.load_if_needed {
            let mut load = LoadConfig::from_app_config(&app_config);
            if let Some(data_dir) = &self.data_dir {
                load.data_dir = data_dir.clone();
            }
            config.load = Some(load);
        }

        let database = open_database(&self.database_path, &app_config)?;
        let mut job = ReportJob::new(config, database)?;
        let record = job.run().await?;

        println!("report_id: {}", record.report_id);
        println!("status: {}", record.status);
        if let Some(path) = &record.file_path {
            println!("file: {}", path);
        }
        if let Some(message) = &record.error_message {
            println!("message: {}", message);
        }

        if record.status == ReportStatus::Failed {
            return Err(crate::errors::AppError::InvalidData(format!(
                "Report {} failed",
                record.report_id
            )));
        }
        Ok(())
    }
}
