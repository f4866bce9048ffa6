use super::{load_app_config, open_database};
use crate::errors::AppResult;
use crate::processor::{CsvLoader, LoadConfig};
use crate::types::statistics::StatisticsCollector;
use clap::Args;
use std::path::PathBuf;
use tracing::info;

#[derive(Args)]
pub struct LoadCommand {
    /// Directory holding the source CSV files (overrides config.toml and env vars)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Database path (overrides config.toml and env vars)
    #[arg(long)]
    database_path: Option<PathBuf>,

    /// Batch size for database inserts (overrides config.toml)
    #[arg(long)]
    batch_size: Option<usize>,

    /// Clear and reload even if data is already present
    #[arg(long)]
    force: bool,

    /// Skip malformed records instead of aborting the load
    #[arg(long)]
    lenient: bool,
}

impl LoadCommand {
    pub fn run(&self) -> AppResult<()> {
        info!("=== Store Uptime - Load ===");
        let app_config = load_app_config()?;

        let mut config = LoadConfig::from_app_config(&app_config);
        if let Some(data_dir) = &self.data_dir {
            config.data_dir = data_dir.clone();
        }
        if let Some(batch_size) = self.batch_size {
            config.batch_size = batch_size;
        }
        config.force = self.force;
        config.strict = config.strict && !self.lenient;
        config.show_progress = true;

        let mut database = open_database(&self.database_path, &app_config)?;
        let stats = CsvLoader::new(config)?.load_if_needed(&mut database)?;

        println!("{}", stats.summary());
        Ok(())
    }
}
