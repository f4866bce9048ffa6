pub mod compute;
pub mod load;
pub mod report;
pub mod status;

use crate::config::AppConfig;
use crate::database::Database;
use crate::errors::AppResult;
use std::path::PathBuf;
use tracing::{info, warn};

/// Load configuration, falling back to built-in defaults
pub(crate) fn load_app_config() -> AppResult<AppConfig> {
    let config = match AppConfig::load() {
        Ok(config) => {
            info!("Configuration loaded successfully");
            config
        }
        Err(e) => {
            warn!("Failed to load configuration, using defaults: {}", e);
            AppConfig::default()
        }
    };
    config.validate()?;
    Ok(config)
}

/// Open the database at the CLI path, or the configured default
pub(crate) fn open_database(cli_path: &Option<PathBuf>, config: &AppConfig) -> AppResult<Database> {
    let path = cli_path
        .clone()
        .unwrap_or_else(|| config.database.default_path.clone());
    Database::new(&path.to_string_lossy())
}
