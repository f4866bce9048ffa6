use crate::engine::{FailurePolicy, ReportOptions, UnitConversion};
use crate::errors::AppResult;
use crate::processor::ConfigValidator;
use crate::utils::math::RoundingPolicy;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Flat override for `paths.data_dir`
pub const DATA_DIR_ENV: &str = "STORE_UPTIME_DATA_DIR";
/// Flat override for `database.default_path`
pub const DATABASE_PATH_ENV: &str = "STORE_UPTIME_DATABASE_PATH";

/// Application configuration loaded from config.toml or environment variables
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub paths: PathsConfig,
    pub database: DatabaseConfig,
    pub report: ReportConfig,
    pub ingest: IngestConfig,
}

/// Input file locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    pub data_dir: PathBuf,
    pub observations_file: String,
    pub business_hours_file: String,
    pub timezones_file: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            observations_file: "store_status.csv".to_string(),
            business_hours_file: "business_hours.csv".to_string(),
            timezones_file: "store_timezone.csv".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub default_path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            default_path: PathBuf::from("./data/store_uptime.db"),
        }
    }
}

/// Report generation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    pub output_dir: PathBuf,
    pub rounding: RoundingPolicy,
    pub decimal_places: u32,
    pub failure_policy: FailurePolicy,
    pub workers: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./reports"),
            rounding: RoundingPolicy::HalfUp,
            decimal_places: 2,
            failure_policy: FailurePolicy::RecordPerStore,
            workers: 4,
        }
    }
}

impl ReportConfig {
    pub fn conversion(&self) -> UnitConversion {
        UnitConversion::new(self.rounding, self.decimal_places)
    }

    /// Engine options; `fallback_reference_time` is supplied per job
    pub fn options(&self) -> ReportOptions {
        ReportOptions {
            conversion: self.conversion(),
            failure_policy: self.failure_policy,
            fallback_reference_time: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    pub batch_size: usize,
    /// Abort the load on the first malformed record
    pub strict: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            batch_size: 10_000,
            strict: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from config.toml file and environment variables
    /// Environment variables take precedence over file configuration
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Config::builder()
            .set_default("paths.data_dir", path_str(&defaults.paths.data_dir))?
            .set_default("paths.observations_file", defaults.paths.observations_file)?
            .set_default(
                "paths.business_hours_file",
                defaults.paths.business_hours_file,
            )?
            .set_default("paths.timezones_file", defaults.paths.timezones_file)?
            .set_default(
                "database.default_path",
                path_str(&defaults.database.default_path),
            )?
            .set_default("report.output_dir", path_str(&defaults.report.output_dir))?
            .set_default("report.rounding", defaults.report.rounding.to_string())?
            .set_default("report.decimal_places", defaults.report.decimal_places as i64)?
            .set_default(
                "report.failure_policy",
                defaults.report.failure_policy.to_string(),
            )?
            .set_default("report.workers", defaults.report.workers as i64)?
            .set_default("ingest.batch_size", defaults.ingest.batch_size as i64)?
            .set_default("ingest.strict", defaults.ingest.strict)?
            // Load from config.toml if it exists
            .add_source(File::with_name("config").required(false))
            // STORE_UPTIME__REPORT__WORKERS=8 overrides report.workers
            .add_source(
                Environment::with_prefix("STORE_UPTIME")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut app_config: AppConfig = config.try_deserialize()?;

        if let Ok(data_dir) = env::var(DATA_DIR_ENV) {
            app_config.paths.data_dir = PathBuf::from(data_dir);
        }

        if let Ok(db_path) = env::var(DATABASE_PATH_ENV) {
            app_config.database.default_path = PathBuf::from(db_path);
        }

        Ok(app_config)
    }

    /// Config for CLI argument defaults; falls back to built-ins on any error
    pub fn get_defaults() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Reject settings the processors cannot run with
    pub fn validate(&self) -> AppResult<()> {
        ConfigValidator::validate_batch_config(self.ingest.batch_size)?;
        ConfigValidator::validate_report_config(self.report.workers, self.report.decimal_places)
    }
}

fn path_str(path: &std::path::Path) -> String {
    path.to_string_lossy().into_owned()
}
