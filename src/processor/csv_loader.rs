use super::{ConfigValidator, ProgressReporter, StandardProgressTracker};
use crate::config::AppConfig;
use crate::database::helpers::{
    clear_source_tables, insert_business_hours, insert_observations, upsert_timezones,
};
use crate::database::{Database, SourceOperations};
use crate::errors::{AppError, AppResult};
use crate::types::statistics::{StatisticsCollector, TimingInfo};
use crate::types::{BusinessHoursRecord, LoadStats, StatusRecord, TimezoneRecord};
use csv::{ReaderBuilder, StringRecord, Trim};
use rusqlite::Transaction;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const ALTERNATE_BUSINESS_HOURS_FILE: &str = "menu_hours.csv";
const ALTERNATE_TIMEZONES_FILE: &str = "timezones.csv";

/// Settings for one ingestion run
#[derive(Debug, Clone)]
pub struct LoadConfig {
    pub data_dir: PathBuf,
    pub observations_file: String,
    pub business_hours_file: String,
    pub timezones_file: String,
    pub batch_size: usize,
    /// Abort on the first malformed record; otherwise skip and count it
    pub strict: bool,
    /// Clear and reload even when data is present
    pub force: bool,
    /// Print an in-place progress line to stdout
    pub show_progress: bool,
}

impl LoadConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            data_dir: config.paths.data_dir.clone(),
            observations_file: config.paths.observations_file.clone(),
            business_hours_file: config.paths.business_hours_file.clone(),
            timezones_file: config.paths.timezones_file.clone(),
            batch_size: config.ingest.batch_size,
            strict: config.ingest.strict,
            force: false,
            show_progress: false,
        }
    }

    /// Default file names under `data_dir`
    pub fn for_dir(data_dir: impl Into<PathBuf>) -> Self {
        let mut config = Self::from_app_config(&AppConfig::default());
        config.data_dir = data_dir.into();
        config
    }
}

/// Which source table a file feeds
#[derive(Debug, Clone, Copy)]
enum SourceKind {
    Observations,
    BusinessHours,
    Timezones,
}

impl SourceKind {
    fn counters<'s>(&self, stats: &'s mut LoadStats) -> (&'s mut usize, &'s mut usize) {
        match self {
            SourceKind::Observations => (
                &mut stats.observations_read,
                &mut stats.observations_inserted,
            ),
            SourceKind::BusinessHours => (
                &mut stats.business_hours_read,
                &mut stats.business_hours_inserted,
            ),
            SourceKind::Timezones => (&mut stats.timezones_read, &mut stats.timezones_inserted),
        }
    }

    /// Counter for rows that declare nothing and are skipped
    fn blank_counter<'s>(&self, stats: &'s mut LoadStats) -> &'s mut usize {
        match self {
            SourceKind::Observations => &mut stats.observations_blank,
            SourceKind::BusinessHours => &mut stats.business_hours_blank,
            SourceKind::Timezones => &mut stats.timezones_blank,
        }
    }
}

/// CSV → SQLite loader for the three source files
pub struct CsvLoader {
    config: LoadConfig,
}

impl CsvLoader {
    pub fn new(config: LoadConfig) -> AppResult<Self> {
        ConfigValidator::validate_batch_config(config.batch_size)?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &LoadConfig {
        &self.config
    }

    /// Load unless observations are already present (or `force` is set)
    pub fn load_if_needed(&self, database: &mut Database) -> AppResult<LoadStats> {
        if !self.config.force && database.has_observations()? {
            info!("Source data already present, skipping load");
            let mut stats = LoadStats::new();
            stats.skipped = true;
            stats.finish();
            return Ok(stats);
        }
        self.load(database)
    }

    /// Load all three files in one transaction. A forced load clears the
    /// source tables first.
    pub fn load(&self, database: &mut Database) -> AppResult<LoadStats> {
        let observations_path = self.resolve(&self.config.observations_file, None)?.ok_or_else(|| {
            AppError::NotFound(format!(
                "Observations file {}",
                self.config.data_dir.join(&self.config.observations_file).display()
            ))
        })?;
        let business_hours_path = self.resolve(
            &self.config.business_hours_file,
            Some(ALTERNATE_BUSINESS_HOURS_FILE),
        )?;
        let timezones_path =
            self.resolve(&self.config.timezones_file, Some(ALTERNATE_TIMEZONES_FILE))?;

        ConfigValidator::log_config_summary(
            "CSV Load",
            &[
                ("Data dir", self.config.data_dir.display().to_string()),
                ("Batch size", self.config.batch_size.to_string()),
                ("Strict", self.config.strict.to_string()),
                ("Force", self.config.force.to_string()),
            ],
        );

        let mut stats = LoadStats {
            timing: TimingInfo::new(),
            ..LoadStats::default()
        };
        let mut progress = StandardProgressTracker::new();
        progress.start();

        let force = self.config.force;
        database.execute_transaction(|tx| {
            if force {
                clear_source_tables(tx)?;
                info!("Cleared existing source rows");
            }

            self.stream_file::<StatusRecord, _>(
                tx,
                &observations_path,
                SourceKind::Observations,
                &mut stats,
                &mut progress,
                |record| record.to_observation().map(Some),
                insert_observations,
            )?;

            match &business_hours_path {
                Some(path) => self.stream_file::<BusinessHoursRecord, _>(
                    tx,
                    path,
                    SourceKind::BusinessHours,
                    &mut stats,
                    &mut progress,
                    |record| record.to_rule(),
                    insert_business_hours,
                )?,
                None => warn!("No business hours file found; every store will be open 24x7"),
            }

            match &timezones_path {
                Some(path) => self.stream_file::<TimezoneRecord, _>(
                    tx,
                    path,
                    SourceKind::Timezones,
                    &mut stats,
                    &mut progress,
                    |record| record.to_assignment(),
                    upsert_timezones,
                )?,
                None => warn!("No timezone file found; every store uses the default timezone"),
            }

            Ok(())
        })?;

        stats.finish();
        if self.config.show_progress {
            ProgressReporter::finish_progress_line();
        }
        ProgressReporter::report_completion(
            "CSV Load",
            &stats.summary(),
            stats.duration().as_secs_f64(),
        );

        Ok(stats)
    }

    /// Resolve a configured file name, trying `alternate` when the primary is absent
    fn resolve(&self, file_name: &str, alternate: Option<&str>) -> AppResult<Option<PathBuf>> {
        let primary = self.config.data_dir.join(file_name);
        if primary.is_file() {
            return Ok(Some(primary));
        }
        if let Some(alternate) = alternate {
            let fallback = self.config.data_dir.join(alternate);
            if fallback.is_file() {
                info!(
                    "{} not found, using {}",
                    primary.display(),
                    fallback.display()
                );
                return Ok(Some(fallback));
            }
        }
        Ok(None)
    }

    /// Parse `path` record by record and insert in batches.
    ///
    /// `convert` returning `Ok(None)` marks a blank row that is skipped, not
    /// counted as malformed.
    #[allow(clippy::too_many_arguments)]
    fn stream_file<R, T>(
        &self,
        tx: &Transaction,
        path: &Path,
        kind: SourceKind,
        stats: &mut LoadStats,
        progress: &mut StandardProgressTracker,
        convert: impl Fn(&R) -> AppResult<Option<T>>,
        insert: impl Fn(&Transaction, &[T]) -> AppResult<usize>,
    ) -> AppResult<()>
    where
        R: DeserializeOwned,
    {
        let file_label = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        info!("Loading {}", path.display());

        let file = File::open(path)?;
        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(BufReader::new(file));
        let headers = reader.headers()?.clone();

        let mut batch = Vec::with_capacity(self.config.batch_size);
        let mut record = StringRecord::new();

        while reader.read_record(&mut record)? {
            let line = record
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or_default();
            *kind.counters(stats).0 += 1;

            let parsed = record
                .deserialize::<R>(Some(&headers))
                .map_err(AppError::Csv)
                .and_then(|raw| convert(&raw));

            match parsed {
                Ok(Some(item)) => batch.push(item),
                Ok(None) => *kind.blank_counter(stats) += 1,
                Err(e) if self.config.strict => {
                    return Err(AppError::InvalidRecord {
                        file: file_label,
                        line,
                        reason: e.to_string(),
                    });
                }
                Err(e) => {
                    warn!("Skipping {} line {}: {}", file_label, line, e);
                    stats.malformed_records += 1;
                }
            }

            if batch.len() >= self.config.batch_size {
                *kind.counters(stats).1 += insert(tx, &batch)?;
                batch.clear();
                stats.batches_processed += 1;
            }

            if self.config.show_progress && progress.should_report() {
                ProgressReporter::report_progress_with_metrics(
                    &*stats,
                    stats.total_read(),
                    progress.elapsed_seconds(),
                )?;
            }
        }

        if !batch.is_empty() {
            *kind.counters(stats).1 += insert(tx, &batch)?;
            stats.batches_processed += 1;
        }

        let (read, inserted) = kind.counters(stats);
        info!("{}: {} rows read, {} inserted", file_label, read, inserted);
        Ok(())
    }
}
