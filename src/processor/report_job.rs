//! Report job runner: owns a job record through
//! `Pending → Running → Complete | Failed`.
//!
//! A failed run never records a file path and leaves no partial output
//! behind. Per-store failures under the record-per-store policy still
//! complete the run, with the failures written next to the report and
//! summarised in the record's `error_message`.

use super::csv_loader::{CsvLoader, LoadConfig};
use super::executor::run_sharded;
use super::ConfigValidator;
use crate::config::AppConfig;
use crate::database::{Database, ReportOperations, SourceOperations};
use crate::engine::{ReportOptions, ReportOutcome};
use crate::errors::{AppError, AppResult};
use crate::reports::{failures_file_name, report_file_name, write_failures_file, write_report_file};
use crate::types::statistics::StatisticsCollector;
use crate::types::ReportRecord;
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use uuid::Uuid;

/// Settings for report jobs
#[derive(Debug, Clone)]
pub struct ReportJobConfig {
    pub output_dir: PathBuf,
    pub options: ReportOptions,
    pub workers: usize,
    /// Load source CSVs first when the database has no observations
    pub load: Option<LoadConfig>,
}

impl ReportJobConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            output_dir: config.report.output_dir.clone(),
            options: config.report.options(),
            workers: config.report.workers,
            load: None,
        }
    }
}

/// Files produced by a successful run
#[derive(Debug, Clone)]
struct RunOutput {
    report_path: PathBuf,
    note: Option<String>,
}

/// Report job runner bound to one database
pub struct ReportJob {
    config: ReportJobConfig,
    database: Database,
}

impl ReportJob {
    pub fn new(config: ReportJobConfig, database: Database) -> AppResult<Self> {
        ConfigValidator::validate_report_config(
            config.workers,
            config.options.conversion.decimal_places,
        )?;
        Ok(Self { config, database })
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn into_database(self) -> Database {
        self.database
    }

    /// Create a `Pending` job stamped with the current time
    pub fn trigger(&mut self) -> AppResult<ReportRecord> {
        self.trigger_at(Utc::now())
    }

    /// Create a `Pending` job with an explicit creation time
    pub fn trigger_at(&mut self, created_at: DateTime<Utc>) -> AppResult<ReportRecord> {
        let report_id = Uuid::new_v4().to_string();
        let record = self.database.create_report(&report_id, created_at)?;
        info!("Report {} triggered", report_id);
        Ok(record)
    }

    /// Fetch a job record; unknown ids are `NotFound`
    pub fn status(&self, report_id: &str) -> AppResult<ReportRecord> {
        self.database
            .get_report(report_id)?
            .ok_or_else(|| AppError::NotFound(format!("Report {}", report_id)))
    }

    /// Trigger and run a job to completion
    pub async fn run(&mut self) -> AppResult<ReportRecord> {
        let record = self.trigger()?;
        self.execute(&record.report_id).await
    }

    /// Drive a `Pending` job to a terminal state and return the final record.
    ///
    /// Errors inside the run are recorded on the job, not returned; only a
    /// failure to update the job record itself is returned as `Err`.
    pub async fn execute(&mut self, report_id: &str) -> AppResult<ReportRecord> {
        let record = self.status(report_id)?;
        self.database.mark_report_running(report_id)?;
        info!("Report {} running", report_id);

        match self.produce(report_id, record.created_at).await {
            Ok(output) => {
                let path = output.report_path.to_string_lossy().into_owned();
                self.database.mark_report_complete(
                    report_id,
                    &path,
                    output.note.as_deref(),
                    Utc::now(),
                )?;
                info!("Report {} complete: {}", report_id, path);
            }
            Err(e) => {
                let message = format!("{}: {}", e.kind(), e);
                error!("Report {} failed: {}", report_id, message);
                self.database
                    .mark_report_failed(report_id, &message, Utc::now())?;
            }
        }

        self.status(report_id)
    }

    async fn produce(&mut self, report_id: &str, created_at: DateTime<Utc>) -> AppResult<RunOutput> {
        if let Some(load) = &self.config.load {
            let stats = CsvLoader::new(load.clone())?.load_if_needed(&mut self.database)?;
            info!("{}", stats.summary());
        }

        let snapshot = self.database.load_snapshot()?;
        if snapshot.observations.is_empty() {
            warn!(
                "No observations loaded; using job creation time {} as reference",
                created_at
            );
        }

        let options = ReportOptions {
            fallback_reference_time: Some(created_at),
            ..self.config.options.clone()
        };
        let (outcome, _stats) = run_sharded(&snapshot, &options, self.config.workers).await?;

        write_outputs(&self.config.output_dir, report_id, &outcome)
    }
}

/// Write the report and any failures file; on error remove whatever was written
fn write_outputs(output_dir: &Path, report_id: &str, outcome: &ReportOutcome) -> AppResult<RunOutput> {
    let report_path = output_dir.join(report_file_name(report_id));
    let failures_path = output_dir.join(failures_file_name(report_id));

    let written = write_report_file(&report_path, &outcome.rows).and_then(|_| {
        if !outcome.is_partial() {
            return Ok(None);
        }
        let rows: Vec<_> = outcome.failures.iter().map(|f| f.to_row()).collect();
        write_failures_file(&failures_path, &rows)?;
        Ok(Some(format!(
            "PartialReport: {} of {} stores failed; see {}",
            outcome.failures.len(),
            outcome.store_count(),
            failures_path.display()
        )))
    });

    match written {
        Ok(note) => Ok(RunOutput { report_path, note }),
        Err(e) => {
            for path in [&report_path, &failures_path] {
                if path.exists() {
                    if let Err(remove_err) = fs::remove_file(path) {
                        warn!("Could not remove {}: {}", path.display(), remove_err);
                    }
                }
            }
            Err(e)
        }
    }
}
