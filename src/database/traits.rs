//! Database trait abstractions, one per concern.

use crate::engine::DatasetSnapshot;
use crate::errors::AppResult;
use crate::types::{BusinessHourRule, Observation, ReportRecord, TimezoneAssignment};
use chrono::{DateTime, Utc};

/// Core database connection access
pub trait DatabaseConnection {
    /// Get a reference to the underlying SQLite connection
    fn connection(&self) -> &rusqlite::Connection;
}

/// Row counts of the three source tables
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceCounts {
    pub observations: usize,
    pub business_hours: usize,
    pub timezones: usize,
}

/// Source table operations: observations, business hours, timezones
pub trait SourceOperations {
    /// Whether any observation has been loaded
    fn has_observations(&self) -> AppResult<bool>;

    /// Row counts of all source tables
    fn source_counts(&self) -> AppResult<SourceCounts>;

    /// Delete all source rows (report records are kept)
    fn clear_sources(&mut self) -> AppResult<()>;

    /// Insert all three tables atomically. Returns rows actually inserted.
    fn insert_sources(
        &mut self,
        observations: &[Observation],
        business_hours: &[BusinessHourRule],
        timezones: &[TimezoneAssignment],
    ) -> AppResult<SourceCounts>;

    /// Latest observation timestamp across all stores
    fn latest_observation_time(&self) -> AppResult<Option<DateTime<Utc>>>;

    /// Materialise the source tables for one report run
    fn load_snapshot(&self) -> AppResult<DatasetSnapshot>;
}

/// Report job record operations
pub trait ReportOperations {
    /// Create a `Pending` record
    fn create_report(&mut self, report_id: &str, created_at: DateTime<Utc>)
        -> AppResult<ReportRecord>;

    /// Fetch a record by id
    fn get_report(&self, report_id: &str) -> AppResult<Option<ReportRecord>>;

    /// Most recent records first
    fn list_reports(&self, limit: usize) -> AppResult<Vec<ReportRecord>>;

    /// `Pending → Running`
    fn mark_report_running(&mut self, report_id: &str) -> AppResult<()>;

    /// `Running → Complete`, with an optional note for partial results
    fn mark_report_complete(
        &mut self,
        report_id: &str,
        file_path: &str,
        note: Option<&str>,
        completed_at: DateTime<Utc>,
    ) -> AppResult<()>;

    /// `Pending | Running → Failed`
    fn mark_report_failed(
        &mut self,
        report_id: &str,
        error_message: &str,
        completed_at: DateTime<Utc>,
    ) -> AppResult<()>;
}
