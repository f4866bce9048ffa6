//! Report jobs from CSV inputs through to the written result file

use crate::common::database::TestDatabase;
use crate::common::fixtures::write_source_csvs;
use std::path::PathBuf;
use store_uptime::config::AppConfig;
use store_uptime::database::{ReportOperations, SourceOperations};
use store_uptime::engine::{run_report, FailurePolicy, ReportOptions};
use store_uptime::processor::{run_sharded, LoadConfig, ReportJob, ReportJobConfig};
use store_uptime::reports::{failures_file_name, OutputFormat, ReportFormatter};
use store_uptime::types::{
    BusinessHourRule, ReportStatus, StoreReportRow, TimezoneAssignment, REPORT_CSV_HEADER,
};
use tempfile::TempDir;

/// Three stores: always open and always active; open Wednesdays 09-17 in
/// Tokyo with a status flip; unknown timezone.
const OBSERVATIONS: &str = "\
store_id,status,timestamp_utc
s-open,active,2023-01-20 00:00:00 UTC
s-tokyo,active,2023-01-24 23:00:00 UTC
s-tokyo,inactive,2023-01-25 04:00:00 UTC
s-bad,active,2023-01-25 10:00:00 UTC
s-open,active,2023-01-25 12:00:00 UTC
";

const BUSINESS_HOURS: &str = "\
store_id,day_of_week,start_time_local,end_time_local
s-tokyo,0,00:00:00,00:00:00
s-tokyo,1,00:00:00,00:00:00
s-tokyo,2,09:00:00,17:00:00
s-tokyo,3,00:00:00,00:00:00
s-tokyo,4,00:00:00,00:00:00
s-tokyo,5,00:00:00,00:00:00
s-tokyo,6,00:00:00,00:00:00
";

const TIMEZONES: &str = "\
store_id,timezone_str
s-tokyo,Asia/Tokyo
s-bad,Mars/Olympus
";

fn job_config(data: &TempDir, output: &TempDir, policy: FailurePolicy) -> ReportJobConfig {
    let mut config = ReportJobConfig::from_app_config(&AppConfig::default());
    config.output_dir = output.path().to_path_buf();
    config.workers = 3;
    config.options.failure_policy = policy;
    config.load = Some(LoadConfig::for_dir(data.path()));
    config
}

fn read_rows(path: &str) -> anyhow::Result<(Vec<String>, Vec<StoreReportRow>)> {
    let mut reader = csv::Reader::from_path(path)?;
    let header = reader.headers()?.iter().map(str::to_string).collect();
    let rows = reader.deserialize().collect::<Result<Vec<StoreReportRow>, _>>()?;
    Ok((header, rows))
}

#[tokio::test]
async fn test_report_job_end_to_end() -> anyhow::Result<()> {
    let data = TempDir::new()?;
    let output = TempDir::new()?;
    write_source_csvs(data.path(), OBSERVATIONS, Some(BUSINESS_HOURS), Some(TIMEZONES))?;

    let test_db = TestDatabase::new("report_end_to_end")?;
    let mut job = ReportJob::new(
        job_config(&data, &output, FailurePolicy::RecordPerStore),
        test_db.reopen()?,
    )?;

    let record = job.run().await?;
    assert_eq!(record.status, ReportStatus::Complete);
    assert!(record.completed_at.is_some());

    let path = record.file_path.clone().unwrap();
    assert!(path.ends_with(&format!("report_{}.csv", record.report_id)));

    let (header, rows) = read_rows(&path)?;
    assert_eq!(header, REPORT_CSV_HEADER.to_vec());
    let ids: Vec<_> = rows.iter().map(|r| r.store_id.as_str()).collect();
    assert_eq!(ids, vec!["s-open", "s-tokyo"]);

    // Reference time is 2023-01-25 12:00Z for every store
    let open = &rows[0];
    assert_eq!(open.uptime_last_hour_minutes, 60.0);
    assert_eq!(open.uptime_last_day_hours, 24.0);
    assert_eq!(open.uptime_last_week_hours, 168.0);

    // Wednesday 09-17 JST is 00:00-08:00Z on 01-25: up until the 04:00Z flip.
    // The previous Wednesday's hours end at 01-18 08:00Z, before the week starts.
    let tokyo = &rows[1];
    assert_eq!(tokyo.uptime_last_day_hours, 4.0);
    assert_eq!(tokyo.downtime_last_day_hours, 4.0);
    assert_eq!(tokyo.uptime_last_week_hours, 4.0);
    assert_eq!(tokyo.downtime_last_week_hours, 4.0);
    assert_eq!(tokyo.uptime_last_hour_minutes, 0.0);

    // s-bad is recorded as a failure and the record says so
    let note = record.error_message.unwrap();
    assert!(note.starts_with("PartialReport: 1 of 3"));
    let failures = std::fs::read_to_string(output.path().join(failures_file_name(&record.report_id)))?;
    assert!(failures.contains("s-bad,"));
    assert!(failures.contains("UnknownTimezone"));

    // The record is visible through a separate connection
    let stored = test_db.reopen()?.get_report(&record.report_id)?.unwrap();
    assert_eq!(stored.status, ReportStatus::Complete);
    Ok(())
}

#[tokio::test]
async fn test_abort_run_records_failure() -> anyhow::Result<()> {
    let data = TempDir::new()?;
    let output = TempDir::new()?;
    write_source_csvs(data.path(), OBSERVATIONS, Some(BUSINESS_HOURS), Some(TIMEZONES))?;

    let test_db = TestDatabase::new("report_abort")?;
    let mut job = ReportJob::new(
        job_config(&data, &output, FailurePolicy::AbortRun),
        test_db.reopen()?,
    )?;

    let record = job.run().await?;
    assert_eq!(record.status, ReportStatus::Failed);
    assert!(record.file_path.is_none());
    assert!(record.error_message.unwrap().starts_with("UnknownTimezone: "));
    assert_eq!(std::fs::read_dir(output.path())?.count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_lifecycle_is_observable() -> anyhow::Result<()> {
    let data = TempDir::new()?;
    let output = TempDir::new()?;
    write_source_csvs(data.path(), OBSERVATIONS, None, None)?;

    let test_db = TestDatabase::new("report_lifecycle")?;
    let mut job = ReportJob::new(
        job_config(&data, &output, FailurePolicy::RecordPerStore),
        test_db.reopen()?,
    )?;

    let pending = job.trigger()?;
    assert_eq!(job.status(&pending.report_id)?.status, ReportStatus::Pending);

    let finished = job.execute(&pending.report_id).await?;
    assert_eq!(finished.status, ReportStatus::Complete);
    assert_eq!(finished.error_message, None);

    // A terminal job cannot be executed again
    assert!(job.execute(&pending.report_id).await.is_err());
    Ok(())
}

#[tokio::test]
async fn test_observation_free_database_reports_all_down() -> anyhow::Result<()> {
    let mut test_db = TestDatabase::new("report_no_observations")?;
    test_db.database_mut().insert_sources(
        &[],
        &[BusinessHourRule::new("s-hours", 2, "09:00", "17:00")],
        &[
            TimezoneAssignment::new("s-hours", "UTC"),
            TimezoneAssignment::new("s-tz", "Asia/Tokyo"),
        ],
    )?;
    let snapshot = test_db.db.load_snapshot()?;

    let options = AppConfig::get_defaults().report.options();
    let (outcome, stats) = run_sharded(&snapshot, &options, 2).await?;
    assert_eq!(stats.stores_total, 2);
    assert!(!outcome.is_partial());
    let ids: Vec<_> = outcome.rows.iter().map(|r| r.store_id.as_str()).collect();
    assert_eq!(ids, vec!["s-hours", "s-tz"]);
    for row in &outcome.rows {
        assert_eq!(row.uptime_last_hour_minutes, 0.0);
        assert_eq!(row.uptime_last_day_hours, 0.0);
        assert_eq!(row.uptime_last_week_hours, 0.0);
    }
    // No rules at all: open around the clock
    assert_eq!(outcome.rows[1].downtime_last_hour_minutes, 60.0);
    assert_eq!(outcome.rows[1].downtime_last_day_hours, 24.0);
    assert_eq!(outcome.rows[1].downtime_last_week_hours, 168.0);
    Ok(())
}

#[tokio::test]
async fn test_sharded_matches_sequential_on_loaded_data() -> anyhow::Result<()> {
    let data = TempDir::new()?;
    write_source_csvs(data.path(), OBSERVATIONS, Some(BUSINESS_HOURS), Some(TIMEZONES))?;

    let mut test_db = TestDatabase::new("report_sharded")?;
    store_uptime::processor::CsvLoader::new(LoadConfig::for_dir(data.path()))?
        .load(test_db.database_mut())?;
    let snapshot = test_db.db.load_snapshot()?;

    let options = ReportOptions::default();
    let sequential = run_report(&snapshot, &options)?;
    for workers in [1, 2, 5] {
        let (parallel, _) = run_sharded(&snapshot, &options, workers).await?;
        assert_eq!(parallel, sequential);
    }

    let json = ReportFormatter::format_outcome(&sequential, OutputFormat::Json)?;
    let value: serde_json::Value = serde_json::from_str(&json)?;
    assert_eq!(value["reference_time"], "2023-01-25T12:00:00Z");
    assert_eq!(value["rows"].as_array().map(Vec::len), Some(2));

    let csv_text = ReportFormatter::format_outcome(&sequential, OutputFormat::Csv)?;
    assert_eq!(csv_text.lines().count(), 3);
    Ok(())
}

#[test]
fn test_output_path_is_under_configured_dir() {
    let config = ReportJobConfig::from_app_config(&AppConfig::default());
    assert_eq!(config.output_dir, PathBuf::from("./reports"));
    assert_eq!(config.workers, 4);
}
