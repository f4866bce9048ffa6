//! SQLite schema for source tables and report jobs
//!
//! - `store_status`: observations, input order preserved by the autoincrement id
//! - `business_hours`: declared weekly hours, local times kept as source text
//! - `store_timezones`: one IANA name per store
//! - `reports`: report job records

use crate::errors::AppResult;
use rusqlite::Connection;
use tracing::debug;

pub const SCHEMA_VERSION: i64 = 1;

/// Initialise the schema (idempotent)
pub fn setup_schema(connection: &Connection) -> AppResult<()> {
    connection.execute_batch(
        r#"
        PRAGMA user_version = 1;

        -- Observations; timestamp_utc is microseconds since the Unix epoch.
        -- Duplicates are kept: the engine resolves them by id order.
        CREATE TABLE IF NOT EXISTS store_status (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            store_id TEXT NOT NULL,
            timestamp_utc INTEGER NOT NULL,
            status TEXT NOT NULL CHECK (status IN ('active', 'inactive'))
        );

        CREATE INDEX IF NOT EXISTS idx_store_status_store_ts
            ON store_status(store_id, timestamp_utc);
        CREATE INDEX IF NOT EXISTS idx_store_status_ts
            ON store_status(timestamp_utc);

        -- Business hours; day_of_week 0 = Monday ... 6 = Sunday
        CREATE TABLE IF NOT EXISTS business_hours (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            store_id TEXT NOT NULL,
            day_of_week INTEGER NOT NULL,
            start_time_local TEXT NOT NULL,
            end_time_local TEXT NOT NULL,
            UNIQUE (store_id, day_of_week, start_time_local, end_time_local)
        );

        CREATE INDEX IF NOT EXISTS idx_business_hours_store
            ON business_hours(store_id);

        CREATE TABLE IF NOT EXISTS store_timezones (
            store_id TEXT PRIMARY KEY,
            timezone_str TEXT NOT NULL
        );

        -- Report jobs; timestamps in microseconds since the Unix epoch
        CREATE TABLE IF NOT EXISTS reports (
            report_id TEXT PRIMARY KEY,
            status TEXT NOT NULL
                CHECK (status IN ('Pending', 'Running', 'Complete', 'Failed')),
            created_at INTEGER NOT NULL,
            completed_at INTEGER,
            file_path TEXT,
            error_message TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_reports_created ON reports(created_at);
        "#,
    )?;

    debug!("Schema version {} ready", SCHEMA_VERSION);
    Ok(())
}
