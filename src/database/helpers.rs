//! Shared insert helpers and row mappers
//!
//! Insert helpers take an open `Transaction` so the CSV loader can stream many
//! batches through a single atomic load.

use crate::errors::AppResult;
use crate::types::{
    BusinessHourRule, Observation, ReportRecord, ReportStatus, StoreStatus, TimezoneAssignment,
};
use crate::utils::time::{from_micros, to_micros};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Row, Transaction};
use tracing::debug;

/// Standard SELECT columns for report records, in `report_from_row` order
pub const REPORT_COLUMNS: &str =
    "report_id, status, created_at, completed_at, file_path, error_message";

/// Insert observations in order. Returns rows inserted.
pub fn insert_observations(tx: &Transaction, batch: &[Observation]) -> AppResult<usize> {
    let mut stmt = tx.prepare_cached(
        "INSERT INTO store_status (store_id, timestamp_utc, status) VALUES (?1, ?2, ?3)",
    )?;

    let mut inserted = 0;
    for obs in batch {
        inserted += stmt.execute(params![
            obs.store_id,
            to_micros(obs.timestamp),
            obs.status.as_str()
        ])?;
    }

    debug!("Inserted {} observations", inserted);
    Ok(inserted)
}

/// Insert business hour rules; exact duplicates are ignored.
pub fn insert_business_hours(tx: &Transaction, batch: &[BusinessHourRule]) -> AppResult<usize> {
    let mut stmt = tx.prepare_cached(
        r#"INSERT OR IGNORE INTO business_hours
           (store_id, day_of_week, start_time_local, end_time_local)
           VALUES (?1, ?2, ?3, ?4)"#,
    )?;

    let mut inserted = 0;
    for rule in batch {
        inserted += stmt.execute(params![
            rule.store_id,
            rule.day_of_week,
            rule.start_local,
            rule.end_local
        ])?;
    }

    debug!("Inserted {} business hour rules", inserted);
    Ok(inserted)
}

/// Upsert timezone assignments; the last assignment for a store wins.
pub fn upsert_timezones(tx: &Transaction, batch: &[TimezoneAssignment]) -> AppResult<usize> {
    let mut stmt = tx.prepare_cached(
        r#"INSERT INTO store_timezones (store_id, timezone_str) VALUES (?1, ?2)
           ON CONFLICT(store_id) DO UPDATE SET timezone_str = excluded.timezone_str"#,
    )?;

    let mut written = 0;
    for tz in batch {
        written += stmt.execute(params![tz.store_id, tz.timezone])?;
    }

    debug!("Upserted {} timezone assignments", written);
    Ok(written)
}

/// Delete all source rows inside `tx`
pub fn clear_source_tables(tx: &Transaction) -> AppResult<()> {
    tx.execute_batch(
        r#"
        DELETE FROM store_status;
        DELETE FROM business_hours;
        DELETE FROM store_timezones;
        "#,
    )?;
    Ok(())
}

fn conversion_error(
    idx: usize,
    kind: Type,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, kind, Box::new(err))
}

/// Read a microsecond timestamp column
pub fn micros_column(row: &Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let micros: i64 = row.get(idx)?;
    from_micros(micros).ok_or(rusqlite::Error::IntegralValueOutOfRange(idx, micros))
}

fn optional_micros_column(row: &Row, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    match row.get::<_, Option<i64>>(idx)? {
        Some(micros) => from_micros(micros)
            .map(Some)
            .ok_or(rusqlite::Error::IntegralValueOutOfRange(idx, micros)),
        None => Ok(None),
    }
}

/// Construct an Observation from `store_id, timestamp_utc, status`
pub fn observation_from_row(row: &Row) -> rusqlite::Result<Observation> {
    let status: String = row.get(2)?;
    Ok(Observation {
        store_id: row.get(0)?,
        timestamp: micros_column(row, 1)?,
        status: status
            .parse::<StoreStatus>()
            .map_err(|e| conversion_error(2, Type::Text, e))?,
    })
}

/// Construct a BusinessHourRule from
/// `store_id, day_of_week, start_time_local, end_time_local`
pub fn business_hour_from_row(row: &Row) -> rusqlite::Result<BusinessHourRule> {
    Ok(BusinessHourRule {
        store_id: row.get(0)?,
        day_of_week: row.get(1)?,
        start_local: row.get(2)?,
        end_local: row.get(3)?,
    })
}

/// Construct a TimezoneAssignment from `store_id, timezone_str`
pub fn timezone_from_row(row: &Row) -> rusqlite::Result<TimezoneAssignment> {
    Ok(TimezoneAssignment {
        store_id: row.get(0)?,
        timezone: row.get(1)?,
    })
}

/// Construct a ReportRecord from [`REPORT_COLUMNS`]
pub fn report_from_row(row: &Row) -> rusqlite::Result<ReportRecord> {
    let status: String = row.get(1)?;
    Ok(ReportRecord {
        report_id: row.get(0)?,
        status: status
            .parse::<ReportStatus>()
            .map_err(|e| conversion_error(1, Type::Text, e))?,
        created_at: micros_column(row, 2)?,
        completed_at: optional_micros_column(row, 3)?,
        file_path: row.get(4)?,
        error_message: row.get(5)?,
    })
}
