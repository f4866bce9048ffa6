use crate::database::helpers::{
    business_hour_from_row, clear_source_tables, insert_business_hours, insert_observations,
    micros_column, observation_from_row, timezone_from_row, upsert_timezones,
};
use crate::database::traits::{SourceCounts, SourceOperations};
use crate::database::Database;
use crate::engine::DatasetSnapshot;
use crate::errors::AppResult;
use crate::types::{BusinessHourRule, Observation, TimezoneAssignment};
use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension;
use tracing::{debug, info};

fn count_rows(conn: &rusqlite::Connection, table: &str) -> AppResult<usize> {
    let count: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
        row.get(0)
    })?;
    Ok(count as usize)
}

impl SourceOperations for Database {
    fn has_observations(&self) -> AppResult<bool> {
        let found = self
            .connection()
            .query_row("SELECT 1 FROM store_status LIMIT 1", [], |_| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }

    fn source_counts(&self) -> AppResult<SourceCounts> {
        let conn = self.connection();
        Ok(SourceCounts {
            observations: count_rows(conn, "store_status")?,
            business_hours: count_rows(conn, "business_hours")?,
            timezones: count_rows(conn, "store_timezones")?,
        })
    }

    fn clear_sources(&mut self) -> AppResult<()> {
        self.execute_transaction(clear_source_tables)?;
        info!("Cleared source tables");
        Ok(())
    }

    fn insert_sources(
        &mut self,
        observations: &[Observation],
        business_hours: &[BusinessHourRule],
        timezones: &[TimezoneAssignment],
    ) -> AppResult<SourceCounts> {
        self.execute_transaction(|tx| {
            Ok(SourceCounts {
                observations: insert_observations(tx, observations)?,
                business_hours: insert_business_hours(tx, business_hours)?,
                timezones: upsert_timezones(tx, timezones)?,
            })
        })
    }

    fn latest_observation_time(&self) -> AppResult<Option<DateTime<Utc>>> {
        let latest = self
            .connection()
            .query_row(
                "SELECT timestamp_utc FROM store_status ORDER BY timestamp_utc DESC LIMIT 1",
                [],
                |row| micros_column(row, 0),
            )
            .optional()?;
        Ok(latest)
    }

    fn load_snapshot(&self) -> AppResult<DatasetSnapshot> {
        let conn = self.connection();

        // id order is input order; the engine relies on it for duplicate timestamps
        let mut stmt = conn.prepare_cached(
            "SELECT store_id, timestamp_utc, status FROM store_status ORDER BY id",
        )?;
        let observations = stmt
            .query_map([], observation_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        let mut stmt = conn.prepare_cached(
            r#"SELECT store_id, day_of_week, start_time_local, end_time_local
               FROM business_hours ORDER BY id"#,
        )?;
        let business_hours = stmt
            .query_map([], business_hour_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        let mut stmt = conn
            .prepare_cached("SELECT store_id, timezone_str FROM store_timezones ORDER BY store_id")?;
        let timezones = stmt
            .query_map([], timezone_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            "Loaded snapshot: {} observations, {} business hour rules, {} timezones",
            observations.len(),
            business_hours.len(),
            timezones.len()
        );

        Ok(DatasetSnapshot::new(observations, business_hours, timezones))
    }
}
