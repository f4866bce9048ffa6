//! Common Test Utilities
//!
//! Shared helpers for building snapshots, CSV fixtures and throwaway
//! databases across the unit and integration suites.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global test counter for generating unique test database paths
static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a unique test database path under `test_output/`
///
/// Combines test name, process id, an atomic counter and the current
/// timestamp so parallel tests never collide.
pub fn create_unique_test_db_path(test_name: &str) -> String {
    let test_dir = PathBuf::from("test_output/integration_tests");
    std::fs::create_dir_all(&test_dir).unwrap();

    let unique_id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();

    let db_path = test_dir.join(format!(
        "{}_{}_{}_{}.db",
        test_name,
        std::process::id(),
        unique_id,
        timestamp
    ));
    db_path.to_str().unwrap().to_string()
}

/// Database setup and teardown utilities
pub mod database {
    use store_uptime::database::Database;

    /// Test database wrapper that automatically cleans up on drop
    pub struct TestDatabase {
        pub db: Database,
        path: String,
    }

    impl TestDatabase {
        pub fn new(test_name: &str) -> anyhow::Result<Self> {
            let path = super::create_unique_test_db_path(test_name);
            let db = Database::new(&path)?;
            Ok(TestDatabase { db, path })
        }

        pub fn path(&self) -> &str {
            &self.path
        }

        /// Reopen the same file as a fresh connection
        pub fn reopen(&self) -> anyhow::Result<Database> {
            Ok(Database::new(&self.path)?)
        }

        pub fn database_mut(&mut self) -> &mut Database {
            &mut self.db
        }
    }

    impl Drop for TestDatabase {
        fn drop(&mut self) {
            if std::path::Path::new(&self.path).exists() {
                let _ = std::fs::remove_file(&self.path);
            }
        }
    }
}

/// Snapshot and CSV fixture builders
pub mod fixtures {
    use chrono::{DateTime, TimeDelta, TimeZone, Utc};
    use std::path::Path;
    use store_uptime::engine::DatasetSnapshot;
    use store_uptime::types::{BusinessHourRule, Observation, StoreStatus, TimezoneAssignment};

    pub fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    /// Observations every `step` starting at `start`, alternating from active
    pub fn alternating(store_id: &str, start: DateTime<Utc>, step: TimeDelta, count: i32) -> Vec<Observation> {
        (0..count)
            .map(|k| {
                let status = if k % 2 == 0 {
                    StoreStatus::Active
                } else {
                    StoreStatus::Inactive
                };
                Observation::new(store_id, start + step * k, status)
            })
            .collect()
    }

    /// Same local hours on every weekday
    pub fn every_day(store_id: &str, start: &str, end: &str) -> Vec<BusinessHourRule> {
        (0..7)
            .map(|day| BusinessHourRule::new(store_id, day, start, end))
            .collect()
    }

    /// Fluent snapshot builder
    #[derive(Default)]
    pub struct SnapshotBuilder {
        observations: Vec<Observation>,
        business_hours: Vec<BusinessHourRule>,
        timezones: Vec<TimezoneAssignment>,
    }

    impl SnapshotBuilder {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn observe(mut self, store_id: &str, at: DateTime<Utc>, status: StoreStatus) -> Self {
            self.observations.push(Observation::new(store_id, at, status));
            self
        }

        pub fn observations(mut self, observations: Vec<Observation>) -> Self {
            self.observations.extend(observations);
            self
        }

        pub fn hours(mut self, store_id: &str, day: i64, start: &str, end: &str) -> Self {
            self.business_hours
                .push(BusinessHourRule::new(store_id, day, start, end));
            self
        }

        pub fn rules(mut self, rules: Vec<BusinessHourRule>) -> Self {
            self.business_hours.extend(rules);
            self
        }

        pub fn timezone(mut self, store_id: &str, timezone: &str) -> Self {
            self.timezones
                .push(TimezoneAssignment::new(store_id, timezone));
            self
        }

        pub fn build(self) -> DatasetSnapshot {
            DatasetSnapshot::new(self.observations, self.business_hours, self.timezones)
        }
    }

    /// Write the three source CSVs under `dir`
    pub fn write_source_csvs(
        dir: &Path,
        observations: &str,
        business_hours: Option<&str>,
        timezones: Option<&str>,
    ) -> anyhow::Result<()> {
        std::fs::create_dir_all(dir)?;
        std::fs::write(dir.join("store_status.csv"), observations)?;
        if let Some(contents) = business_hours {
            std::fs::write(dir.join("business_hours.csv"), contents)?;
        }
        if let Some(contents) = timezones {
            std::fs::write(dir.join("store_timezone.csv"), contents)?;
        }
        Ok(())
    }
}
