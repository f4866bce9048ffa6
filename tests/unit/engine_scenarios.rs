//! Concrete end-to-end scenarios for the report engine

use crate::common::fixtures::{alternating, every_day, utc, SnapshotBuilder};
use chrono::TimeDelta;
use store_uptime::engine::{
    run_report, FailurePolicy, ReportOptions, UnitConversion, DEFAULT_REFERENCE_TIME,
};
use store_uptime::errors::{EngineError, StoreError};
use store_uptime::types::StoreStatus;
use store_uptime::utils::math::RoundingPolicy;

/// Weekdays open 00:00-23:59:59 UTC, weekends explicitly closed, samples
/// alternating every 30 minutes over the last day.
///
/// now = Mon 2023-01-09 12:00Z
/// - hour [11:00, 12:00): 11:00 active, 11:30 inactive → 30 / 30 min
/// - day [Sun 12:00, Mon 12:00): Sunday closed; Monday 00:00-12:00 holds 24
///   half-hour slots, 12 active → 6 h / 6 h
/// - week [Mon 01-02 12:00, Mon 01-09 12:00): before the first sample the
///   first status (active) is carried back, so Mon 01-02 (11:59:59) and
///   Tue-Fri (4 × 23:59:59) are all up; plus Monday's 6 h
///   → 410395 s = 113.9986 h up, 6 h down
fn weekday_scenario() -> store_uptime::engine::DatasetSnapshot {
    let mut builder = SnapshotBuilder::new()
        .timezone("store", "UTC")
        .observations(alternating(
            "store",
            utc(2023, 1, 8, 12, 0),
            TimeDelta::minutes(30),
            49,
        ));
    for day in 0..5 {
        builder = builder.hours("store", day, "00:00:00", "23:59:59");
    }
    for day in 5..7 {
        builder = builder.hours("store", day, "00:00:00", "00:00:00");
    }
    builder.build()
}

#[test]
fn test_weekday_scenario_half_up() {
    let outcome = run_report(&weekday_scenario(), &ReportOptions::default()).unwrap();
    assert_eq!(outcome.reference_time, utc(2023, 1, 9, 12, 0));

    let row = &outcome.rows[0];
    assert_eq!(row.uptime_last_hour_minutes, 30.0);
    assert_eq!(row.downtime_last_hour_minutes, 30.0);
    assert_eq!(row.uptime_last_day_hours, 6.0);
    assert_eq!(row.downtime_last_day_hours, 6.0);
    assert_eq!(row.uptime_last_week_hours, 114.0);
    assert_eq!(row.downtime_last_week_hours, 6.0);
}

#[test]
fn test_weekday_scenario_truncate() {
    let options = ReportOptions {
        conversion: UnitConversion::new(RoundingPolicy::Truncate, 2),
        ..ReportOptions::default()
    };
    let outcome = run_report(&weekday_scenario(), &options).unwrap();
    assert_eq!(outcome.rows[0].uptime_last_week_hours, 113.99);
    assert_eq!(outcome.rows[0].uptime_last_day_hours, 6.0);
}

#[test]
fn test_idempotent_output() {
    let snapshot = weekday_scenario();
    let first = run_report(&snapshot, &ReportOptions::default()).unwrap();
    let second = run_report(&snapshot, &ReportOptions::default()).unwrap();
    assert_eq!(first, second);

    let render = |rows: &[store_uptime::types::StoreReportRow]| {
        let mut buffer = Vec::new();
        store_uptime::reports::write_rows(&mut buffer, rows).unwrap();
        buffer
    };
    assert_eq!(render(&first.rows), render(&second.rows));
}

#[test]
fn test_no_rules_means_open_whole_window() {
    let now = utc(2023, 1, 9, 12, 0);
    let snapshot = SnapshotBuilder::new()
        .observe("store", now - TimeDelta::days(8), StoreStatus::Active)
        .observe("store", now, StoreStatus::Active)
        .build();
    let row = &run_report(&snapshot, &ReportOptions::default()).unwrap().rows[0];
    assert_eq!(row.uptime_last_hour_minutes, 60.0);
    assert_eq!(row.uptime_last_day_hours, 24.0);
    assert_eq!(row.uptime_last_week_hours, 168.0);
    assert_eq!(row.downtime_last_week_hours, 0.0);
}

#[test]
fn test_store_without_observations_is_fully_down() {
    // "quiet" appears only in the timezone table; "busy" fixes the reference time
    let snapshot = SnapshotBuilder::new()
        .observe("busy", utc(2023, 1, 9, 12, 0), StoreStatus::Active)
        .timezone("quiet", "Europe/London")
        .build();
    let outcome = run_report(&snapshot, &ReportOptions::default()).unwrap();

    let quiet = outcome.rows.iter().find(|r| r.store_id == "quiet").unwrap();
    assert_eq!(quiet.uptime_last_hour_minutes, 0.0);
    assert_eq!(quiet.downtime_last_hour_minutes, 60.0);
    assert_eq!(quiet.downtime_last_day_hours, 24.0);
    assert_eq!(quiet.downtime_last_week_hours, 168.0);
}

#[test]
fn test_fixed_offset_timezone_hours() {
    // Bogota is UTC-05:00 year-round, so 09:00-17:00 local is 14:00-22:00 UTC
    let now = utc(2023, 1, 10, 0, 0);
    let snapshot = SnapshotBuilder::new()
        .timezone("store", "America/Bogota")
        .rules(every_day("store", "09:00:00", "17:00:00"))
        .observe("store", utc(2023, 1, 9, 13, 0), StoreStatus::Active)
        .observe("store", utc(2023, 1, 9, 18, 0), StoreStatus::Inactive)
        .observe("store", now, StoreStatus::Inactive)
        .build();
    let row = &run_report(&snapshot, &ReportOptions::default()).unwrap().rows[0];
    // 14:00-18:00 up, 18:00-22:00 down
    assert_eq!(row.uptime_last_day_hours, 4.0);
    assert_eq!(row.downtime_last_day_hours, 4.0);
    // last hour 23:00-24:00 UTC is outside business hours
    assert_eq!(row.uptime_last_hour_minutes, 0.0);
    assert_eq!(row.downtime_last_hour_minutes, 0.0);
}

#[test]
fn test_default_timezone_is_chicago() {
    // 2023-01-09 is CST (UTC-06:00): 09:00-17:00 local is 15:00-23:00 UTC
    let snapshot = SnapshotBuilder::new()
        .rules(every_day("store", "09:00:00", "17:00:00"))
        .observe("store", utc(2023, 1, 9, 0, 0), StoreStatus::Active)
        .observe("store", utc(2023, 1, 10, 0, 0), StoreStatus::Active)
        .build();
    let row = &run_report(&snapshot, &ReportOptions::default()).unwrap().rows[0];
    assert_eq!(row.uptime_last_day_hours, 8.0);
    assert_eq!(row.uptime_last_hour_minutes, 0.0);
}

#[test]
fn test_per_store_failures_recorded() {
    let now = utc(2023, 1, 9, 12, 0);
    let snapshot = SnapshotBuilder::new()
        .observe("a", now, StoreStatus::Active)
        .observe("b", now, StoreStatus::Active)
        .observe("c", now, StoreStatus::Active)
        .timezone("b", "Atlantis/Capital")
        .hours("c", 0, "9am", "17:00")
        .build();

    let outcome = run_report(&snapshot, &ReportOptions::default()).unwrap();
    assert!(outcome.is_partial());
    assert_eq!(outcome.rows.len(), 1);
    assert_eq!(outcome.rows[0].store_id, "a");

    let failed: Vec<_> = outcome.failures.iter().map(|f| f.store_id.as_str()).collect();
    assert_eq!(failed, vec!["b", "c"]);
    assert!(matches!(
        outcome.failures[0].error,
        StoreError::UnknownTimezone { .. }
    ));
    assert!(matches!(
        outcome.failures[1].error,
        StoreError::MalformedScheduleRule { .. }
    ));
}

#[test]
fn test_abort_policy_surfaces_first_failure_in_store_order() {
    let now = utc(2023, 1, 9, 12, 0);
    let snapshot = SnapshotBuilder::new()
        .observe("z", now, StoreStatus::Active)
        .timezone("z", "Nowhere/Zed")
        .observe("m", now, StoreStatus::Active)
        .hours("m", 9, "09:00", "17:00")
        .build();
    let options = ReportOptions {
        failure_policy: FailurePolicy::AbortRun,
        ..ReportOptions::default()
    };

    match run_report(&snapshot, &options) {
        Err(EngineError::StoreFailed { store_id, source }) => {
            assert_eq!(store_id, "m");
            assert_eq!(source.kind(), "MalformedScheduleRule");
        }
        other => panic!("expected StoreFailed, got {:?}", other),
    }
}

#[test]
fn test_empty_dataset() {
    let empty = SnapshotBuilder::new().build();
    assert_eq!(
        run_report(&empty, &ReportOptions::default()),
        Err(EngineError::NoStores)
    );

    // Stores known only from schedules complete with every store down.
    // Without a supplied fallback the run is evaluated at 1970-01-01 00:00Z,
    // Wednesday 18:00 CST. Only Monday (1969-12-29) is declared, 09:00-17:00.
    let schedules_only = SnapshotBuilder::new()
        .hours("s1", 0, "09:00", "17:00")
        .build();
    let outcome = run_report(&schedules_only, &ReportOptions::default()).unwrap();
    assert_eq!(outcome.reference_time, DEFAULT_REFERENCE_TIME);
    let row = &outcome.rows[0];
    assert_eq!(row.uptime_last_hour_minutes, 0.0);
    assert_eq!(row.uptime_last_day_hours, 0.0);
    assert_eq!(row.uptime_last_week_hours, 0.0);
    assert_eq!(row.downtime_last_hour_minutes, 60.0);
    assert_eq!(row.downtime_last_day_hours, 24.0);
    // 168h less Monday's 16 closed hours
    assert_eq!(row.downtime_last_week_hours, 152.0);

    let options = ReportOptions {
        fallback_reference_time: Some(utc(2023, 1, 9, 12, 0)),
        ..ReportOptions::default()
    };
    let outcome = run_report(&schedules_only, &options).unwrap();
    let row = &outcome.rows[0];
    assert_eq!(row.uptime_last_week_hours, 0.0);
    assert_eq!(row.uptime_last_day_hours, 0.0);
    // Only Monday is declared, so Sunday defaults to open all day:
    // Sun 00:00 CST = 06:00Z, window starts Sun 12:00Z, Sunday ends Mon 06:00Z.
    // Monday's 09:00-17:00 CST starts at 15:00Z, after the reference time.
    assert_eq!(row.downtime_last_day_hours, 18.0);
}
