//! Partition and window properties checked across varied stores

use crate::common::fixtures::{alternating, every_day, utc, SnapshotBuilder};
use chrono::TimeDelta;
use store_uptime::engine::interval::total_duration;
use store_uptime::engine::{
    evaluate_store, resolve_timezone, BusinessSchedule, ReportPlan, ReportWindow,
};
use store_uptime::types::StoreStatus;

#[test]
fn test_window_ranges() {
    let plan = ReportPlan::new(utc(2023, 1, 8, 12, 0));
    let expected = [
        (ReportWindow::LastHour, utc(2023, 1, 8, 11, 0)),
        (ReportWindow::LastDay, utc(2023, 1, 7, 12, 0)),
        (ReportWindow::LastWeek, utc(2023, 1, 1, 12, 0)),
    ];
    for (window, start) in expected {
        let range = plan.window(window);
        assert_eq!(range.start(), start);
        assert_eq!(range.end(), utc(2023, 1, 8, 12, 0));
    }
}

#[test]
fn test_up_plus_down_equals_open_time() {
    let start = utc(2023, 3, 6, 0, 0);
    let snapshot = SnapshotBuilder::new()
        .observations(alternating("plain", start, TimeDelta::minutes(53), 200))
        .observations(alternating("overnight", start, TimeDelta::minutes(41), 250))
        .observations(alternating("dst", start, TimeDelta::minutes(97), 110))
        .observe("silent", start, StoreStatus::Inactive)
        .rules(every_day("overnight", "22:00:00", "03:30:00"))
        .timezone("overnight", "Asia/Kolkata")
        .hours("dst", 6, "01:00:00", "04:00:00")
        .hours("dst", 2, "08:00", "12:00")
        .hours("dst", 2, "11:00", "19:00")
        .timezone("dst", "America/New_York")
        .hours("silent", 4, "10:00", "10:00")
        .build();

    let plan = ReportPlan::new(snapshot.reference_time().unwrap());
    for (store_id, inputs) in snapshot.partition() {
        let metrics = evaluate_store(&store_id, &inputs, &plan).unwrap();
        let timezone = resolve_timezone(inputs.timezone.as_deref()).unwrap();
        let schedule = BusinessSchedule::from_rules(timezone, &inputs.business_hours).unwrap();

        for (window, range) in plan.windows() {
            let window_metrics = metrics.get(window);
            assert_eq!(
                window_metrics.totals.total(),
                window_metrics.open_time,
                "{} {:?}",
                store_id,
                window
            );
            assert_eq!(
                window_metrics.open_time,
                total_duration(&schedule.open_intervals(range))
            );
            assert!(window_metrics.open_time <= range.duration());
        }
    }
}

#[test]
fn test_dst_spring_forward_day_is_23_hours() {
    // 2023-03-12 is the spring-forward Sunday in New York. Saturday and
    // Monday are declared closed, Sunday defaults to open all day.
    let now = utc(2023, 3, 13, 4, 0); // Monday 00:00 EDT
    let snapshot = SnapshotBuilder::new()
        .timezone("store", "America/New_York")
        .hours("store", 5, "00:00", "00:00")
        .hours("store", 0, "00:00", "00:00")
        .observe("store", now, StoreStatus::Active)
        .build();

    let plan = ReportPlan::new(now);
    let stores = snapshot.partition();
    let metrics = evaluate_store("store", &stores["store"], &plan).unwrap();
    assert_eq!(
        metrics.get(ReportWindow::LastDay).open_time,
        TimeDelta::hours(23)
    );
    assert_eq!(
        metrics.get(ReportWindow::LastDay).totals.uptime,
        TimeDelta::hours(23)
    );
}
