//! Report driver: fixes the reference time, builds the trailing windows and
//! evaluates every store.
//!
//! The reference time is an explicit value carried in [`ReportPlan`]; nothing
//! here reads the wall clock, so identical snapshots give identical rows.

use crate::engine::aggregator::{aggregate, DurationUnit, UnitConversion, UptimeTotals};
use crate::engine::interval::TimeInterval;
use crate::engine::schedule::{resolve_timezone, BusinessSchedule};
use crate::engine::snapshot::{DatasetSnapshot, StoreInputs};
use crate::engine::timeline::StatusTimeline;
use crate::errors::{EngineError, StoreError};
use crate::types::{StoreFailureRow, StoreReportRow};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// Trailing evaluation windows ending at the reference time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportWindow {
    LastHour,
    LastDay,
    LastWeek,
}

impl ReportWindow {
    pub const ALL: [ReportWindow; 3] = [
        ReportWindow::LastHour,
        ReportWindow::LastDay,
        ReportWindow::LastWeek,
    ];

    pub fn length(&self) -> TimeDelta {
        match self {
            ReportWindow::LastHour => TimeDelta::hours(1),
            ReportWindow::LastDay => TimeDelta::days(1),
            ReportWindow::LastWeek => TimeDelta::days(7),
        }
    }

    /// Hour window reports minutes, the others hours
    pub fn unit(&self) -> DurationUnit {
        match self {
            ReportWindow::LastHour => DurationUnit::Minutes,
            ReportWindow::LastDay | ReportWindow::LastWeek => DurationUnit::Hours,
        }
    }

    pub fn range(&self, now: DateTime<Utc>) -> TimeInterval {
        TimeInterval::trailing(now, self.length())
    }
}

/// What to do when one store cannot be computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Keep going; failed stores are listed separately from the rows
    #[default]
    RecordPerStore,
    /// Fail the whole run with the first failure in store order
    AbortRun,
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "record_per_store" | "per_store" | "record" => Ok(FailurePolicy::RecordPerStore),
            "abort_run" | "abort" | "fail_fast" => Ok(FailurePolicy::AbortRun),
            other => Err(format!("unknown failure policy: {}", other)),
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailurePolicy::RecordPerStore => write!(f, "record_per_store"),
            FailurePolicy::AbortRun => write!(f, "abort_run"),
        }
    }
}

/// Reference time for a dataset without observations when the caller
/// supplies none. Any instant works since every store is inactive.
pub const DEFAULT_REFERENCE_TIME: DateTime<Utc> = DateTime::<Utc>::UNIX_EPOCH;

/// Run-wide knobs
#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    pub conversion: UnitConversion,
    pub failure_policy: FailurePolicy,
    /// Reference time used only when the snapshot has no observations,
    /// [`DEFAULT_REFERENCE_TIME`] when unset
    pub fallback_reference_time: Option<DateTime<Utc>>,
}

/// Reference time and the three windows derived from it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportPlan {
    pub reference_time: DateTime<Utc>,
}

impl ReportPlan {
    pub fn new(reference_time: DateTime<Utc>) -> Self {
        Self { reference_time }
    }

    pub fn window(&self, window: ReportWindow) -> TimeInterval {
        window.range(self.reference_time)
    }

    pub fn windows(&self) -> [(ReportWindow, TimeInterval); 3] {
        ReportWindow::ALL.map(|w| (w, self.window(w)))
    }
}

/// Exact durations for one store and one window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreWindowMetrics {
    pub window: ReportWindow,
    pub totals: UptimeTotals,
    /// Business-open time inside the window
    pub open_time: TimeDelta,
}

/// Exact per-window metrics for one store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreMetrics {
    pub store_id: String,
    pub windows: [StoreWindowMetrics; 3],
}

impl StoreMetrics {
    pub fn get(&self, window: ReportWindow) -> &StoreWindowMetrics {
        // ALL order is LastHour, LastDay, LastWeek
        &self.windows[window as usize]
    }

    /// Convert into an output row
    pub fn to_row(&self, conversion: &UnitConversion) -> StoreReportRow {
        let value = |window: ReportWindow, up: bool| {
            let metrics = self.get(window);
            let amount = if up {
                metrics.totals.uptime
            } else {
                metrics.totals.downtime
            };
            conversion.convert(amount, window.unit())
        };
        StoreReportRow {
            store_id: self.store_id.clone(),
            uptime_last_hour_minutes: value(ReportWindow::LastHour, true),
            uptime_last_day_hours: value(ReportWindow::LastDay, true),
            uptime_last_week_hours: value(ReportWindow::LastWeek, true),
            downtime_last_hour_minutes: value(ReportWindow::LastHour, false),
            downtime_last_day_hours: value(ReportWindow::LastDay, false),
            downtime_last_week_hours: value(ReportWindow::LastWeek, false),
        }
    }
}

/// A store that could not be computed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreFailure {
    pub store_id: String,
    pub error: StoreError,
}

impl StoreFailure {
    pub fn to_row(&self) -> StoreFailureRow {
        StoreFailureRow {
            store_id: self.store_id.clone(),
            error: format!("{}: {}", self.error.kind(), self.error),
        }
    }
}

/// Result of one store's evaluation, keyed for deterministic merging
pub type StoreResult = (String, Result<StoreReportRow, StoreError>);

/// Rows in ascending store order plus any recorded failures
#[derive(Debug, Clone, PartialEq)]
pub struct ReportOutcome {
    pub reference_time: DateTime<Utc>,
    pub rows: Vec<StoreReportRow>,
    pub failures: Vec<StoreFailure>,
}

impl ReportOutcome {
    /// Some stores failed under the per-store policy
    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn store_count(&self) -> usize {
        self.rows.len() + self.failures.len()
    }
}

/// Compute exact metrics for one store across all three windows
pub fn evaluate_store(
    store_id: &str,
    inputs: &StoreInputs,
    plan: &ReportPlan,
) -> Result<StoreMetrics, StoreError> {
    let timezone = resolve_timezone(inputs.timezone.as_deref())?;
    let schedule = BusinessSchedule::from_rules(timezone, &inputs.business_hours)?;
    let timeline = StatusTimeline::from_observations(&inputs.observations);

    let windows = plan.windows().map(|(window, range)| {
        let open = schedule.open_intervals(range);
        let spans = timeline.spans(range);
        let totals = aggregate(&open, &spans);
        StoreWindowMetrics {
            window,
            totals,
            open_time: crate::engine::interval::total_duration(&open),
        }
    });

    debug!(
        "Store {}: {} samples, tz {}, week up {}s / down {}s",
        store_id,
        timeline.len(),
        timezone,
        windows[2].totals.uptime.num_seconds(),
        windows[2].totals.downtime.num_seconds()
    );

    Ok(StoreMetrics {
        store_id: store_id.to_string(),
        windows,
    })
}

/// Fix the reference time and group the snapshot by store
pub fn prepare(
    snapshot: &DatasetSnapshot,
    options: &ReportOptions,
) -> Result<(ReportPlan, BTreeMap<String, StoreInputs>), EngineError> {
    let stores = snapshot.partition();
    if stores.is_empty() {
        return Err(EngineError::NoStores);
    }

    let reference_time = match snapshot.reference_time() {
        Some(latest) => latest,
        None => {
            let fallback = options
                .fallback_reference_time
                .unwrap_or(DEFAULT_REFERENCE_TIME);
            warn!(
                "Dataset has no observations; every store is inactive, reference time {}",
                fallback
            );
            fallback
        }
    };

    Ok((ReportPlan::new(reference_time), stores))
}

/// Evaluate a batch of stores into rows or failures
pub fn evaluate_shard(
    stores: &[(String, StoreInputs)],
    plan: &ReportPlan,
    conversion: &UnitConversion,
) -> Vec<StoreResult> {
    stores
        .iter()
        .map(|(store_id, inputs)| {
            let result = evaluate_store(store_id, inputs, plan).map(|m| m.to_row(conversion));
            if let Err(e) = &result {
                warn!("Store {} failed: {}", store_id, e);
            }
            (store_id.clone(), result)
        })
        .collect()
}

/// Order results by store id and apply the failure policy uniformly
pub fn assemble(
    plan: &ReportPlan,
    mut results: Vec<StoreResult>,
    policy: FailurePolicy,
) -> Result<ReportOutcome, EngineError> {
    results.sort_by(|a, b| a.0.cmp(&b.0));

    let mut rows = Vec::with_capacity(results.len());
    let mut failures = Vec::new();
    for (store_id, result) in results {
        match result {
            Ok(row) => rows.push(row),
            Err(error) => match policy {
                FailurePolicy::AbortRun => {
                    return Err(EngineError::StoreFailed {
                        store_id,
                        source: error,
                    })
                }
                FailurePolicy::RecordPerStore => failures.push(StoreFailure { store_id, error }),
            },
        }
    }

    Ok(ReportOutcome {
        reference_time: plan.reference_time,
        rows,
        failures,
    })
}

/// Sequential `run_report(snapshot) → rows | failure`
pub fn run_report(
    snapshot: &DatasetSnapshot,
    options: &ReportOptions,
) -> Result<ReportOutcome, EngineError> {
    let (plan, stores) = prepare(snapshot, options)?;
    let stores: Vec<(String, StoreInputs)> = stores.into_iter().collect();
    let results = evaluate_shard(&stores, &plan, &options.conversion);
    assemble(&plan, results, options.failure_policy)
}
