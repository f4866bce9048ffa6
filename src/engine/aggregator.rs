//! Combine open intervals with status spans into uptime/downtime totals.

use crate::engine::interval::TimeInterval;
use crate::engine::timeline::StatusSpan;
use crate::types::StoreStatus;
use crate::utils::math::{round_ratio, RoundingPolicy};
use crate::utils::time::delta_micros;
use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

/// Exact up/down durations for one store and one window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UptimeTotals {
    pub uptime: TimeDelta,
    pub downtime: TimeDelta,
}

impl Default for UptimeTotals {
    fn default() -> Self {
        Self {
            uptime: TimeDelta::zero(),
            downtime: TimeDelta::zero(),
        }
    }
}

impl UptimeTotals {
    pub fn total(&self) -> TimeDelta {
        self.uptime + self.downtime
    }

    fn add(&mut self, status: StoreStatus, amount: TimeDelta) {
        match status {
            StoreStatus::Active => self.uptime += amount,
            StoreStatus::Inactive => self.downtime += amount,
        }
    }
}

/// Merge-sweep two ordered, disjoint sequences and sum the overlap by status.
///
/// `open` is any ordered disjoint set; `spans` must be ordered and disjoint.
/// Runs in O(n + m).
pub fn aggregate(open: &[TimeInterval], spans: &[StatusSpan]) -> UptimeTotals {
    let mut totals = UptimeTotals::default();
    let (mut i, mut j) = (0, 0);

    while i < open.len() && j < spans.len() {
        let business = &open[i];
        let span = &spans[j];

        totals.add(span.status, business.intersect(&span.interval).duration());

        if business.end() <= span.interval.end() {
            i += 1;
        } else {
            j += 1;
        }
    }

    totals
}

/// Unit a window's durations are reported in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationUnit {
    Minutes,
    Hours,
}

impl DurationUnit {
    fn micros(&self) -> i128 {
        match self {
            DurationUnit::Minutes => 60 * 1_000_000,
            DurationUnit::Hours => 3_600 * 1_000_000,
        }
    }
}

/// Duration → report value conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitConversion {
    pub rounding: RoundingPolicy,
    pub decimal_places: u32,
}

impl Default for UnitConversion {
    fn default() -> Self {
        Self {
            rounding: RoundingPolicy::HalfUp,
            decimal_places: 2,
        }
    }
}

impl UnitConversion {
    pub fn new(rounding: RoundingPolicy, decimal_places: u32) -> Self {
        Self {
            rounding,
            decimal_places,
        }
    }

    pub fn convert(&self, amount: TimeDelta, unit: DurationUnit) -> f64 {
        round_ratio(
            delta_micros(amount).max(0),
            unit.micros(),
            self.decimal_places,
            self.rounding,
        )
    }
}
