//! Piecewise-constant status interpolation over sparse observations.
//!
//! Between two samples the earlier sample's status holds. Before the first
//! sample its status is carried backward; after the last sample its status
//! is carried forward. A store with no samples at all is inactive.

use crate::engine::interval::TimeInterval;
use crate::types::{Observation, StoreStatus};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Status assumed for a store that was never observed
pub const UNOBSERVED_STATUS: StoreStatus = StoreStatus::Inactive;

/// A labelled run of constant status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusSpan {
    pub interval: TimeInterval,
    pub status: StoreStatus,
}

/// One store's samples, sorted by time (stable on ties)
#[derive(Debug, Clone, Default)]
pub struct StatusTimeline {
    samples: Vec<(DateTime<Utc>, StoreStatus)>,
}

impl StatusTimeline {
    /// Build from observations in input order. Later duplicates of a
    /// timestamp win.
    pub fn from_observations(observations: &[Observation]) -> Self {
        let mut samples: Vec<_> = observations
            .iter()
            .map(|obs| (obs.timestamp, obs.status))
            .collect();
        samples.sort_by_key(|(ts, _)| *ts);
        Self { samples }
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Interpolated status at `instant`
    pub fn status_at(&self, instant: DateTime<Utc>) -> StoreStatus {
        let idx = self.samples.partition_point(|(ts, _)| *ts <= instant);
        match (idx, self.samples.first()) {
            (_, None) => UNOBSERVED_STATUS,
            (0, Some((_, first))) => *first,
            (i, _) => self.samples[i - 1].1,
        }
    }

    /// Contiguous labelled spans covering exactly `range`, adjacent spans
    /// always differing in status
    pub fn spans(&self, range: TimeInterval) -> Vec<StatusSpan> {
        if range.is_empty() {
            return Vec::new();
        }

        let mut current = self.status_at(range.start());
        let mut cursor = range.start();
        let mut spans = Vec::new();

        let first_inside = self
            .samples
            .partition_point(|(ts, _)| *ts <= range.start());
        for &(ts, status) in &self.samples[first_inside..] {
            if ts >= range.end() {
                break;
            }
            if status != current {
                push_span(&mut spans, TimeInterval::new(cursor, ts), current);
                cursor = ts;
                current = status;
            }
        }
        push_span(&mut spans, TimeInterval::new(cursor, range.end()), current);
        spans
    }
}

/// Append a run, dropping empties and coalescing with an equal-status predecessor.
/// Duplicate timestamps can otherwise leave a zero-length run between two equal ones.
fn push_span(spans: &mut Vec<StatusSpan>, interval: TimeInterval, status: StoreStatus) {
    if interval.is_empty() {
        return;
    }
    if let Some(last) = spans.last_mut() {
        if last.status == status && last.interval.end() == interval.start() {
            last.interval = TimeInterval::new(last.interval.start(), interval.end());
            return;
        }
    }
    spans.push(StatusSpan { interval, status });
}

/// Interpolate `observations` over `range` in one call
pub fn interpolate(observations: &[Observation], range: TimeInterval) -> Vec<StatusSpan> {
    StatusTimeline::from_observations(observations).spans(range)
}
