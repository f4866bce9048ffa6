//! Half-open UTC intervals `[start, end)`.
//!
//! Every instant carried here is an explicit UTC instant; local wall-clock
//! values are converted before they reach this module. An empty interval
//! (`start == end`) has zero duration and intersects to empty, so callers
//! never need to special-case it.

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TimeInterval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeInterval {
    /// Build `[start, end)`. An inverted pair collapses to the empty interval at `start`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    /// Zero-length interval anchored at `at`
    pub fn empty(at: DateTime<Utc>) -> Self {
        Self { start: at, end: at }
    }

    /// `[end - length, end)`
    pub fn trailing(end: DateTime<Utc>, length: TimeDelta) -> Self {
        Self::new(end - length, end)
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }

    /// Overlap of two intervals; empty when they are disjoint or merely touch
    pub fn intersect(&self, other: &TimeInterval) -> TimeInterval {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        TimeInterval::new(start, end)
    }

    /// This interval restricted to `bound`
    pub fn clip(&self, bound: &TimeInterval) -> TimeInterval {
        self.intersect(bound)
    }

    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        !self.intersect(other).is_empty()
    }
}

impl fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {})",
            crate::utils::time::format_utc(self.start),
            crate::utils::time::format_utc(self.end)
        )
    }
}

/// Sum of durations
pub fn total_duration<'a, I>(intervals: I) -> TimeDelta
where
    I: IntoIterator<Item = &'a TimeInterval>,
{
    intervals
        .into_iter()
        .fold(TimeDelta::zero(), |acc, iv| acc + iv.duration())
}

/// Sort, drop empties and merge overlapping or touching intervals.
///
/// The result is ordered and pairwise disjoint.
pub fn normalize(mut intervals: Vec<TimeInterval>) -> Vec<TimeInterval> {
    intervals.retain(|iv| !iv.is_empty());
    intervals.sort();

    let mut merged: Vec<TimeInterval> = Vec::with_capacity(intervals.len());
    for iv in intervals {
        match merged.last_mut() {
            Some(last) if iv.start <= last.end => {
                last.end = last.end.max(iv.end);
            }
            _ => merged.push(iv),
        }
    }
    merged
}
