//! Business schedule resolution: declared local opening hours → UTC intervals.
//!
//! Defaulting is a two-level fallback resolved in one place,
//! [`BusinessSchedule::hours_for`]:
//! 1. a store with no rules at all is open 24×7;
//! 2. a store with rules, but none for a given weekday, is open all that day;
//! 3. otherwise the declared spans apply, `start == end` meaning closed.
//!
//! A span whose end is before its start wraps past local midnight.

use crate::engine::interval::{normalize, TimeInterval};
use crate::errors::StoreError;
use crate::types::BusinessHourRule;
use crate::utils::time::{local_to_utc, parse_local_time};
use chrono::{Datelike, Days, NaiveDate, NaiveTime, Weekday};
use chrono_tz::Tz;
use std::collections::BTreeMap;
use tracing::debug;

/// Timezone applied when a store has no assignment
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::America::Chicago;

/// Resolve a store's timezone. Absence falls back to [`DEFAULT_TIMEZONE`];
/// a present but unrecognised name is an error.
pub fn resolve_timezone(assignment: Option<&str>) -> Result<Tz, StoreError> {
    match assignment {
        None => Ok(DEFAULT_TIMEZONE),
        Some(name) => name
            .trim()
            .parse::<Tz>()
            .map_err(|_| StoreError::UnknownTimezone {
                timezone: name.to_string(),
            }),
    }
}

/// One declared local opening span
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LocalSpan {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl LocalSpan {
    pub fn is_closed(&self) -> bool {
        self.start == self.end
    }

    pub fn wraps_midnight(&self) -> bool {
        self.end < self.start
    }
}

/// Opening hours of one local calendar day after defaulting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DayHours {
    AllDay,
    Spans(Vec<LocalSpan>),
}

/// A store's weekly schedule in its own timezone
#[derive(Debug, Clone, PartialEq)]
pub struct BusinessSchedule {
    timezone: Tz,
    /// `None` when the store declared no rules at all. Keyed 0 = Monday.
    weekly: Option<BTreeMap<u32, Vec<LocalSpan>>>,
}

impl BusinessSchedule {
    /// Open around the clock
    pub fn always_open(timezone: Tz) -> Self {
        Self {
            timezone,
            weekly: None,
        }
    }

    /// Parse a store's rule rows. Rows with both times blank are absent
    /// declarations and leave the defaults in place.
    pub fn from_rules(timezone: Tz, rules: &[BusinessHourRule]) -> Result<Self, StoreError> {
        let declared: Vec<&BusinessHourRule> =
            rules.iter().filter(|rule| !rule.is_blank()).collect();
        if declared.is_empty() {
            return Ok(Self::always_open(timezone));
        }

        let mut weekly: BTreeMap<u32, Vec<LocalSpan>> = BTreeMap::new();
        for rule in declared {
            let day = u32::try_from(rule.day_of_week)
                .ok()
                .filter(|d| *d <= 6)
                .ok_or_else(|| StoreError::MalformedScheduleRule {
                    day_of_week: rule.day_of_week,
                    value: rule.day_of_week.to_string(),
                    reason: "day of week must be 0 (Monday) through 6 (Sunday)".to_string(),
                })?;
            let start = parse_rule_time(rule, &rule.start_local)?;
            let end = parse_rule_time(rule, &rule.end_local)?;
            weekly.entry(day).or_default().push(LocalSpan { start, end });
        }
        for spans in weekly.values_mut() {
            spans.sort();
            spans.dedup();
        }

        Ok(Self {
            timezone,
            weekly: Some(weekly),
        })
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn has_rules(&self) -> bool {
        self.weekly.is_some()
    }

    /// Effective hours for a weekday after applying the fallback chain
    pub fn hours_for(&self, weekday: Weekday) -> DayHours {
        match &self.weekly {
            None => DayHours::AllDay,
            Some(weekly) => match weekly.get(&weekday.num_days_from_monday()) {
                None => DayHours::AllDay,
                Some(spans) => DayHours::Spans(spans.clone()),
            },
        }
    }

    /// Open time within `range` as ordered, disjoint UTC intervals
    pub fn open_intervals(&self, range: TimeInterval) -> Vec<TimeInterval> {
        if range.is_empty() {
            return Vec::new();
        }
        if self.weekly.is_none() {
            return vec![range];
        }

        let tz = &self.timezone;
        let first_local = range.start().with_timezone(tz).date_naive();
        let last_local = range.end().with_timezone(tz).date_naive();
        // Start one day early so a wrapping span from the previous day is seen.
        let first = first_local.checked_sub_days(Days::new(1)).unwrap_or(first_local);

        let mut intervals = Vec::new();
        for date in first.iter_days().take_while(|d| *d <= last_local) {
            for local in self.local_intervals(date) {
                let clipped = local.clip(&range);
                if !clipped.is_empty() {
                    intervals.push(clipped);
                }
            }
        }

        let merged = normalize(intervals);
        debug!(
            "Resolved {} open intervals in {} ({})",
            merged.len(),
            range,
            self.timezone
        );
        merged
    }

    /// UTC intervals for one local calendar day, unclipped
    fn local_intervals(&self, date: NaiveDate) -> Vec<TimeInterval> {
        let tz = &self.timezone;
        let next = date.checked_add_days(Days::new(1)).unwrap_or(date);
        match self.hours_for(date.weekday()) {
            DayHours::AllDay => vec![TimeInterval::new(
                local_to_utc(tz, date.and_time(NaiveTime::MIN)),
                local_to_utc(tz, next.and_time(NaiveTime::MIN)),
            )],
            DayHours::Spans(spans) => spans
                .iter()
                .filter(|span| !span.is_closed())
                .map(|span| {
                    let end_date = if span.wraps_midnight() { next } else { date };
                    TimeInterval::new(
                        local_to_utc(tz, date.and_time(span.start)),
                        local_to_utc(tz, end_date.and_time(span.end)),
                    )
                })
                .collect(),
        }
    }
}

fn parse_rule_time(rule: &BusinessHourRule, value: &str) -> Result<NaiveTime, StoreError> {
    parse_local_time(value).ok_or_else(|| StoreError::MalformedScheduleRule {
        day_of_week: rule.day_of_week,
        value: value.to_string(),
        reason: "unparseable local time".to_string(),
    })
}
