//! Closed, already-loaded dataset handed to one report run.

use crate::types::{BusinessHourRule, Observation, TimezoneAssignment};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// The three source tables for one run.
///
/// Observations are kept in input order; that order is the tie-break for
/// duplicate timestamps.
#[derive(Debug, Clone, Default)]
pub struct DatasetSnapshot {
    pub observations: Vec<Observation>,
    pub business_hours: Vec<BusinessHourRule>,
    pub timezones: Vec<TimezoneAssignment>,
}

/// Everything the engine needs for one store
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreInputs {
    pub observations: Vec<Observation>,
    pub business_hours: Vec<BusinessHourRule>,
    /// Last assignment seen for the store, if any
    pub timezone: Option<String>,
}

impl DatasetSnapshot {
    pub fn new(
        observations: Vec<Observation>,
        business_hours: Vec<BusinessHourRule>,
        timezones: Vec<TimezoneAssignment>,
    ) -> Self {
        Self {
            observations,
            business_hours,
            timezones,
        }
    }

    /// Global "now": the latest observation across every store
    pub fn reference_time(&self) -> Option<DateTime<Utc>> {
        self.observations.iter().map(|o| o.timestamp).max()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty() && self.business_hours.is_empty() && self.timezones.is_empty()
    }

    /// Union of store ids across all three tables, ascending
    pub fn store_ids(&self) -> Vec<String> {
        self.partition().into_keys().collect()
    }

    /// Group the tables by store id. Keys are the union of ids in ascending order.
    pub fn partition(&self) -> BTreeMap<String, StoreInputs> {
        let mut stores: BTreeMap<String, StoreInputs> = BTreeMap::new();

        for obs in &self.observations {
            stores
                .entry(obs.store_id.clone())
                .or_default()
                .observations
                .push(obs.clone());
        }
        for rule in &self.business_hours {
            stores
                .entry(rule.store_id.clone())
                .or_default()
                .business_hours
                .push(rule.clone());
        }
        for tz in &self.timezones {
            stores.entry(tz.store_id.clone()).or_default().timezone = Some(tz.timezone.clone());
        }

        stores
    }
}
