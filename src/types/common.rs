//! Common types shared across ingestion, storage and computation
//!
//! Raw CSV records mirror the exact file structure; the domain types are what
//! the database stores and the engine consumes.

use crate::errors::{AppError, AppResult};
use crate::utils::time::parse_timestamp_utc;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Observed store status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreStatus {
    Active,
    Inactive,
}

impl StoreStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreStatus::Active => "active",
            StoreStatus::Inactive => "inactive",
        }
    }
}

impl FromStr for StoreStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(StoreStatus::Active),
            "inactive" => Ok(StoreStatus::Inactive),
            other => Err(AppError::InvalidData(format!(
                "Unknown store status: {:?}",
                other
            ))),
        }
    }
}

impl fmt::Display for StoreStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A timestamped status sample for one store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub store_id: String,
    pub timestamp: DateTime<Utc>,
    pub status: StoreStatus,
}

impl Observation {
    pub fn new(store_id: impl Into<String>, timestamp: DateTime<Utc>, status: StoreStatus) -> Self {
        Self {
            store_id: store_id.into(),
            timestamp,
            status,
        }
    }
}

/// Declared opening hours for one weekday (0 = Monday ... 6 = Sunday).
///
/// Local times are kept as their source text; the engine parses them so a
/// malformed value fails only the owning store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessHourRule {
    pub store_id: String,
    pub day_of_week: i64,
    pub start_local: String,
    pub end_local: String,
}

impl BusinessHourRule {
    pub fn new(
        store_id: impl Into<String>,
        day_of_week: i64,
        start_local: impl Into<String>,
        end_local: impl Into<String>,
    ) -> Self {
        Self {
            store_id: store_id.into(),
            day_of_week,
            start_local: start_local.into(),
            end_local: end_local.into(),
        }
    }

    /// Both local times missing: the row declares nothing
    pub fn is_blank(&self) -> bool {
        self.start_local.trim().is_empty() && self.end_local.trim().is_empty()
    }
}

/// IANA timezone name assigned to a store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimezoneAssignment {
    pub store_id: String,
    pub timezone: String,
}

impl TimezoneAssignment {
    pub fn new(store_id: impl Into<String>, timezone: impl Into<String>) -> Self {
        Self {
            store_id: store_id.into(),
            timezone: timezone.into(),
        }
    }
}

/// Raw status record from `store_status.csv`
#[derive(Debug, Clone, Deserialize)]
pub struct StatusRecord {
    pub store_id: String,
    pub status: String,
    pub timestamp_utc: String,
}

impl StatusRecord {
    pub fn to_observation(&self) -> AppResult<Observation> {
        let store_id = self.store_id.trim();
        if store_id.is_empty() {
            return Err(AppError::InvalidData("Empty store_id".to_string()));
        }
        Ok(Observation {
            store_id: store_id.to_string(),
            timestamp: parse_timestamp_utc(&self.timestamp_utc)?,
            status: self.status.parse()?,
        })
    }
}

/// Raw record from `business_hours.csv` / `menu_hours.csv`
#[derive(Debug, Clone, Deserialize)]
pub struct BusinessHoursRecord {
    pub store_id: String,
    #[serde(alias = "dayOfWeek", alias = "day")]
    pub day_of_week: String,
    pub start_time_local: String,
    pub end_time_local: String,
}

impl BusinessHoursRecord {
    /// A row with both local times blank is an absent declaration, not an error
    pub fn to_rule(&self) -> AppResult<Option<BusinessHourRule>> {
        let store_id = self.store_id.trim();
        if store_id.is_empty() {
            return Err(AppError::InvalidData("Empty store_id".to_string()));
        }
        let day_of_week = self.day_of_week.trim().parse::<i64>().map_err(|_| {
            AppError::InvalidData(format!("Invalid day of week: {:?}", self.day_of_week))
        })?;
        let rule = BusinessHourRule {
            store_id: store_id.to_string(),
            day_of_week,
            start_local: self.start_time_local.trim().to_string(),
            end_local: self.end_time_local.trim().to_string(),
        };
        Ok(Some(rule).filter(|rule| !rule.is_blank()))
    }
}

/// Raw record from `store_timezone.csv` / `timezones.csv`
#[derive(Debug, Clone, Deserialize)]
pub struct TimezoneRecord {
    pub store_id: String,
    #[serde(default)]
    pub timezone_str: Option<String>,
}

impl TimezoneRecord {
    /// A blank timezone is an absent assignment, not an error
    pub fn to_assignment(&self) -> AppResult<Option<TimezoneAssignment>> {
        let store_id = self.store_id.trim();
        if store_id.is_empty() {
            return Err(AppError::InvalidData("Empty store_id".to_string()));
        }
        Ok(self
            .timezone_str
            .as_deref()
            .map(str::trim)
            .filter(|tz| !tz.is_empty())
            .map(|tz| TimezoneAssignment::new(store_id, tz)))
    }
}
