//! Report job records and the output row schema

use crate::errors::{AppError, AppResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle of a report job: Pending → Running → Complete | Failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportStatus {
    Pending,
    Running,
    Complete,
    Failed,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Pending => "Pending",
            ReportStatus::Running => "Running",
            ReportStatus::Complete => "Complete",
            ReportStatus::Failed => "Failed",
        }
    }

    /// Whether `self → next` is a legal job transition
    pub fn can_transition_to(&self, next: ReportStatus) -> bool {
        matches!(
            (self, next),
            (ReportStatus::Pending, ReportStatus::Running)
                | (ReportStatus::Pending, ReportStatus::Failed)
                | (ReportStatus::Running, ReportStatus::Complete)
                | (ReportStatus::Running, ReportStatus::Failed)
        )
    }
}

impl FromStr for ReportStatus {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        match s {
            "Pending" => Ok(ReportStatus::Pending),
            "Running" => Ok(ReportStatus::Running),
            "Complete" => Ok(ReportStatus::Complete),
            "Failed" => Ok(ReportStatus::Failed),
            other => Err(AppError::InvalidData(format!(
                "Unknown report status: {:?}",
                other
            ))),
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persistent report job record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRecord {
    pub report_id: String,
    pub status: ReportStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub file_path: Option<String>,
    pub error_message: Option<String>,
}

/// Column order of the result table
pub const REPORT_CSV_HEADER: [&str; 7] = [
    "store_id",
    "uptime_last_hour(in minutes)",
    "uptime_last_day(in hours)",
    "uptime_last_week(in hours)",
    "downtime_last_hour(in minutes)",
    "downtime_last_day(in hours)",
    "downtime_last_week(in hours)",
];

/// One output row per store, values already converted and rounded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreReportRow {
    #[serde(rename = "store_id")]
    pub store_id: String,
    #[serde(rename = "uptime_last_hour(in minutes)")]
    pub uptime_last_hour_minutes: f64,
    #[serde(rename = "uptime_last_day(in hours)")]
    pub uptime_last_day_hours: f64,
    #[serde(rename = "uptime_last_week(in hours)")]
    pub uptime_last_week_hours: f64,
    #[serde(rename = "downtime_last_hour(in minutes)")]
    pub downtime_last_hour_minutes: f64,
    #[serde(rename = "downtime_last_day(in hours)")]
    pub downtime_last_day_hours: f64,
    #[serde(rename = "downtime_last_week(in hours)")]
    pub downtime_last_week_hours: f64,
}

/// Per-store failure recorded under the per-store failure policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreFailureRow {
    pub store_id: String,
    pub error: String,
}
