//! Console table rendering of report rows

use crate::engine::ReportOutcome;
use crate::types::{StoreFailureRow, StoreReportRow};
use crate::utils::time::format_utc;
use serde::Serialize;

/// Serializable view of an outcome for JSON output
#[derive(Debug, Serialize)]
pub struct OutcomeView<'a> {
    pub reference_time: String,
    pub rows: &'a [StoreReportRow],
    pub failures: Vec<StoreFailureRow>,
}

impl<'a> From<&'a ReportOutcome> for OutcomeView<'a> {
    fn from(outcome: &'a ReportOutcome) -> Self {
        Self {
            reference_time: format_utc(outcome.reference_time),
            rows: &outcome.rows,
            failures: outcome.failures.iter().map(|f| f.to_row()).collect(),
        }
    }
}

const COLUMNS: [&str; 7] = [
    "store_id",
    "up 1h (min)",
    "up 1d (h)",
    "up 1w (h)",
    "down 1h (min)",
    "down 1d (h)",
    "down 1w (h)",
];

/// Fixed-width table followed by any failures
pub fn format_outcome(outcome: &ReportOutcome) -> String {
    let id_width = outcome
        .rows
        .iter()
        .map(|r| r.store_id.len())
        .chain(std::iter::once(COLUMNS[0].len()))
        .max()
        .unwrap_or_default();

    let mut output = format!("Reference time: {}\n", format_utc(outcome.reference_time));
    output.push_str(&format!("{:<width$}", COLUMNS[0], width = id_width));
    for column in &COLUMNS[1..] {
        output.push_str(&format!(" {:>13}", column));
    }
    output.push('\n');

    for row in &outcome.rows {
        output.push_str(&format!("{:<width$}", row.store_id, width = id_width));
        for value in [
            row.uptime_last_hour_minutes,
            row.uptime_last_day_hours,
            row.uptime_last_week_hours,
            row.downtime_last_hour_minutes,
            row.downtime_last_day_hours,
            row.downtime_last_week_hours,
        ] {
            output.push_str(&format!(" {:>13.2}", value));
        }
        output.push('\n');
    }

    output.push_str(&format!("\nStores: {}", outcome.rows.len()));
    if outcome.is_partial() {
        output.push_str(&format!(" ({} failed)\n", outcome.failures.len()));
        for failure in &outcome.failures {
            let row = failure.to_row();
            output.push_str(&format!("  {}: {}\n", row.store_id, row.error));
        }
    } else {
        output.push('\n');
    }

    output
}
