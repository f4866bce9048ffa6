//! Result table output
//!
//! Formats report rows via the [`ReportFormatter`] facade and writes the CSV
//! files recorded against report jobs.

pub mod console;
pub mod writer;

use crate::engine::ReportOutcome;
use crate::errors::{AppError, AppResult};
use serde::Serialize;

pub use writer::{
    failures_file_name, report_file_name, write_failures_file, write_report_file, write_rows,
};

/// Output format options for report rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Console,
    Json,
    Csv,
}

impl OutputFormat {
    /// Unknown names fall back to console output
    pub fn parse(format_str: &str) -> Self {
        match format_str.trim().to_lowercase().as_str() {
            "json" => OutputFormat::Json,
            "csv" => OutputFormat::Csv,
            _ => OutputFormat::Console,
        }
    }
}

/// Facade for report formatting
pub struct ReportFormatter;

impl ReportFormatter {
    pub fn format_outcome(outcome: &ReportOutcome, format: OutputFormat) -> AppResult<String> {
        match format {
            OutputFormat::Console => Ok(console::format_outcome(outcome)),
            OutputFormat::Json => export_json(&console::OutcomeView::from(outcome)),
            OutputFormat::Csv => {
                let mut buffer = Vec::new();
                write_rows(&mut buffer, &outcome.rows)?;
                String::from_utf8(buffer)
                    .map_err(|e| AppError::InvalidData(format!("CSV output not UTF-8: {}", e)))
            }
        }
    }
}

/// Export data as JSON for programmatic use
pub fn export_json<T: Serialize>(data: &T) -> AppResult<String> {
    Ok(serde_json::to_string_pretty(data)?)
}
