use super::{load_app_config, open_database};
use crate::database::ReportOperations;
use crate::errors::{AppError, AppResult};
use crate::reports::export_json;
use crate::types::{ReportRecord, ReportStatus};
use clap::Args;
use std::path::PathBuf;

fn fetch_report(database_path: &Option<PathBuf>, report_id: &str) -> AppResult<ReportRecord> {
    let app_config = load_app_config()?;
    let database = open_database(database_path, &app_config)?;
    database
        .get_report(report_id)?
        .ok_or_else(|| AppError::NotFound(format!("Report {}", report_id)))
}

/// Poll a report: status while in progress, file location once complete
#[derive(Args)]
pub struct GetReportCommand {
    #[arg(long)]
    report_id: String,

    /// Database path (overrides config.toml and env vars)
    #[arg(long)]
    database_path: Option<PathBuf>,

    /// Print the CSV contents of a complete report
    #[arg(long)]
    print: bool,
}

impl GetReportCommand {
    pub fn run(&self) -> AppResult<()> {
        let record = fetch_report(&self.database_path, &self.report_id)?;

        match (&record.status, &record.file_path) {
            (ReportStatus::Complete, Some(path)) => {
                if self.print {
                    print!("{}", std::fs::read_to_string(path)?);
                } else {
                    println!("{}: {}", record.status, path);
                }
                if let Some(note) = &record.error_message {
                    eprintln!("{}", note);
                }
            }
            (ReportStatus::Failed, _) => {
                println!(
                    "{}: {}",
                    record.status,
                    record.error_message.as_deref().unwrap_or("unknown error")
                );
            }
            (status, _) => println!("{}", status),
        }
        Ok(())
    }
}

/// Dump the full job record as JSON
#[derive(Args)]
pub struct DebugReportCommand {
    #[arg(long)]
    report_id: String,

    /// Database path (overrides config.toml and env vars)
    #[arg(long)]
    database_path: Option<PathBuf>,
}

impl DebugReportCommand {
    pub fn run(&self) -> AppResult<()> {
        let record = fetch_report(&self.database_path, &self.report_id)?;
        println!("{}", export_json(&record)?);
        Ok(())
    }
}
