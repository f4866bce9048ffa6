//! CSV writers for report rows and per-store failures

use crate::errors::AppResult;
use crate::types::{StoreFailureRow, StoreReportRow, REPORT_CSV_HEADER};
use csv::WriterBuilder;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tracing::debug;

pub fn report_file_name(report_id: &str) -> String {
    format!("report_{}.csv", report_id)
}

pub fn failures_file_name(report_id: &str) -> String {
    format!("report_{}_failures.csv", report_id)
}

/// Write the header and one record per row. The header is written even when
/// there are no rows.
pub fn write_rows<W: Write>(out: W, rows: &[StoreReportRow]) -> AppResult<()> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(out);
    writer.write_record(REPORT_CSV_HEADER)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write rows to `path`, creating parent directories
pub fn write_report_file(path: &Path, rows: &[StoreReportRow]) -> AppResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    write_rows(File::create(path)?, rows)?;
    debug!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

/// Write `store_id, error` rows to `path`
pub fn write_failures_file(path: &Path, failures: &[StoreFailureRow]) -> AppResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut writer = WriterBuilder::new().from_path(path)?;
    for failure in failures {
        writer.serialize(failure)?;
    }
    writer.flush()?;
    debug!("Wrote {} failures to {}", failures.len(), path.display());
    Ok(())
}
