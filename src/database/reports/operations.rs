use crate::database::helpers::{report_from_row, REPORT_COLUMNS};
use crate::database::traits::ReportOperations;
use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::types::{ReportRecord, ReportStatus};
use crate::utils::time::to_micros;
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Transaction};
use tracing::debug;

/// Current status of a report, or NotFound
fn current_status(tx: &Transaction, report_id: &str) -> AppResult<ReportStatus> {
    let status: Option<String> = tx
        .query_row(
            "SELECT status FROM reports WHERE report_id = ?1",
            params![report_id],
            |row| row.get(0),
        )
        .optional()?;

    match status {
        Some(s) => s.parse(),
        None => Err(AppError::NotFound(format!("Report {}", report_id))),
    }
}

/// Check that `report_id` may move to `next`
fn guard_transition(tx: &Transaction, report_id: &str, next: ReportStatus) -> AppResult<()> {
    let current = current_status(tx, report_id)?;
    if !current.can_transition_to(next) {
        return Err(AppError::InvalidData(format!(
            "Report {} cannot move from {} to {}",
            report_id, current, next
        )));
    }
    debug!("Report {}: {} -> {}", report_id, current, next);
    Ok(())
}

impl ReportOperations for Database {
    fn create_report(
        &mut self,
        report_id: &str,
        created_at: DateTime<Utc>,
    ) -> AppResult<ReportRecord> {
        self.connection().execute(
            "INSERT INTO reports (report_id, status, created_at) VALUES (?1, ?2, ?3)",
            params![report_id, ReportStatus::Pending.as_str(), to_micros(created_at)],
        )?;

        Ok(ReportRecord {
            report_id: report_id.to_string(),
            status: ReportStatus::Pending,
            created_at,
            completed_at: None,
            file_path: None,
            error_message: None,
        })
    }

    fn get_report(&self, report_id: &str) -> AppResult<Option<ReportRecord>> {
        let record = self
            .connection()
            .query_row(
                &format!("SELECT {} FROM reports WHERE report_id = ?1", REPORT_COLUMNS),
                params![report_id],
                report_from_row,
            )
            .optional()?;
        Ok(record)
    }

    fn list_reports(&self, limit: usize) -> AppResult<Vec<ReportRecord>> {
        let mut stmt = self.connection().prepare_cached(&format!(
            "SELECT {} FROM reports ORDER BY created_at DESC, report_id LIMIT ?1",
            REPORT_COLUMNS
        ))?;
        let records = stmt
            .query_map(params![limit as i64], report_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    fn mark_report_running(&mut self, report_id: &str) -> AppResult<()> {
        self.execute_transaction(|tx| {
            guard_transition(tx, report_id, ReportStatus::Running)?;
            tx.execute(
                "UPDATE reports SET status = ?2 WHERE report_id = ?1",
                params![report_id, ReportStatus::Running.as_str()],
            )?;
            Ok(())
        })
    }

    fn mark_report_complete(
        &mut self,
        report_id: &str,
        file_path: &str,
        note: Option<&str>,
        completed_at: DateTime<Utc>,
    ) -> AppResult<()> {
        self.execute_transaction(|tx| {
            guard_transition(tx, report_id, ReportStatus::Complete)?;
            tx.execute(
                r#"UPDATE reports
                   SET status = ?2, file_path = ?3, error_message = ?4, completed_at = ?5
                   WHERE report_id = ?1"#,
                params![
                    report_id,
                    ReportStatus::Complete.as_str(),
                    file_path,
                    note,
                    to_micros(completed_at)
                ],
            )?;
            Ok(())
        })
    }

    fn mark_report_failed(
        &mut self,
        report_id: &str,
        error_message: &str,
        completed_at: DateTime<Utc>,
    ) -> AppResult<()> {
        self.execute_transaction(|tx| {
            guard_transition(tx, report_id, ReportStatus::Failed)?;
            tx.execute(
                r#"UPDATE reports
                   SET status = ?2, file_path = NULL, error_message = ?3, completed_at = ?4
                   WHERE report_id = ?1"#,
                params![
                    report_id,
                    ReportStatus::Failed.as_str(),
                    error_message,
                    to_micros(completed_at)
                ],
            )?;
            Ok(())
        })
    }
}
