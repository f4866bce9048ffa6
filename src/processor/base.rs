use crate::errors::{AppError, AppResult};
use std::io::Write;
use std::time::Instant;
use tracing::{info, warn};

/// Throttles progress output for long-running loads
pub struct StandardProgressTracker {
    start_time: Option<Instant>,
    last_report: Option<Instant>,
    report_interval_ms: u64,
}

impl Default for StandardProgressTracker {
    fn default() -> Self {
        Self {
            start_time: None,
            last_report: None,
            report_interval_ms: 500,
        }
    }
}

impl StandardProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        let now = Instant::now();
        self.start_time = Some(now);
        self.last_report = Some(now);
    }

    pub fn should_report(&mut self) -> bool {
        let now = Instant::now();
        match self.last_report {
            Some(last) if now.duration_since(last).as_millis() <= self.report_interval_ms as u128 => {
                false
            }
            _ => {
                self.last_report = Some(now);
                true
            }
        }
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.start_time
            .map(|start| start.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }
}

/// Validation of processing settings before any work starts
pub struct ConfigValidator;

impl ConfigValidator {
    pub const MAX_DECIMAL_PLACES: u32 = 6;

    pub fn validate_batch_config(batch_size: usize) -> AppResult<()> {
        if batch_size == 0 {
            return Err(AppError::Config(
                "Batch size must be greater than 0".to_string(),
            ));
        }
        if batch_size > 1_000_000 {
            warn!(
                "Large batch size: {} - this may impact memory usage",
                batch_size
            );
        }
        Ok(())
    }

    pub fn validate_report_config(workers: usize, decimal_places: u32) -> AppResult<()> {
        if workers == 0 {
            return Err(AppError::Config(
                "Worker count must be greater than 0".to_string(),
            ));
        }
        if decimal_places > Self::MAX_DECIMAL_PLACES {
            return Err(AppError::Config(format!(
                "Decimal places must be at most {} (got {})",
                Self::MAX_DECIMAL_PLACES,
                decimal_places
            )));
        }
        Ok(())
    }

    pub fn log_config_summary(processor_name: &str, settings: &[(&str, String)]) {
        info!("=== {} Configuration ===", processor_name);
        for (name, value) in settings {
            info!("  {}: {}", name, value);
        }
    }
}

/// Per-processor metrics shown on the progress line
pub trait StageMetrics {
    /// e.g. "Observations: 100 | Malformed: 5"
    fn format_custom_metrics(&self) -> String;
}

/// Progress reporting utilities
pub struct ProgressReporter;

impl ProgressReporter {
    /// Human-readable elapsed time
    pub fn format_elapsed_time(elapsed_secs: f64) -> String {
        if elapsed_secs < 60.0 {
            return format!("{:.1}s", elapsed_secs);
        }

        let total = elapsed_secs.round() as u64;
        let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
        if hours == 0 {
            format!("{}m {}s ({:.1}s)", minutes, seconds, elapsed_secs)
        } else {
            format!("{}h {}m {}s ({:.1}s)", hours, minutes, seconds, elapsed_secs)
        }
    }

    pub fn report_completion(operation: &str, summary: &str, elapsed: f64) {
        info!("=== {} Completed ===", operation);
        info!("  {}", summary);
        info!("  Time elapsed: {}", Self::format_elapsed_time(elapsed));
    }

    pub fn finish_progress_line() {
        println!();
    }

    pub fn format_standard_progress(
        processed_count: usize,
        rate: f64,
        elapsed: f64,
        custom_metrics: &str,
    ) -> String {
        format!(
            "Processed: {} | Rate: {:.1}/sec | Elapsed: {} | {}",
            processed_count,
            rate,
            Self::format_elapsed_time(elapsed),
            custom_metrics
        )
    }

    pub fn print_progress_line(message: &str) -> AppResult<()> {
        print!("\r{}", message);
        std::io::stdout().flush().map_err(AppError::Io)?;
        Ok(())
    }

    pub fn report_progress_with_metrics<T: StageMetrics>(
        metrics: &T,
        processed_count: usize,
        elapsed_secs: f64,
    ) -> AppResult<()> {
        let rate = if elapsed_secs > 0.0 {
            processed_count as f64 / elapsed_secs
        } else {
            0.0
        };

        let message = Self::format_standard_progress(
            processed_count,
            rate,
            elapsed_secs,
            &metrics.format_custom_metrics(),
        );
        Self::print_progress_line(&message)
    }
}
