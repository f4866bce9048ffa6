//! Statistics framework for ingestion and report runs
//!
//! Both collectors share the [`StatisticsCollector`] trait and the
//! [`TimingInfo`] helper so the CLI can summarise either uniformly.

use std::time::{Duration, Instant};

/// Common trait for all statistics collectors
pub trait StatisticsCollector {
    /// Reset all counters to zero
    fn reset(&mut self);

    /// Get the processing start time
    fn start_time(&self) -> Instant;

    /// Get the total processing duration
    fn duration(&self) -> Duration;

    /// Calculate the processing rate (items per second)
    fn processing_rate(&self) -> f64;

    /// Finalize statistics collection
    fn finish(&mut self);

    /// Get a summary of the statistics
    fn summary(&self) -> String;
}

/// Common timing information for all statistics
#[derive(Debug, Clone)]
pub struct TimingInfo {
    pub start_time: Instant,
    pub processing_duration: Duration,
}

impl Default for TimingInfo {
    fn default() -> Self {
        Self::new()
    }
}

impl TimingInfo {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            processing_duration: Duration::default(),
        }
    }

    pub fn finish(&mut self) {
        self.processing_duration = self.start_time.elapsed();
    }

    pub fn elapsed(&self) -> Duration {
        if self.processing_duration.is_zero() {
            self.start_time.elapsed()
        } else {
            self.processing_duration
        }
    }
}

/// CSV ingestion statistics
#[derive(Debug, Clone, Default)]
pub struct LoadStats {
    pub observations_read: usize,
    pub observations_inserted: usize,
    pub business_hours_read: usize,
    pub business_hours_inserted: usize,
    pub timezones_read: usize,
    pub timezones_inserted: usize,
    /// Rows that declare nothing, skipped per file
    pub observations_blank: usize,
    /// Business-hour rows with both local times blank
    pub business_hours_blank: usize,
    /// Blank timezone rows treated as absent assignments
    pub timezones_blank: usize,
    pub malformed_records: usize,
    pub batches_processed: usize,
    /// Load skipped because data was already present
    pub skipped: bool,
    pub timing: TimingInfo,
}

impl LoadStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_read(&self) -> usize {
        self.observations_read + self.business_hours_read + self.timezones_read
    }

    pub fn total_inserted(&self) -> usize {
        self.observations_inserted + self.business_hours_inserted + self.timezones_inserted
    }
}

impl crate::processor::StageMetrics for LoadStats {
    fn format_custom_metrics(&self) -> String {
        format!(
            "Observations: {} | Rules: {} | Timezones: {} | Malformed: {}",
            self.observations_inserted,
            self.business_hours_inserted,
            self.timezones_inserted,
            self.malformed_records
        )
    }
}

impl StatisticsCollector for LoadStats {
    fn reset(&mut self) {
        *self = Self::default();
    }

    fn start_time(&self) -> Instant {
        self.timing.start_time
    }

    fn duration(&self) -> Duration {
        self.timing.elapsed()
    }

    fn processing_rate(&self) -> f64 {
        let elapsed = self.timing.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.total_read() as f64 / elapsed
        } else {
            0.0
        }
    }

    fn finish(&mut self) {
        self.timing.finish();
    }

    fn summary(&self) -> String {
        if self.skipped {
            return "Load skipped: data already present".to_string();
        }
        format!(
            "Loaded {} observations, {} business-hour rules, {} timezones ({} malformed, {} blank rules, {} blank timezones), {:.1} records/sec",
            self.observations_inserted,
            self.business_hours_inserted,
            self.timezones_inserted,
            self.malformed_records,
            self.business_hours_blank,
            self.timezones_blank,
            self.processing_rate()
        )
    }
}

/// Report run statistics
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    pub stores_total: usize,
    pub stores_failed: usize,
    pub shards: usize,
    pub timing: TimingInfo,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stores_succeeded(&self) -> usize {
        self.stores_total.saturating_sub(self.stores_failed)
    }
}

impl StatisticsCollector for RunStats {
    fn reset(&mut self) {
        *self = Self::default();
    }

    fn start_time(&self) -> Instant {
        self.timing.start_time
    }

    fn duration(&self) -> Duration {
        self.timing.elapsed()
    }

    fn processing_rate(&self) -> f64 {
        let elapsed = self.timing.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.stores_total as f64 / elapsed
        } else {
            0.0
        }
    }

    fn finish(&mut self) {
        self.timing.finish();
    }

    fn summary(&self) -> String {
        format!(
            "Report: {} stores ({} ok, {} failed) across {} shards, {:.1} stores/sec",
            self.stores_total,
            self.stores_succeeded(),
            self.stores_failed,
            self.shards,
            self.processing_rate()
        )
    }
}
