//! Uptime computation engine.
//!
//! Pure and stateless: given a [`DatasetSnapshot`] and a reference time it
//! deterministically produces one row per store. No I/O happens here.
//!
//! - [`interval`]: half-open UTC interval primitives
//! - [`schedule`]: declared local hours → UTC open intervals
//! - [`timeline`]: sparse observations → labelled status spans
//! - [`aggregator`]: open ∩ status → uptime/downtime, unit conversion
//! - [`driver`]: reference time, windows, per-store evaluation and ordering
//! - [`snapshot`]: the closed dataset handed to one run

pub mod aggregator;
pub mod driver;
pub mod interval;
pub mod schedule;
pub mod snapshot;
pub mod timeline;

pub use aggregator::{aggregate, DurationUnit, UnitConversion, UptimeTotals};
pub use driver::{
    assemble, evaluate_shard, evaluate_store, prepare, run_report, FailurePolicy, ReportOptions,
    ReportOutcome, ReportPlan, ReportWindow, StoreFailure, StoreMetrics, StoreResult,
    StoreWindowMetrics, DEFAULT_REFERENCE_TIME,
};
pub use interval::TimeInterval;
pub use schedule::{resolve_timezone, BusinessSchedule, DayHours, LocalSpan, DEFAULT_TIMEZONE};
pub use snapshot::{DatasetSnapshot, StoreInputs};
pub use timeline::{interpolate, StatusSpan, StatusTimeline};
