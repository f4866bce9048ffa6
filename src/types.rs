//! Store Uptime Reporting - Type System
//!
//! - `common`: Source records shared by ingestion, storage and the engine
//!   (Observation, BusinessHourRule, TimezoneAssignment and their raw CSV forms)
//! - `report`: Report job records and the output row schema
//! - `statistics`: Load and run statistics with common traits

mod common;
mod report;
pub mod statistics;

pub use common::*;
pub use report::*;

pub use statistics::{LoadStats, RunStats};
