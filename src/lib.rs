//! Store uptime/downtime reporting
//!
//! Derives, per store, how long it was up and down within its business hours
//! over the last hour, day and week, from sparse status observations.

pub mod cli;
pub mod config;
pub mod database;
pub mod engine;
pub mod errors;
pub mod processor;
pub mod reports;
pub mod types;
pub mod utils;
