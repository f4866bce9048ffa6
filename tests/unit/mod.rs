//! Unit Tests Module
//!
//! Engine behaviour checked through the public API.

pub mod engine_scenarios;
pub mod window_properties;
