//! Integration Tests Module
//!
//! End-to-end tests across ingestion, storage, the engine and report jobs.

pub mod config_env;
pub mod report_pipeline;
