pub mod base;
pub mod csv_loader;
pub mod executor;
pub mod report_job;

pub use base::*;
pub use csv_loader::{CsvLoader, LoadConfig};
pub use executor::{run_sharded, shard_stores};
pub use report_job::{ReportJob, ReportJobConfig};
