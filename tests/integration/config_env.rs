//! Layered configuration: defaults, env overrides, validation

use serial_test::serial;
use std::env;
use std::path::PathBuf;
use store_uptime::config::{AppConfig, DATABASE_PATH_ENV, DATA_DIR_ENV};
use store_uptime::engine::FailurePolicy;
use store_uptime::processor::{LoadConfig, ReportJobConfig};
use store_uptime::utils::math::RoundingPolicy;

struct EnvGuard(Vec<&'static str>);

impl EnvGuard {
    fn set(vars: &[(&'static str, &str)]) -> Self {
        for (key, value) in vars {
            env::set_var(key, value);
        }
        EnvGuard(vars.iter().map(|(key, _)| *key).collect())
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for key in &self.0 {
            env::remove_var(key);
        }
    }
}

#[test]
#[serial]
fn test_defaults_without_overrides() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    assert_eq!(config.paths.observations_file, "store_status.csv");
    assert_eq!(config.report.rounding, RoundingPolicy::HalfUp);
    assert_eq!(config.report.decimal_places, 2);
    assert_eq!(config.report.failure_policy, FailurePolicy::RecordPerStore);
    assert!(config.ingest.strict);
    Ok(())
}

#[test]
#[serial]
fn test_env_overrides_flow_into_processors() -> anyhow::Result<()> {
    let _guard = EnvGuard::set(&[
        (DATA_DIR_ENV, "/srv/uptime/data"),
        (DATABASE_PATH_ENV, "/srv/uptime/uptime.db"),
        ("STORE_UPTIME__REPORT__FAILURE_POLICY", "abort_run"),
        ("STORE_UPTIME__REPORT__DECIMAL_PLACES", "3"),
        ("STORE_UPTIME__INGEST__STRICT", "false"),
    ]);

    let config = AppConfig::load()?;
    assert_eq!(config.database.default_path, PathBuf::from("/srv/uptime/uptime.db"));

    let load = LoadConfig::from_app_config(&config);
    assert_eq!(load.data_dir, PathBuf::from("/srv/uptime/data"));
    assert!(!load.strict);

    let job = ReportJobConfig::from_app_config(&config);
    assert_eq!(job.options.failure_policy, FailurePolicy::AbortRun);
    assert_eq!(job.options.conversion.decimal_places, 3);
    Ok(())
}

#[test]
#[serial]
fn test_invalid_values_are_rejected() {
    let _guard = EnvGuard::set(&[("STORE_UPTIME__REPORT__WORKERS", "0")]);
    let config = AppConfig::load().unwrap();
    assert!(config.validate().is_err());
}
