// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-airquality project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Tests for configuration loading, defaults, validation rules and command
//! line overrides.

use std::io::Write;

use anyhow::Result;
use tempfile::NamedTempFile;

use rust_airquality::config::{CalibrationStoreConfig, Config, SampleSourceConfig};

fn config_file(content: &str) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    file.write_all(content.as_bytes())?;
    file.flush()?;
    Ok(file)
}

#[test]
fn test_full_config_parses() -> Result<()> {
    let file = config_file(
        r#"
acquisition:
  enabled: true
  node_id: "3"
  interval_ms: 2000
  source:
    type: csv
    path: recorded_samples.csv
  warmup_secs: 0
  discard_first: false

calibration:
  store:
    type: redis
    url: redis://cache:6379
    key_prefix: calibration

influxdb:
  enabled: true
  url: http://influx:8086
  database: airquality
  username: logger
  password: secret
  measurement: outdoor

publish:
  enabled: true
  url: redis://cache:6379
  channel: enriched-records

csv_log:
  enabled: true
  path: /var/log/air_quality.csv
"#,
    )?;

    let config = Config::from_file(file.path())?;
    assert_eq!(config.acquisition.node_id, "3");
    assert_eq!(config.acquisition.interval_ms, 2000);
    assert!(!config.acquisition.discard_first);
    assert!(matches!(
        config.acquisition.source,
        SampleSourceConfig::Csv { ref path } if path == "recorded_samples.csv"
    ));
    assert!(matches!(
        config.calibration.store,
        CalibrationStoreConfig::Redis { ref key_prefix, .. } if key_prefix == "calibration"
    ));
    assert_eq!(config.influxdb.measurement, "outdoor");
    assert_eq!(config.publish.channel, "enriched-records");
    assert_eq!(config.csv_log.path, "/var/log/air_quality.csv");
    Ok(())
}

#[test]
fn test_minimal_config_uses_defaults() -> Result<()> {
    let file = config_file(
        r#"
acquisition:
  node_id: "7"
"#,
    )?;

    let config = Config::from_file(file.path())?;
    assert_eq!(config.acquisition.node_id, "7");
    assert!(config.acquisition.enabled);
    assert_eq!(config.acquisition.interval_ms, 5000);
    assert_eq!(config.acquisition.warmup_secs, 10);
    assert!(config.acquisition.discard_first);
    assert!(matches!(
        config.acquisition.source,
        SampleSourceConfig::Mock
    ));
    assert!(matches!(
        config.calibration.store,
        CalibrationStoreConfig::File { ref path } if path == "calibration.yaml"
    ));
    assert!(!config.influxdb.enabled);
    assert!(!config.publish.enabled);
    assert!(!config.csv_log.enabled);
    Ok(())
}

#[test]
fn test_zero_interval_is_rejected() -> Result<()> {
    let file = config_file(
        r#"
acquisition:
  interval_ms: 0
"#,
    )?;

    let result = Config::from_file(file.path());
    assert!(result.is_err());
    let message = format!("{:#}", result.unwrap_err());
    assert!(message.contains("interval_ms"), "got: {}", message);
    Ok(())
}

#[test]
fn test_empty_node_id_is_rejected() -> Result<()> {
    let file = config_file(
        r#"
acquisition:
  node_id: ""
"#,
    )?;

    assert!(Config::from_file(file.path()).is_err());
    Ok(())
}

#[test]
fn test_enabled_sink_requires_target() {
    let mut config = Config::default();
    config.publish.enabled = true;
    config.publish.channel = String::new();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.csv_log.enabled = true;
    config.csv_log.path = String::new();
    assert!(config.validate().is_err());
}

#[test]
fn test_apply_args_overrides_file_values() {
    let mut config = Config::default();
    config.apply_args(
        Some("9".to_string()),
        Some(1000),
        Some("override.csv".to_string()),
        Some("http://influx:9999".to_string()),
    );

    assert_eq!(config.acquisition.node_id, "9");
    assert_eq!(config.acquisition.interval_ms, 1000);
    assert!(config.csv_log.enabled);
    assert_eq!(config.csv_log.path, "override.csv");
    assert!(config.influxdb.enabled);
    assert_eq!(config.influxdb.url, "http://influx:9999");
}

#[test]
fn test_apply_args_keeps_file_values_when_absent() {
    let mut config = Config::default();
    config.acquisition.node_id = "4".to_string();
    config.apply_args(None, None, None, None);

    assert_eq!(config.acquisition.node_id, "4");
    assert!(!config.csv_log.enabled);
    assert!(!config.influxdb.enabled);
}

#[test]
fn test_missing_config_file_is_an_error() {
    assert!(Config::from_file("/nonexistent/config.yaml").is_err());
}
