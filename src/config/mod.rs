// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-airquality project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Configuration module
//!
//! YAML configuration for the air quality daemon, one submodule per
//! concern. The top-level [`Config`] is loaded from a file with
//! [`Config::from_file`], merged with command line overrides via
//! [`Config::apply_args`], and its JSON schema can be dumped with
//! [`output_config_schema`] for editor tooling.

mod acquisition;
mod calibration;
mod sinks;

pub use acquisition::{AcquisitionConfig, SampleSourceConfig};
pub use calibration::{CalibrationConfig, CalibrationStoreConfig};
pub use sinks::{CsvLogConfig, InfluxDbConfig, PublishConfig};

use anyhow::{bail, Context, Result};
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Top-level daemon configuration
///
/// Every section has sensible defaults, so a minimal configuration file can
/// set only what differs from them:
///
/// ```yaml
/// acquisition:
///   node_id: "3"
///   interval_ms: 5000
/// calibration:
///   store:
///     type: file
///     path: calibration.yaml
/// csv_log:
///   enabled: true
///   path: /var/log/air_quality.csv
/// ```
#[derive(Debug, Default, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Config {
    /// Sampling loop settings
    #[serde(default)]
    pub acquisition: AcquisitionConfig,

    /// Calibration store settings
    #[serde(default)]
    pub calibration: CalibrationConfig,

    /// InfluxDB sink settings
    #[serde(default)]
    pub influxdb: InfluxDbConfig,

    /// Redis pub/sub sink settings
    #[serde(default)]
    pub publish: PublishConfig,

    /// Local CSV log sink settings
    #[serde(default)]
    pub csv_log: CsvLogConfig,
}

impl Config {
    /// Load and validate a configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file {}", path.display()))?;

        let config: Config = serde_yml::from_str(&content)
            .with_context(|| format!("Failed to parse configuration file {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate rules that the type system cannot express
    pub fn validate(&self) -> Result<()> {
        if self.acquisition.interval_ms == 0 {
            bail!("acquisition.interval_ms must be greater than zero");
        }
        if self.acquisition.node_id.is_empty() {
            bail!("acquisition.node_id must not be empty");
        }
        if self.influxdb.enabled && self.influxdb.url.is_empty() {
            bail!("influxdb.url must be set when the InfluxDB sink is enabled");
        }
        if self.publish.enabled && self.publish.channel.is_empty() {
            bail!("publish.channel must be set when the publish sink is enabled");
        }
        if self.csv_log.enabled && self.csv_log.path.is_empty() {
            bail!("csv_log.path must be set when the CSV sink is enabled");
        }
        Ok(())
    }

    /// Apply command line overrides on top of the file configuration
    pub fn apply_args(
        &mut self,
        node_id: Option<String>,
        interval_ms: Option<u64>,
        csv_path: Option<String>,
        influxdb_url: Option<String>,
    ) {
        if let Some(node_id) = node_id {
            self.acquisition.node_id = node_id;
        }
        if let Some(interval_ms) = interval_ms {
            self.acquisition.interval_ms = interval_ms;
        }
        if let Some(csv_path) = csv_path {
            self.csv_log.enabled = true;
            self.csv_log.path = csv_path;
        }
        if let Some(influxdb_url) = influxdb_url {
            self.influxdb.enabled = true;
            self.influxdb.url = influxdb_url;
        }
    }
}

/// Output the configuration JSON schema to the console.
///
/// This function is called when the `--show-config-schema` flag is provided
/// on the command line.
///
/// ### Example
///
/// ```bash
/// ./rust_airquality --show-config-schema > config_schema.json
/// ```
pub fn output_config_schema() -> Result<()> {
    let schema = schema_for!(Config);
    let formatted_schema =
        serde_json::to_string_pretty(&schema).context("Failed to format JSON schema")?;
    println!("{}", formatted_schema);
    Ok(())
}
