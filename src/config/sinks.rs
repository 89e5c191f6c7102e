// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-airquality project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Output sink configuration
//!
//! Settings for the three record sinks: InfluxDB time-series writes, Redis
//! pub/sub publishing and the local CSV log. Each sink is independently
//! enabled; a sample is fanned out to every enabled sink.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// InfluxDB 1.x write settings
#[derive(Debug, Deserialize, Serialize, Clone, JsonSchema)]
pub struct InfluxDbConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Base URL of the InfluxDB server
    #[serde(default = "default_influxdb_url")]
    pub url: String,

    /// Target database name
    #[serde(default = "default_database")]
    pub database: String,

    /// Username for authentication (empty to disable)
    #[serde(default)]
    pub username: String,

    /// Password for authentication
    #[serde(default)]
    pub password: String,

    /// Measurement name records are written under
    #[serde(default = "default_measurement")]
    pub measurement: String,
}

fn default_influxdb_url() -> String {
    "http://localhost:8086".to_string()
}

fn default_database() -> String {
    "logger_db".to_string()
}

fn default_measurement() -> String {
    "air-quality-data".to_string()
}

impl Default for InfluxDbConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: default_influxdb_url(),
            database: default_database(),
            username: String::new(),
            password: String::new(),
            measurement: default_measurement(),
        }
    }
}

/// Redis pub/sub publishing settings
#[derive(Debug, Deserialize, Serialize, Clone, JsonSchema)]
pub struct PublishConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Redis connection URL (e.g., "redis://127.0.0.1:6379")
    #[serde(default = "default_redis_url")]
    pub url: String,

    /// Channel enriched records are published to as JSON
    #[serde(default = "default_channel")]
    pub channel: String,
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379".to_string()
}

fn default_channel() -> String {
    "air-quality-data".to_string()
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: default_redis_url(),
            channel: default_channel(),
        }
    }
}

/// Local CSV log settings
#[derive(Debug, Deserialize, Serialize, Clone, JsonSchema)]
pub struct CsvLogConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Path of the append-only CSV file
    #[serde(default = "default_csv_path")]
    pub path: String,
}

fn default_csv_path() -> String {
    "air_quality_log.csv".to_string()
}

impl Default for CsvLogConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: default_csv_path(),
        }
    }
}
