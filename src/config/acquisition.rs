// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-airquality project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Data acquisition configuration
//!
//! This module defines the structures for configuring the sampling loop of
//! the air quality node.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Configuration for the sampling process.
///
/// This structure contains settings that control how raw samples are
/// acquired from the node's sensors, including timing parameters and
/// whether the sampling loop is enabled.
#[derive(Debug, Deserialize, Serialize, Clone, JsonSchema)]
pub struct AcquisitionConfig {
    /// Flag to enable or disable the sampling loop.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Identifier of this node, used as the calibration lookup key and as
    /// the `node_id` tag on persisted records.
    #[serde(default = "default_node_id")]
    pub node_id: String,

    /// Time interval in milliseconds between samples.
    ///
    /// The original outdoor deployment sampled roughly every 5 seconds.
    /// Must be greater than zero.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Where raw samples come from
    #[serde(default)]
    pub source: SampleSourceConfig,

    /// Seconds to wait after startup before the first sample, giving the
    /// optical particle counter time to stabilize.
    #[serde(default = "default_warmup_secs")]
    pub warmup_secs: u64,

    /// Read and discard the first sample, as the OPC vendor guidance
    /// recommends for the first histogram after power-on.
    #[serde(default = "default_discard_first")]
    pub discard_first: bool,
}

/// Selects the sample source implementation
#[derive(Debug, Deserialize, Serialize, Clone, JsonSchema)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SampleSourceConfig {
    /// Synthetic raw voltages, for running without hardware
    Mock,
    /// Replay recorded raw samples from a CSV file
    Csv { path: String },
}

impl Default for SampleSourceConfig {
    fn default() -> Self {
        SampleSourceConfig::Mock
    }
}

fn default_enabled() -> bool {
    true
}

fn default_node_id() -> String {
    "1".to_string()
}

fn default_interval_ms() -> u64 {
    5000 // 5 seconds between samples
}

fn default_warmup_secs() -> u64 {
    10 // OPC stabilization delay used by the outdoor deployment
}

fn default_discard_first() -> bool {
    true
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            node_id: default_node_id(),
            interval_ms: default_interval_ms(),
            source: SampleSourceConfig::default(),
            warmup_secs: default_warmup_secs(),
            discard_first: default_discard_first(),
        }
    }
}
