// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-airquality project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Calibration store configuration

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Configuration for the calibration lookup store
#[derive(Debug, Deserialize, Serialize, Clone, JsonSchema)]
pub struct CalibrationConfig {
    /// Backend holding the per-node calibration records
    #[serde(default)]
    pub store: CalibrationStoreConfig,
}

/// Selects the calibration store backend
#[derive(Debug, Deserialize, Serialize, Clone, JsonSchema)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CalibrationStoreConfig {
    /// YAML file mapping node ids to calibration records
    File { path: String },
    /// Redis, one JSON record per node under `{key_prefix}:{node_id}`
    Redis { url: String, key_prefix: String },
}

impl Default for CalibrationStoreConfig {
    fn default() -> Self {
        CalibrationStoreConfig::File {
            path: "calibration.yaml".to_string(),
        }
    }
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            store: CalibrationStoreConfig::default(),
        }
    }
}
