// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-airquality project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Measurement record types
//!
//! This module defines the data exchanged between the acquisition layer, the
//! calibration engine and the sinks: one raw sample per cycle, and the
//! enriched record that adds the concentration estimates to it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One raw sampling cycle as produced by a [`SampleSource`](crate::acquisition::SampleSource).
///
/// All electrochemical channels are working-electrode (`*_we`) and
/// auxiliary-electrode (`*_ae`) voltages in millivolts. `ox_*` is the
/// combined NO2+O3 sensor. Particulate values are in µg/m³, temperature in
/// °C and humidity in %RH.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    /// Acquisition time (serialized as an ISO-8601 string)
    pub timestamp: DateTime<Utc>,
    /// Identifier of the node that produced this sample
    pub node_id: String,
    pub temperature: f64,
    pub humidity: f64,
    pub pm2_5: f64,
    pub pm10: f64,
    pub so2_we: f64,
    pub so2_ae: f64,
    pub no2_we: f64,
    pub no2_ae: f64,
    pub ox_we: f64,
    pub ox_ae: f64,
    pub co_we: f64,
    pub co_ae: f64,
    pub no_we: f64,
    pub no_ae: f64,
}

/// Concentration estimates for one sampling cycle, in ppm.
///
/// Every value is non-negative and rounded to 3 decimal places by the
/// calibration engine. A zero may therefore mean "clamped from a negative
/// raw estimate"; a failed computation never produces a zero, it surfaces as
/// a [`CalibrationError`](crate::calibration::CalibrationError) instead.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConcentrationSet {
    pub so2: f64,
    pub no2: f64,
    pub o3: f64,
    pub co: f64,
    pub no: f64,
}

/// A raw sample together with its concentration estimates.
///
/// This is the record the sinks persist/publish. Serialization flattens the
/// raw fields so the wire form matches the original node payload plus the
/// five `*_estimate` fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    #[serde(flatten)]
    pub sample: RawSample,
    pub so2_estimate: f64,
    pub no2_estimate: f64,
    pub o3_estimate: f64,
    pub co_estimate: f64,
    pub no_estimate: f64,
}

impl EnrichedRecord {
    /// Combine a raw sample with the estimates computed for it
    pub fn new(sample: RawSample, concentrations: ConcentrationSet) -> Self {
        Self {
            sample,
            so2_estimate: concentrations.so2,
            no2_estimate: concentrations.no2,
            o3_estimate: concentrations.o3,
            co_estimate: concentrations.co,
            no_estimate: concentrations.no,
        }
    }
}
