// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-airquality project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Calibration record types
//!
//! Calibration data arrives from the store as a loosely-typed per-node map
//! (every field may be absent). [`RawNodeCalibration`] is that wire form;
//! [`NodeCalibration`] is the validated form handed to the engine. Validation
//! happens once per fetch, so a malformed store entry is rejected outright
//! instead of surfacing as a `NaN` or a division by zero mid-computation.

use serde::{Deserialize, Serialize};

use super::CalibrationError;

/// The electrochemical sensors carried by a node.
///
/// `Ox` is the combined NO2+O3 sensor; the O3 estimate is derived from its
/// channel by subtracting the NO2 estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gas {
    So2,
    No2,
    Ox,
    Co,
    No,
}

impl Gas {
    /// Field-name prefix used in store entries and error messages
    /// (`so2_we_offset`, `no_ae_zero`, ...)
    pub fn prefix(&self) -> &'static str {
        match self {
            Gas::So2 => "so2",
            Gas::No2 => "no2",
            Gas::Ox => "ox",
            Gas::Co => "co",
            Gas::No => "no",
        }
    }
}

/// Unvalidated per-gas calibration entry as stored
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawGasCalibration {
    pub we_offset: Option<f64>,
    pub ae_offset: Option<f64>,
    pub we_zero: Option<f64>,
    pub ae_zero: Option<f64>,
    pub temp_factor: Option<Vec<f64>>,
    pub sensitivity: Option<f64>,
}

/// Validated per-gas calibration coefficients
///
/// `we_offset`, `temp_factor` and `sensitivity` are required for every gas.
/// The remaining fields are required depending on the correction algorithm
/// the gas uses (see the module documentation of [`crate::calibration`]);
/// they stay optional here and [`validate`](RawGasCalibration::validate)
/// guarantees presence for the gas at hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GasCalibration {
    /// WE electronic offset on the sensor board, millivolts
    pub we_offset: f64,
    /// AE electronic offset on the sensor board, millivolts
    pub ae_offset: Option<f64>,
    /// WE output in zero air, millivolts
    pub we_zero: Option<f64>,
    /// AE output in zero air, millivolts
    pub ae_zero: Option<f64>,
    /// Temperature correction factors, one per 10 degree bucket from
    /// -30 degC to +50 degC (9 entries)
    pub temp_factor: Vec<f64>,
    /// Sensor sensitivity in mV/ppm, non-zero
    pub sensitivity: f64,
}

fn missing(gas: Gas, field: &str) -> CalibrationError {
    CalibrationError::MissingCalibrationField {
        field: format!("{}_{}", gas.prefix(), field),
    }
}

fn require(value: Option<f64>, gas: Gas, field: &str) -> Result<f64, CalibrationError> {
    value
        .filter(|v| v.is_finite())
        .ok_or_else(|| missing(gas, field))
}

impl RawGasCalibration {
    /// Validate this entry for the given gas.
    ///
    /// Checks presence and finiteness of every field the gas's correction
    /// algorithm uses, rejects a zero or non-finite `sensitivity`, rejects a
    /// zero `ae_zero` for NO (it is a divisor), and requires a factor table
    /// with at least two entries.
    pub fn validate(&self, gas: Gas) -> Result<GasCalibration, CalibrationError> {
        let we_offset = require(self.we_offset, gas, "we_offset")?;
        let sensitivity = require(self.sensitivity, gas, "sensitivity")?;
        if sensitivity == 0.0 {
            return Err(CalibrationError::InvalidCalibration {
                reason: format!("{}_sensitivity must be non-zero", gas.prefix()),
            });
        }

        let temp_factor = self
            .temp_factor
            .clone()
            .ok_or_else(|| missing(gas, "temp_factor"))?;
        if temp_factor.len() < 2 || temp_factor.iter().any(|f| !f.is_finite()) {
            return Err(CalibrationError::InvalidCalibration {
                reason: format!(
                    "{}_temp_factor must hold at least two finite entries",
                    gas.prefix()
                ),
            });
        }

        // Per-algorithm required fields
        let (ae_offset, we_zero, ae_zero) = match gas {
            // Algorithm 4: WE channel only, zero-air baseline
            Gas::So2 => (
                self.ae_offset,
                Some(require(self.we_zero, gas, "we_zero")?),
                self.ae_zero,
            ),
            // Algorithm 1: AE cross-term
            Gas::No2 | Gas::Ox | Gas::Co => (
                Some(require(self.ae_offset, gas, "ae_offset")?),
                self.we_zero,
                self.ae_zero,
            ),
            // Algorithm 2: AE cross-term scaled by the zero-air ratio
            Gas::No => {
                let ae_zero = require(self.ae_zero, gas, "ae_zero")?;
                if ae_zero == 0.0 {
                    return Err(CalibrationError::InvalidCalibration {
                        reason: "no_ae_zero must be non-zero".to_string(),
                    });
                }
                (
                    Some(require(self.ae_offset, gas, "ae_offset")?),
                    Some(require(self.we_zero, gas, "we_zero")?),
                    Some(ae_zero),
                )
            }
        };

        Ok(GasCalibration {
            we_offset,
            ae_offset,
            we_zero,
            ae_zero,
            temp_factor,
            sensitivity,
        })
    }
}

/// Unvalidated per-node calibration record as stored
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawNodeCalibration {
    pub so2: Option<RawGasCalibration>,
    pub no2: Option<RawGasCalibration>,
    pub ox: Option<RawGasCalibration>,
    pub co: Option<RawGasCalibration>,
    pub no: Option<RawGasCalibration>,
}

/// Validated calibration record for one node, one entry per gas sensor.
///
/// Immutable once constructed; the sampling loop fetches a fresh record from
/// the store on every cycle so recalibration takes effect without a restart.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeCalibration {
    pub so2: GasCalibration,
    pub no2: GasCalibration,
    pub ox: GasCalibration,
    pub co: GasCalibration,
    pub no: GasCalibration,
}

impl RawNodeCalibration {
    /// Validate all five per-gas entries
    pub fn validate(&self) -> Result<NodeCalibration, CalibrationError> {
        let entry = |raw: &Option<RawGasCalibration>, gas: Gas| {
            raw.as_ref()
                .ok_or_else(|| CalibrationError::MissingCalibrationField {
                    field: gas.prefix().to_string(),
                })
                .and_then(|r| r.validate(gas))
        };

        Ok(NodeCalibration {
            so2: entry(&self.so2, Gas::So2)?,
            no2: entry(&self.no2, Gas::No2)?,
            ox: entry(&self.ox, Gas::Ox)?,
            co: entry(&self.co, Gas::Co)?,
            no: entry(&self.no, Gas::No)?,
        })
    }
}
