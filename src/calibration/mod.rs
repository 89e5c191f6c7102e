// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-airquality project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Calibration module
//!
//! This module converts raw electrochemical sensor voltages into
//! temperature-compensated gas concentration estimates. It contains:
//!
//! * [`engine`] - the pure correction functions (temperature interpolation
//!   and the per-gas formulas)
//! * [`record`] - validated, strongly-typed calibration records
//! * [`store`] - the calibration store abstraction (file or Redis backed)
//!
//! The engine is stateless: every invocation receives the calibration record
//! and the raw readings as arguments and performs no I/O, so it is safe to
//! call from any number of concurrent sampling loops.
//!
//! ## Correction algorithms
//!
//! The Alphasense B4 application notes define four correction algorithms;
//! each gas uses the one suggested for its sensor:
//!
//! ```text
//! 1) WEc = (WEu - WEe) - nT * (AEu - AEe)              NO2, NO2+O3, CO
//! 2) WEc = (WEu - WEe) - nT * (WEo/AEo) * (AEu - AEe)  NO
//! 4) WEc = (WEu - WEe) - WEo - nT                      SO2
//! ```
//!
//! where `WEu`/`AEu` are the raw electrode outputs, `WEe`/`AEe` the
//! electronic offsets, `WEo`/`AEo` the zero-air outputs and `nT` the
//! temperature dependent correction factor interpolated from the per-sensor
//! factor table.

pub mod engine;
pub mod record;
pub mod store;

pub use engine::{
    enrich, estimate_co, estimate_no, estimate_no2, estimate_o3, estimate_so2, temperature_factor,
};
pub use record::{Gas, GasCalibration, NodeCalibration, RawGasCalibration, RawNodeCalibration};
pub use store::{CalibrationStore, FileCalibrationStore, RedisCalibrationStore};

use thiserror::Error;

/// Errors produced while fetching calibration data or computing estimates
///
/// The sampling loop maps these onto its drop/alert policy: lookup misses
/// and malformed records indicate misconfiguration and are logged as errors,
/// an out-of-range ambient temperature is a physical condition and only
/// warrants a warning. None of them is retried within a cycle.
#[derive(Error, Debug)]
pub enum CalibrationError {
    #[error("no calibration record found for node '{node_id}'")]
    UnknownNode { node_id: String },

    #[error("missing calibration field '{field}'")]
    MissingCalibrationField { field: String },

    #[error("invalid calibration data: {reason}")]
    InvalidCalibration { reason: String },

    #[error("temperature {temperature}\u{b0}C is outside the calibrated range")]
    OutOfRangeTemperature { temperature: f64 },

    #[error("calibration store error: {reason}")]
    Store { reason: String },
}

impl CalibrationError {
    /// True for errors that indicate operator-facing misconfiguration
    /// rather than a transient or physical condition.
    pub fn is_misconfiguration(&self) -> bool {
        matches!(
            self,
            CalibrationError::MissingCalibrationField { .. }
                | CalibrationError::InvalidCalibration { .. }
        )
    }
}
