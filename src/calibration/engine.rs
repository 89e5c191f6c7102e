// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-airquality project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Correction engine
//!
//! Pure functions mapping `(calibration record, raw readings, ambient
//! temperature)` to concentration estimates in ppm. Each gas applies the
//! correction algorithm suggested by the sensor manufacturer (see the module
//! documentation of [`crate::calibration`]), divides the corrected
//! working-electrode signal by the sensor sensitivity, clamps negative
//! results to zero and rounds to 3 decimal places.
//!
//! The functions perform no I/O and hold no state; concurrent sampling loops
//! may call them freely. The only ordering constraint is within a single
//! cycle: the O3 estimate is derived from the combined NO2+O3 channel by
//! subtracting the NO2 estimate, so [`estimate_o3`] takes that estimate as
//! an explicit parameter and [`enrich`] computes NO2 first.

use crate::measurement::{ConcentrationSet, RawSample};

use super::record::{Gas, GasCalibration, NodeCalibration};
use super::CalibrationError;

/// Temperature bucket width of the correction factor tables, in degC
const BUCKET_WIDTH: f64 = 10.0;

/// Lowest temperature covered by the factor tables, in degC
const TABLE_ORIGIN: f64 = -30.0;

/// Interpolate the temperature dependent correction factor `nT`.
///
/// `table` holds one factor per 10 degree bucket starting at -30 degC; the
/// documented sensor tables span -30 degC to +50 degC with 9 entries. The
/// factor is interpolated linearly between the two bucket boundaries
/// enclosing `temperature`.
///
/// The fractional position inside a bucket uses floor-style modulo
/// (`rem_euclid`), so it stays in `[0, 1)` below 0 degC and the factor is
/// continuous across every bucket edge. On an exact bucket edge the factor
/// is the table entry itself, which keeps the top edge of the table (+50
/// degC for 9 entries) valid without reading past the end.
///
/// # Errors
///
/// [`CalibrationError::OutOfRangeTemperature`] when `temperature` lies
/// outside the span covered by `table`.
pub fn temperature_factor(table: &[f64], temperature: f64) -> Result<f64, CalibrationError> {
    let position = (temperature - TABLE_ORIGIN) / BUCKET_WIDTH;
    if !position.is_finite() || position < 0.0 {
        return Err(CalibrationError::OutOfRangeTemperature { temperature });
    }

    let index = position.floor() as usize;
    if index >= table.len() {
        return Err(CalibrationError::OutOfRangeTemperature { temperature });
    }

    let fractional = temperature.rem_euclid(BUCKET_WIDTH) / BUCKET_WIDTH;
    if fractional == 0.0 {
        return Ok(table[index]);
    }
    if index + 1 >= table.len() {
        return Err(CalibrationError::OutOfRangeTemperature { temperature });
    }

    Ok(table[index] + fractional * (table[index + 1] - table[index]))
}

fn field(value: Option<f64>, gas: Gas, name: &str) -> Result<f64, CalibrationError> {
    value.ok_or_else(|| CalibrationError::MissingCalibrationField {
        field: format!("{}_{}", gas.prefix(), name),
    })
}

fn checked_sensitivity(cal: &GasCalibration, gas: Gas) -> Result<f64, CalibrationError> {
    if cal.sensitivity == 0.0 || !cal.sensitivity.is_finite() {
        return Err(CalibrationError::InvalidCalibration {
            reason: format!("{}_sensitivity must be non-zero", gas.prefix()),
        });
    }
    Ok(cal.sensitivity)
}

/// Round a concentration to 3 decimal places
fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Scale a corrected WE signal to ppm, clamp negatives to zero and round.
///
/// The clamp is deliberate: physical concentrations cannot be negative, so
/// a negative raw estimate is floored to 0 rather than treated as an error.
fn to_ppm(we_corrected: f64, sensitivity: f64) -> f64 {
    round3((we_corrected / sensitivity).max(0.0))
}

/// Corrected WE output for the algorithm-1 gases:
/// `WEc = (WEu - WEe) - nT * (AEu - AEe)`
fn corrected_with_aux(
    cal: &GasCalibration,
    gas: Gas,
    we_raw: f64,
    ae_raw: f64,
    temperature: f64,
) -> Result<f64, CalibrationError> {
    let ae_offset = field(cal.ae_offset, gas, "ae_offset")?;
    let nt = temperature_factor(&cal.temp_factor, temperature)?;
    Ok((we_raw - cal.we_offset) - nt * (ae_raw - ae_offset))
}

/// SO2 estimate in ppm (algorithm 4): `WEc = (WEu - WEe) - WEo - nT`
pub fn estimate_so2(
    cal: &GasCalibration,
    we_raw: f64,
    temperature: f64,
) -> Result<f64, CalibrationError> {
    let sensitivity = checked_sensitivity(cal, Gas::So2)?;
    let we_zero = field(cal.we_zero, Gas::So2, "we_zero")?;
    let nt = temperature_factor(&cal.temp_factor, temperature)?;

    let we_corrected = (we_raw - cal.we_offset) - we_zero - nt;
    Ok(to_ppm(we_corrected, sensitivity))
}

/// NO2 estimate in ppm (algorithm 1)
pub fn estimate_no2(
    cal: &GasCalibration,
    we_raw: f64,
    ae_raw: f64,
    temperature: f64,
) -> Result<f64, CalibrationError> {
    let sensitivity = checked_sensitivity(cal, Gas::No2)?;
    let we_corrected = corrected_with_aux(cal, Gas::No2, we_raw, ae_raw, temperature)?;
    Ok(to_ppm(we_corrected, sensitivity))
}

/// O3 estimate in ppm, derived from the combined NO2+O3 sensor.
///
/// Applies algorithm 1 to the Ox channel and subtracts `no2_estimate`, the
/// already clamped and rounded NO2 estimate of the *same* sampling cycle.
/// The dependency is an explicit parameter so a stale or missing NO2 value
/// cannot slip in through shared state; [`enrich`] wires it correctly.
pub fn estimate_o3(
    cal: &GasCalibration,
    we_raw: f64,
    ae_raw: f64,
    temperature: f64,
    no2_estimate: f64,
) -> Result<f64, CalibrationError> {
    let sensitivity = checked_sensitivity(cal, Gas::Ox)?;
    let we_corrected = corrected_with_aux(cal, Gas::Ox, we_raw, ae_raw, temperature)?;

    // The Ox channel reads NO2 + O3; the unrounded channel estimate minus
    // the NO2 estimate isolates O3. Clamping and rounding happen after the
    // subtraction.
    let ox_estimate = we_corrected / sensitivity;
    Ok(round3((ox_estimate - no2_estimate).max(0.0)))
}

/// CO estimate in ppm (algorithm 1)
pub fn estimate_co(
    cal: &GasCalibration,
    we_raw: f64,
    ae_raw: f64,
    temperature: f64,
) -> Result<f64, CalibrationError> {
    let sensitivity = checked_sensitivity(cal, Gas::Co)?;
    let we_corrected = corrected_with_aux(cal, Gas::Co, we_raw, ae_raw, temperature)?;
    Ok(to_ppm(we_corrected, sensitivity))
}

/// NO estimate in ppm (algorithm 2):
/// `WEc = (WEu - WEe) - nT * (WEo/AEo) * (AEu - AEe)`
pub fn estimate_no(
    cal: &GasCalibration,
    we_raw: f64,
    ae_raw: f64,
    temperature: f64,
) -> Result<f64, CalibrationError> {
    let sensitivity = checked_sensitivity(cal, Gas::No)?;
    let ae_offset = field(cal.ae_offset, Gas::No, "ae_offset")?;
    let we_zero = field(cal.we_zero, Gas::No, "we_zero")?;
    let ae_zero = field(cal.ae_zero, Gas::No, "ae_zero")?;
    if ae_zero == 0.0 {
        return Err(CalibrationError::InvalidCalibration {
            reason: "no_ae_zero must be non-zero".to_string(),
        });
    }
    let nt = temperature_factor(&cal.temp_factor, temperature)?;

    let we_corrected = (we_raw - cal.we_offset) - nt * (we_zero / ae_zero) * (ae_raw - ae_offset);
    Ok(to_ppm(we_corrected, sensitivity))
}

/// Compute all five concentration estimates for one sampling cycle.
///
/// NO2 is computed before O3 because the O3 estimate subtracts it. No
/// partial result is returned: the first failing gas aborts the whole
/// sample, so callers can always distinguish "clamped to zero" from
/// "failed to compute".
pub fn enrich(
    calibration: &NodeCalibration,
    sample: &RawSample,
) -> Result<ConcentrationSet, CalibrationError> {
    let temperature = sample.temperature;

    let so2 = estimate_so2(&calibration.so2, sample.so2_we, temperature)?;
    let no2 = estimate_no2(&calibration.no2, sample.no2_we, sample.no2_ae, temperature)?;
    let o3 = estimate_o3(
        &calibration.ox,
        sample.ox_we,
        sample.ox_ae,
        temperature,
        no2,
    )?;
    let co = estimate_co(&calibration.co, sample.co_we, sample.co_ae, temperature)?;
    let no = estimate_no(&calibration.no, sample.no_we, sample.no_ae, temperature)?;

    Ok(ConcentrationSet {
        so2,
        no2,
        o3,
        co,
        no,
    })
}
