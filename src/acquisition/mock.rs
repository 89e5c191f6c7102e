// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-airquality project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Mock sample source module
//!
//! This module provides a mock sample source that generates synthetic raw
//! sensor readings for testing and running without hardware. Voltages are
//! drawn around the typical electrode outputs of the B4 sensors so the
//! correction formulas produce plausible, mostly-positive estimates.

use anyhow::Result;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::SampleSource;
use crate::measurement::RawSample;

/// Typical electrode baselines in millivolts (WE, AE) per gas channel
const SO2_BASELINE: (f64, f64) = (730.0, 295.0);
const NO2_BASELINE: (f64, f64) = (245.0, 228.0);
const OX_BASELINE: (f64, f64) = (260.0, 222.0);
const CO_BASELINE: (f64, f64) = (420.0, 345.0);
const NO_BASELINE: (f64, f64) = (340.0, 250.0);

/// Mock sample source generating synthetic raw readings
pub struct MockSource {
    node_id: String,
    rng: StdRng,
}

impl MockSource {
    pub fn new(node_id: String) -> Self {
        Self {
            node_id,
            rng: StdRng::from_os_rng(),
        }
    }

    fn electrode_pair(&mut self, baseline: (f64, f64)) -> (f64, f64) {
        let we = baseline.0 + self.rng.random_range(-8.0..8.0);
        let ae = baseline.1 + self.rng.random_range(-4.0..4.0);
        (we, ae)
    }
}

impl SampleSource for MockSource {
    fn read_sample(&mut self) -> Result<Option<RawSample>> {
        let (so2_we, so2_ae) = self.electrode_pair(SO2_BASELINE);
        let (no2_we, no2_ae) = self.electrode_pair(NO2_BASELINE);
        let (ox_we, ox_ae) = self.electrode_pair(OX_BASELINE);
        let (co_we, co_ae) = self.electrode_pair(CO_BASELINE);
        let (no_we, no_ae) = self.electrode_pair(NO_BASELINE);

        Ok(Some(RawSample {
            timestamp: Utc::now(),
            node_id: self.node_id.clone(),
            temperature: self.rng.random_range(12.0..24.0),
            humidity: self.rng.random_range(40.0..75.0),
            pm2_5: self.rng.random_range(2.0..30.0),
            pm10: self.rng.random_range(5.0..50.0),
            so2_we,
            so2_ae,
            no2_we,
            no2_ae,
            ox_we,
            ox_ae,
            co_we,
            co_ae,
            no_we,
            no_ae,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_source_read_sample() {
        let mut source = MockSource::new("42".to_string());

        let sample = source.read_sample().unwrap().unwrap();
        assert_eq!(sample.node_id, "42");
        assert!(sample.temperature >= 12.0 && sample.temperature < 24.0);
        assert!(sample.so2_we > 0.0);
        assert!(sample.pm2_5 >= 2.0 && sample.pm2_5 < 30.0);
    }

    #[test]
    fn test_mock_source_never_exhausts() {
        let mut source = MockSource::new("1".to_string());
        for _ in 0..10 {
            assert!(source.read_sample().unwrap().is_some());
        }
    }
}
