// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-airquality project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Sample acquisition module
//!
//! This module handles the acquisition of raw sensor samples, either
//! synthetic (mock) or replayed from a recorded CSV file, and the sampling
//! daemon that drives the calibration engine and the sinks.
//!
//! The physical sensor buses (SPI optical counter, ADC reads) live behind
//! the [`SampleSource`] trait: a hardware implementation plugs in without
//! touching the rest of the pipeline.

use anyhow::Result;

pub mod daemon;
mod file;
mod mock;

pub use daemon::SamplingDaemon;
pub use file::{CsvFileSource, RAW_SAMPLE_COLUMNS};
pub use mock::MockSource;

use crate::config::{AcquisitionConfig, SampleSourceConfig};
use crate::measurement::RawSample;

/// Represents a source of raw sensor samples
pub trait SampleSource: Send {
    /// Read the next raw sample.
    ///
    /// Returns `Ok(None)` when the source is exhausted (end of a replay
    /// file); live sources never return `None`.
    fn read_sample(&mut self) -> Result<Option<RawSample>>;
}

/// Build the sample source selected by the configuration
pub fn get_sample_source(config: &AcquisitionConfig) -> Result<Box<dyn SampleSource>> {
    match &config.source {
        SampleSourceConfig::Mock => Ok(Box::new(MockSource::new(config.node_id.clone()))),
        SampleSourceConfig::Csv { path } => Ok(Box::new(CsvFileSource::new(path)?)),
    }
}
