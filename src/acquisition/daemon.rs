// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-airquality project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Sampling daemon module
//!
//! This module provides the daemon that drives one node's sampling cycles:
//! read a raw sample, fetch a fresh calibration record, compute the
//! concentration estimates and fan the enriched record out to the sinks.
//!
//! Error policy per cycle:
//!
//! * calibration lookup miss or malformed calibration data - logged as an
//!   error (operator-facing misconfiguration) and the sample dropped
//! * ambient temperature outside the calibrated range - logged as a warning
//!   and the sample dropped; the condition is physical, retrying is
//!   pointless
//! * sink failures - logged, remaining sinks still receive the record
//!
//! Dropped samples are never replaced by partial or zeroed records.

use anyhow::Result;
use log::{debug, error, info, warn};
use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc,
};
use std::time::Duration;
use tokio::time::interval;

use crate::calibration::{enrich, CalibrationStore};
use crate::measurement::EnrichedRecord;
use crate::sink::RecordSink;

use super::SampleSource;

/// Sampling daemon that periodically reads a sample source, corrects the
/// readings and writes the enriched records to the configured sinks
pub struct SamplingDaemon {
    /// Raw sample source (hardware, mock or file replay)
    source: Box<dyn SampleSource>,
    /// Calibration lookup store, queried fresh on every cycle
    store: Box<dyn CalibrationStore>,
    /// Output sinks receiving every enriched record
    sinks: Vec<Box<dyn RecordSink>>,
    /// Flag to control daemon execution
    running: Arc<AtomicBool>,
    /// Processed sample counter
    sample_counter: Arc<AtomicU64>,
    /// Milliseconds between samples
    interval_ms: u64,
}

impl SamplingDaemon {
    /// Create a new sampling daemon
    ///
    /// ### Parameters
    /// * `source` - The sample source to read from
    /// * `store` - The calibration store queried per cycle
    /// * `sinks` - Sinks receiving the enriched records
    /// * `interval_ms` - Sampling period in milliseconds
    /// * `running` - Shared flag; clearing it stops the loop
    pub fn new(
        source: Box<dyn SampleSource>,
        store: Box<dyn CalibrationStore>,
        sinks: Vec<Box<dyn RecordSink>>,
        interval_ms: u64,
        running: Arc<AtomicBool>,
    ) -> Self {
        Self {
            source,
            store,
            sinks,
            running,
            sample_counter: Arc::new(AtomicU64::new(0)),
            interval_ms,
        }
    }

    /// Run the sampling loop until stopped or the source is exhausted
    pub async fn start(&mut self) -> Result<()> {
        for sink in &mut self.sinks {
            sink.initialize().await?;
        }

        info!(
            "Starting sampling daemon, period {} ms, {} sink(s)",
            self.interval_ms,
            self.sinks.len()
        );

        let mut ticker = interval(Duration::from_millis(self.interval_ms));
        while self.running.load(Ordering::SeqCst) {
            ticker.tick().await;

            match self.process_next().await {
                Ok(true) => {
                    let count = self.sample_counter.fetch_add(1, Ordering::Relaxed) + 1;
                    if count % 100 == 0 {
                        debug!("Processed {} samples", count);
                    }
                }
                Ok(false) => {
                    info!("Sample source exhausted, stopping sampling daemon");
                    break;
                }
                Err(e) => {
                    // Unexpected failure outside the per-cycle policy
                    error!("Sampling cycle failed: {}", e);
                }
            }
        }

        info!("Sampling daemon stopped");
        Ok(())
    }

    /// Process a single sampling cycle.
    ///
    /// Returns `Ok(false)` when the source is exhausted. A dropped sample
    /// (calibration error) still returns `Ok(true)`: the loop carries on
    /// with the next cycle.
    pub async fn process_next(&mut self) -> Result<bool> {
        let sample = match self.source.read_sample()? {
            Some(sample) => sample,
            None => return Ok(false),
        };

        // Fetched fresh every cycle so recalibration needs no restart
        let calibration = match self.store.fetch(&sample.node_id).await {
            Ok(calibration) => calibration,
            Err(e) if e.is_misconfiguration() => {
                error!(
                    "Calibration for node '{}' is misconfigured, dropping sample: {}",
                    sample.node_id, e
                );
                return Ok(true);
            }
            Err(e) => {
                error!(
                    "Calibration lookup for node '{}' failed, dropping sample: {}",
                    sample.node_id, e
                );
                return Ok(true);
            }
        };

        let concentrations = match enrich(&calibration, &sample) {
            Ok(concentrations) => concentrations,
            Err(e) if matches!(e, crate::calibration::CalibrationError::OutOfRangeTemperature { .. }) => {
                warn!(
                    "Ambient temperature {:.1} degC outside calibrated range, dropping sample",
                    sample.temperature
                );
                return Ok(true);
            }
            Err(e) => {
                error!(
                    "Correction failed for node '{}', dropping sample: {}",
                    sample.node_id, e
                );
                return Ok(true);
            }
        };

        let record = EnrichedRecord::new(sample, concentrations);
        for sink in &mut self.sinks {
            if let Err(e) = sink.write_record(&record).await {
                error!("Sink '{}' write failed: {}", sink.sink_type(), e);
            }
        }

        Ok(true)
    }

    /// Stop the sampling daemon
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        info!("Stopping sampling daemon");
    }

    /// Check if the daemon is running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Get the number of processed samples
    pub fn sample_count(&self) -> u64 {
        self.sample_counter.load(Ordering::Relaxed)
    }
}
