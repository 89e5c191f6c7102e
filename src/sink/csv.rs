// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-airquality project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! CSV log sink
//!
//! Appends enriched records to a local CSV file, writing a header row when
//! the file is created. The raw columns match the layout the
//! [`CsvFileSource`](crate::acquisition) replays, so a log produced here can
//! be reprocessed offline.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::info;

use super::RecordSink;
use crate::acquisition::RAW_SAMPLE_COLUMNS;
use crate::measurement::EnrichedRecord;

const ESTIMATE_COLUMNS: [&str; 5] = [
    "so2_estimate",
    "no2_estimate",
    "o3_estimate",
    "co_estimate",
    "no_estimate",
];

/// Sink appending enriched records to a CSV file
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn header() -> String {
        let mut columns: Vec<&str> = RAW_SAMPLE_COLUMNS.to_vec();
        columns.extend_from_slice(&ESTIMATE_COLUMNS);
        columns.join(",")
    }

    fn row(record: &EnrichedRecord) -> String {
        let s = &record.sample;
        format!(
            "{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
            s.timestamp.to_rfc3339(),
            s.node_id,
            s.temperature,
            s.humidity,
            s.pm2_5,
            s.pm10,
            s.so2_we,
            s.so2_ae,
            s.no2_we,
            s.no2_ae,
            s.ox_we,
            s.ox_ae,
            s.co_we,
            s.co_ae,
            s.no_we,
            s.no_ae,
            record.so2_estimate,
            record.no2_estimate,
            record.o3_estimate,
            record.co_estimate,
            record.no_estimate,
        )
    }
}

#[async_trait]
impl RecordSink for CsvSink {
    async fn initialize(&mut self) -> Result<()> {
        if !self.path.exists() {
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)
                .with_context(|| format!("Failed to create CSV log {}", self.path.display()))?;
            writeln!(file, "{}", Self::header())?;
            info!("Created CSV log {}", self.path.display());
        }
        Ok(())
    }

    async fn write_record(&mut self, record: &EnrichedRecord) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open CSV log {}", self.path.display()))?;

        writeln!(file, "{}", Self::row(record))?;
        Ok(())
    }

    fn sink_type(&self) -> &str {
        "csv"
    }
}
