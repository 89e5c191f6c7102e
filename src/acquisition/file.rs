// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-airquality project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! CSV replay sample source
//!
//! Replays raw samples recorded earlier (for example by the CSV sink) so a
//! dataset can be reprocessed offline with different calibration records.
//! The expected column layout is the one [`CsvSink`](crate::sink::CsvSink)
//! writes: a header line followed by one sample per row.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use log::info;

use super::SampleSource;
use crate::measurement::RawSample;

/// Column order of a raw sample row
pub const RAW_SAMPLE_COLUMNS: [&str; 16] = [
    "timestamp",
    "node_id",
    "temperature",
    "humidity",
    "pm2_5",
    "pm10",
    "so2_we",
    "so2_ae",
    "no2_we",
    "no2_ae",
    "ox_we",
    "ox_ae",
    "co_we",
    "co_ae",
    "no_we",
    "no_ae",
];

/// Sample source replaying a recorded CSV file
pub struct CsvFileSource {
    lines: Lines<BufReader<File>>,
    line_number: usize,
}

impl CsvFileSource {
    /// Open a recorded CSV file and skip its header line
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open sample file {}", path.display()))?;
        let mut lines = BufReader::new(file).lines();

        // Consume the header
        match lines.next() {
            Some(header) => {
                header.context("Failed to read sample file header")?;
            }
            None => return Err(anyhow!("Sample file {} is empty", path.display())),
        }

        info!("Replaying raw samples from {}", path.display());
        Ok(Self {
            lines,
            line_number: 1,
        })
    }

    fn parse_line(&self, line: &str) -> Result<RawSample> {
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() != RAW_SAMPLE_COLUMNS.len() {
            return Err(anyhow!(
                "line {}: expected {} columns, found {}",
                self.line_number,
                RAW_SAMPLE_COLUMNS.len(),
                fields.len()
            ));
        }

        let number = |idx: usize| -> Result<f64> {
            fields[idx]
                .trim()
                .parse::<f64>()
                .with_context(|| format!("line {}: bad {} value", self.line_number, RAW_SAMPLE_COLUMNS[idx]))
        };

        let timestamp = DateTime::parse_from_rfc3339(fields[0].trim())
            .with_context(|| format!("line {}: bad timestamp", self.line_number))?
            .with_timezone(&Utc);

        Ok(RawSample {
            timestamp,
            node_id: fields[1].trim().to_string(),
            temperature: number(2)?,
            humidity: number(3)?,
            pm2_5: number(4)?,
            pm10: number(5)?,
            so2_we: number(6)?,
            so2_ae: number(7)?,
            no2_we: number(8)?,
            no2_ae: number(9)?,
            ox_we: number(10)?,
            ox_ae: number(11)?,
            co_we: number(12)?,
            co_ae: number(13)?,
            no_we: number(14)?,
            no_ae: number(15)?,
        })
    }
}

impl SampleSource for CsvFileSource {
    fn read_sample(&mut self) -> Result<Option<RawSample>> {
        loop {
            let line = match self.lines.next() {
                Some(line) => line.context("Failed to read sample file line")?,
                None => return Ok(None),
            };
            self.line_number += 1;

            if line.trim().is_empty() {
                continue;
            }
            return self.parse_line(&line).map(Some);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_replay_round_trip() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{}", RAW_SAMPLE_COLUMNS.join(",")).unwrap();
        writeln!(
            file,
            "2023-04-01T10:00:00+00:00,1,19.0,55.0,8.2,14.1,\
             400,295,300,250,350,240,500,350,400,300"
        )
        .unwrap();

        let mut source = CsvFileSource::new(file.path()).unwrap();
        let sample = source.read_sample().unwrap().unwrap();
        assert_eq!(sample.node_id, "1");
        assert_eq!(sample.temperature, 19.0);
        assert_eq!(sample.no_ae, 300.0);
        assert!(source.read_sample().unwrap().is_none());
    }
}
