// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-airquality project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! InfluxDB sink
//!
//! Writes enriched records to an InfluxDB 1.x server using the line
//! protocol over HTTP. The write contract: measurement name from the
//! configuration, `node_id` as the only tag, and one field per raw reading
//! and per estimate (`{gas}_raw`, `{gas}_aux_raw`, `{gas}_estimate` plus
//! temperature, humidity and the particulate values).

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;

use super::RecordSink;
use crate::config::InfluxDbConfig;
use crate::measurement::EnrichedRecord;

/// Sink writing line-protocol points to InfluxDB 1.x
pub struct InfluxDbSink {
    client: Client,
    url: String,
    database: String,
    username: String,
    password: String,
    measurement: String,
}

impl InfluxDbSink {
    pub fn new(config: &InfluxDbConfig) -> Self {
        Self {
            client: Client::new(),
            url: config.url.clone(),
            database: config.database.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
            measurement: config.measurement.clone(),
        }
    }

    /// Render one record as an InfluxDB line-protocol point
    fn line_protocol(&self, record: &EnrichedRecord) -> Result<String> {
        let s = &record.sample;
        let timestamp_ns = s
            .timestamp
            .timestamp_nanos_opt()
            .ok_or_else(|| anyhow!("timestamp out of range for InfluxDB"))?;

        Ok(format!(
            "{},node_id={} temperature={},humidity={},pm2_5={},pm10={},\
             so2_raw={},so2_aux_raw={},so2_estimate={},\
             no2_raw={},no2_aux_raw={},no2_estimate={},\
             o3_raw={},o3_aux_raw={},o3_estimate={},\
             co_raw={},co_aux_raw={},co_estimate={},\
             no_raw={},no_aux_raw={},no_estimate={} {}",
            self.measurement,
            s.node_id,
            s.temperature,
            s.humidity,
            s.pm2_5,
            s.pm10,
            s.so2_we,
            s.so2_ae,
            record.so2_estimate,
            s.no2_we,
            s.no2_ae,
            record.no2_estimate,
            s.ox_we,
            s.ox_ae,
            record.o3_estimate,
            s.co_we,
            s.co_ae,
            record.co_estimate,
            s.no_we,
            s.no_ae,
            record.no_estimate,
            timestamp_ns,
        ))
    }
}

#[async_trait]
impl RecordSink for InfluxDbSink {
    async fn write_record(&mut self, record: &EnrichedRecord) -> Result<()> {
        let body = self.line_protocol(record)?;

        let mut query: Vec<(&str, &str)> = vec![("db", &self.database), ("precision", "ns")];
        if !self.username.is_empty() {
            query.push(("u", &self.username));
            query.push(("p", &self.password));
        }

        let response = self
            .client
            .post(format!("{}/write", self.url))
            .query(&query)
            .body(body)
            .send()
            .await
            .context("InfluxDB write request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow!("InfluxDB write rejected: {} {}", status, text));
        }

        debug!("Wrote record for node '{}' to InfluxDB", record.sample.node_id);
        Ok(())
    }

    fn sink_type(&self) -> &str {
        "influxdb"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measurement::{ConcentrationSet, RawSample};
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_line_protocol_layout() {
        let sink = InfluxDbSink::new(&InfluxDbConfig::default());
        let sample = RawSample {
            timestamp: Utc.with_ymd_and_hms(2023, 4, 1, 10, 0, 0).unwrap(),
            node_id: "1".to_string(),
            temperature: 19.0,
            humidity: 55.0,
            pm2_5: 8.2,
            pm10: 14.1,
            so2_we: 400.0,
            so2_ae: 295.0,
            no2_we: 300.0,
            no2_ae: 250.0,
            ox_we: 350.0,
            ox_ae: 240.0,
            co_we: 500.0,
            co_ae: 350.0,
            no_we: 400.0,
            no_ae: 300.0,
        };
        let record = EnrichedRecord::new(
            sample,
            ConcentrationSet {
                so2: 0.0,
                no2: 271.928,
                o3: 1.5,
                co: 277.477,
                no: 83.973,
            },
        );

        let line = sink.line_protocol(&record).unwrap();
        assert!(line.starts_with("air-quality-data,node_id=1 temperature=19,"));
        assert!(line.contains("no2_estimate=271.928"));
        assert!(line.contains("o3_raw=350"));
        assert!(line.ends_with(" 1680343200000000000"));
    }
}
