// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-airquality project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Record sinks
//!
//! Sinks persist or publish enriched records. The sampling daemon treats
//! them as opaque consumers: every enabled sink receives every record, and
//! a failing sink never blocks the others.

use anyhow::Result;
use async_trait::async_trait;

mod csv;
mod influxdb;
mod redis_publisher;

pub use csv::CsvSink;
pub use influxdb::InfluxDbSink;
pub use redis_publisher::RedisPublisherSink;

use crate::config::Config;
use crate::measurement::EnrichedRecord;

/// A destination for enriched records
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Prepare the sink (open connections, create files). Called once
    /// before the first record.
    async fn initialize(&mut self) -> Result<()> {
        Ok(())
    }

    /// Persist or publish one enriched record
    async fn write_record(&mut self, record: &EnrichedRecord) -> Result<()>;

    /// Sink type string for log messages (e.g., "influxdb", "csv")
    fn sink_type(&self) -> &str;
}

/// Build every sink enabled in the configuration
pub fn build_sinks(config: &Config) -> Result<Vec<Box<dyn RecordSink>>> {
    let mut sinks: Vec<Box<dyn RecordSink>> = Vec::new();

    if config.influxdb.enabled {
        sinks.push(Box::new(InfluxDbSink::new(&config.influxdb)));
    }
    if config.publish.enabled {
        sinks.push(Box::new(RedisPublisherSink::new(
            &config.publish.url,
            &config.publish.channel,
        )));
    }
    if config.csv_log.enabled {
        sinks.push(Box::new(CsvSink::new(&config.csv_log.path)));
    }

    Ok(sinks)
}
