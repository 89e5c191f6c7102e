// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-airquality project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Redis publishing sink
//!
//! Publishes each enriched record as JSON to a Redis channel (pub/sub),
//! useful for live dashboards and data-sharing between services. The
//! connection is opened lazily and re-established after a failed publish.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::{error, info};
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client};

use super::RecordSink;
use crate::measurement::EnrichedRecord;

/// Sink publishing enriched records to a Redis channel
pub struct RedisPublisherSink {
    /// Redis connection URL
    url: String,
    /// Channel records are published to
    channel: String,
    /// Redis client
    client: Option<Client>,
    /// Redis connection
    connection: Option<MultiplexedConnection>,
}

impl RedisPublisherSink {
    /// Create a new publishing sink
    ///
    /// # Arguments
    /// * `url` - Redis connection URL (e.g., "redis://127.0.0.1:6379")
    /// * `channel` - Redis channel to publish to
    pub fn new(url: impl Into<String>, channel: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            channel: channel.into(),
            client: None,
            connection: None,
        }
    }

    // Helper method to get a valid Redis connection
    async fn get_connection(&mut self) -> Result<&mut MultiplexedConnection> {
        if self.connection.is_none() {
            if self.client.is_none() {
                self.client = Some(Client::open(self.url.clone())?);
            }

            let client = self.client.as_ref().unwrap();
            match client.get_multiplexed_async_connection().await {
                Ok(conn) => self.connection = Some(conn),
                Err(e) => {
                    error!("Redis connection error: {}", e);
                    return Err(anyhow!("Redis connection error: {}", e));
                }
            }
        }

        // Safe to unwrap now because we just created it if it didn't exist
        Ok(self.connection.as_mut().unwrap())
    }
}

#[async_trait]
impl RecordSink for RedisPublisherSink {
    async fn initialize(&mut self) -> Result<()> {
        let conn = self.get_connection().await?;

        // Simple command to verify the connection works
        let echo_result: Result<String, redis::RedisError> = redis::cmd("ECHO")
            .arg("connection_test")
            .query_async(conn)
            .await;

        match echo_result {
            Ok(_) => {
                info!("RedisPublisherSink: Successfully connected to Redis");
                Ok(())
            }
            Err(e) => Err(anyhow!("Redis connection test failed: {}", e)),
        }
    }

    async fn write_record(&mut self, record: &EnrichedRecord) -> Result<()> {
        let json = serde_json::to_string(record)?;
        let channel = self.channel.clone();

        let conn = self.get_connection().await?;
        let publish_result: Result<(), redis::RedisError> = conn.publish(&channel, &json).await;

        if let Err(e) = publish_result {
            // Drop the connection so the next write reconnects
            self.connection = None;
            return Err(anyhow!("Redis publish failed: {}", e));
        }

        Ok(())
    }

    fn sink_type(&self) -> &str {
        "redis"
    }
}
