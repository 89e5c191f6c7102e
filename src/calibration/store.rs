// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-airquality project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Calibration store
//!
//! Key-value lookup of per-node calibration records, keyed by node
//! identifier. Two backends are provided: a YAML file (one document mapping
//! node ids to raw records) and Redis (one JSON value per node under a
//! configurable key prefix).
//!
//! Both backends re-read the backing store on every fetch and validate the
//! raw record before returning it, so coefficients can be changed while the
//! daemon runs and a malformed entry is rejected at the boundary instead of
//! corrupting a computation.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::{debug, error};
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client};

use super::record::{NodeCalibration, RawNodeCalibration};
use super::CalibrationError;

/// Lookup of validated calibration records by node identifier
#[async_trait]
pub trait CalibrationStore: Send + Sync {
    /// Fetch and validate the calibration record for `node_id`.
    ///
    /// # Errors
    ///
    /// * [`CalibrationError::UnknownNode`] if the store holds no record
    ///   for the node
    /// * [`CalibrationError::MissingCalibrationField`] /
    ///   [`CalibrationError::InvalidCalibration`] if the stored record is
    ///   malformed
    /// * [`CalibrationError::Store`] on transport or parse failures
    async fn fetch(&mut self, node_id: &str) -> Result<NodeCalibration, CalibrationError>;

    /// Store backend name for log messages
    fn store_type(&self) -> &str;
}

/// Calibration store backed by a single YAML file.
///
/// The file maps node ids to raw calibration records:
///
/// ```yaml
/// "1":
///   so2:
///     we_offset: 341
///     we_zero: 378
///     temp_factor: [-4, -4, -4, -4, -4, 0, 20, 140, 450]
///     sensitivity: 0.330
///   no2:
///     ...
/// ```
///
/// The file is re-read on every fetch; editing it recalibrates a running
/// daemon from the next sampling cycle on.
pub struct FileCalibrationStore {
    path: PathBuf,
}

impl FileCalibrationStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl CalibrationStore for FileCalibrationStore {
    async fn fetch(&mut self, node_id: &str) -> Result<NodeCalibration, CalibrationError> {
        let content =
            tokio::fs::read_to_string(&self.path)
                .await
                .map_err(|e| CalibrationError::Store {
                    reason: format!("cannot read {}: {}", self.path.display(), e),
                })?;

        let records: HashMap<String, RawNodeCalibration> = serde_yml::from_str(&content)
            .map_err(|e| CalibrationError::Store {
                reason: format!("cannot parse {}: {}", self.path.display(), e),
            })?;

        let raw = records
            .get(node_id)
            .ok_or_else(|| CalibrationError::UnknownNode {
                node_id: node_id.to_string(),
            })?;

        debug!("Fetched calibration record for node '{}' from file", node_id);
        raw.validate()
    }

    fn store_type(&self) -> &str {
        "file"
    }
}

/// Calibration store backed by Redis.
///
/// Each node's record is a JSON document stored under
/// `{key_prefix}:{node_id}`. The connection is opened lazily on first use
/// and reused afterwards.
pub struct RedisCalibrationStore {
    url: String,
    key_prefix: String,
    client: Option<Client>,
    connection: Option<MultiplexedConnection>,
}

impl RedisCalibrationStore {
    /// Create a new Redis store.
    ///
    /// # Arguments
    /// * `url` - Redis connection URL (e.g., "redis://127.0.0.1:6379")
    /// * `key_prefix` - Prefix for calibration keys
    pub fn new(url: impl Into<String>, key_prefix: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            key_prefix: key_prefix.into(),
            client: None,
            connection: None,
        }
    }

    // Helper method to get a valid Redis connection
    async fn get_connection(&mut self) -> Result<&mut MultiplexedConnection, CalibrationError> {
        if self.connection.is_none() {
            if self.client.is_none() {
                self.client =
                    Some(
                        Client::open(self.url.clone()).map_err(|e| CalibrationError::Store {
                            reason: format!("Redis client error: {}", e),
                        })?,
                    );
            }

            let client = self.client.as_ref().unwrap();
            match client.get_multiplexed_async_connection().await {
                Ok(conn) => self.connection = Some(conn),
                Err(e) => {
                    error!("Redis connection error: {}", e);
                    return Err(CalibrationError::Store {
                        reason: format!("Redis connection error: {}", e),
                    });
                }
            }
        }

        // Safe to unwrap now because we just created it if it didn't exist
        Ok(self.connection.as_mut().unwrap())
    }
}

#[async_trait]
impl CalibrationStore for RedisCalibrationStore {
    async fn fetch(&mut self, node_id: &str) -> Result<NodeCalibration, CalibrationError> {
        let key = format!("{}:{}", self.key_prefix, node_id);
        let conn = self.get_connection().await?;

        let result: Result<Option<String>, redis::RedisError> = conn.get(&key).await;
        let value = match result {
            Ok(value) => value,
            Err(e) => {
                // Drop the connection so the next fetch reconnects
                self.connection = None;
                return Err(CalibrationError::Store {
                    reason: format!("Redis GET {} failed: {}", key, e),
                });
            }
        };

        let json = value.ok_or_else(|| CalibrationError::UnknownNode {
            node_id: node_id.to_string(),
        })?;

        let raw: RawNodeCalibration =
            serde_json::from_str(&json).map_err(|e| CalibrationError::Store {
                reason: format!("cannot parse calibration JSON under {}: {}", key, e),
            })?;

        debug!("Fetched calibration record for node '{}' from Redis", node_id);
        raw.validate()
    }

    fn store_type(&self) -> &str {
        "redis"
    }
}
