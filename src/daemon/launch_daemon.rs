// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-airquality project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! # Daemon Management Module
//!
//! This module provides functionality for running and managing background
//! tasks in the air quality application. It handles the lifecycle of:
//!
//! - The sampling loop (acquisition, correction, sinks)
//! - System health monitoring (heartbeat)
//!
//! The daemon system allows for graceful startup and shutdown of these
//! services, with proper error handling and task coordination. Each service
//! runs as an independent Tokio task; a shared atomic flag coordinates
//! shutdown.

use anyhow::Result;
use log::{debug, info};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time;

use crate::acquisition::{get_sample_source, SamplingDaemon};
use crate::calibration::{CalibrationStore, FileCalibrationStore, RedisCalibrationStore};
use crate::config::{CalibrationStoreConfig, Config};
use crate::sink::build_sinks;

/// Represents a daemon task manager that coordinates the background services
///
/// This structure maintains a collection of asynchronous tasks and provides
/// methods to start, stop, and monitor them.
///
/// # Thread Safety
///
/// The `running` flag is wrapped in an `Arc` to allow safe sharing between
/// tasks. Each task checks this flag periodically to determine if it should
/// continue running or gracefully terminate.
pub struct Daemon {
    tasks: Vec<JoinHandle<Result<()>>>,
    running: Arc<AtomicBool>,
}

impl Default for Daemon {
    fn default() -> Self {
        Self::new()
    }
}

impl Daemon {
    /// Create a new daemon instance
    ///
    /// Initializes a new daemon manager with an empty task list and the
    /// running flag set to `true`.
    pub fn new() -> Self {
        Daemon {
            tasks: Vec::new(),
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Launch all configured tasks based on configuration
    ///
    /// Starts the sampling loop if `config.acquisition.enabled` is `true`,
    /// and always starts the heartbeat monitor.
    ///
    /// # Errors
    ///
    /// This function can fail if the sample source or a sink cannot be
    /// constructed (e.g., a replay file does not exist).
    pub fn launch(&mut self, config: &Config) -> Result<()> {
        if config.acquisition.enabled {
            self.start_sampling(config)?;
        }

        self.start_heartbeat()?;
        Ok(())
    }

    /// Start the sampling loop task
    ///
    /// Builds the configured sample source, calibration store and sinks,
    /// then spawns the [`SamplingDaemon`] wired to this daemon's running
    /// flag. The optional warmup delay and first-sample discard happen
    /// before the loop starts, per the particle counter vendor guidance.
    fn start_sampling(&mut self, config: &Config) -> Result<()> {
        info!(
            "Starting sampling task for node '{}'",
            config.acquisition.node_id
        );

        let mut source = get_sample_source(&config.acquisition)?;
        let store: Box<dyn CalibrationStore> = match &config.calibration.store {
            CalibrationStoreConfig::File { path } => Box::new(FileCalibrationStore::new(path)),
            CalibrationStoreConfig::Redis { url, key_prefix } => {
                Box::new(RedisCalibrationStore::new(url, key_prefix))
            }
        };
        let sinks = build_sinks(config)?;

        let warmup_secs = config.acquisition.warmup_secs;
        let discard_first = config.acquisition.discard_first;
        let interval_ms = config.acquisition.interval_ms;
        let running = self.running.clone();

        let task = tokio::spawn(async move {
            if warmup_secs > 0 {
                info!("Waiting {} s for sensors to stabilize", warmup_secs);
                time::sleep(Duration::from_secs(warmup_secs)).await;
            }
            if discard_first {
                debug!("Discarding first sample");
                let _ = source.read_sample()?;
            }

            let mut sampling = SamplingDaemon::new(source, store, sinks, interval_ms, running);
            sampling.start().await
        });

        self.tasks.push(task);
        Ok(())
    }

    /// Start a heartbeat task that logs system status periodically
    ///
    /// The heartbeat task runs every 60 seconds and continues until the
    /// daemon's `running` flag is set to `false`. In a production
    /// environment these messages can be monitored externally to detect a
    /// stalled daemon.
    fn start_heartbeat(&mut self) -> Result<()> {
        info!("Starting heartbeat monitor");

        let running = self.running.clone();
        let task = tokio::spawn(async move {
            while running.load(Ordering::SeqCst) {
                debug!("Daemon heartbeat: running");
                time::sleep(Duration::from_secs(60)).await;
            }
            Ok(())
        });

        self.tasks.push(task);
        Ok(())
    }

    /// Signal all tasks to terminate
    ///
    /// Each task should periodically check this flag and perform a clean
    /// shutdown when it is cleared. To wait for all tasks to finish, call
    /// `join()` after this method.
    pub fn shutdown(&self) {
        info!("Shutting down daemon tasks");
        self.running.store(false, Ordering::SeqCst);
        // Tasks should check the running flag and terminate gracefully
    }

    /// Wait for all tasks to complete
    ///
    /// Consumes the daemon and waits for all spawned tasks to finish
    /// execution. This method should be called after `shutdown()` to ensure
    /// a clean application exit. Task panics are logged but do not fail the
    /// join.
    pub async fn join(self) -> Result<()> {
        for task in self.tasks {
            match tokio::time::timeout(Duration::from_secs(5), task).await {
                Ok(result) => {
                    if let Err(e) = result {
                        log::error!("Task panicked: {}", e);
                    }
                }
                Err(_) => {
                    // Task didn't complete within timeout
                    log::warn!("Task did not complete within timeout period, may be hung");
                }
            }
        }
        Ok(())
    }
}
