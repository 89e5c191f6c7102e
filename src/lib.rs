// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-airquality project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! # Rust Air Quality
//!
//! Multi-gas outdoor air quality node using Alphasense electrochemical sensors.
//!
//! This crate samples an air quality node (particulate matter counter, five
//! electrochemical B4 gas sensors, temperature/humidity) on a fixed period,
//! converts the raw millivolt outputs of the gas sensors into
//! temperature-compensated concentration estimates, and hands the enriched
//! records to the configured sinks (InfluxDB, Redis pub/sub, local CSV log).
//!
//! ## Modules
//!
//! * [`calibration`] - Temperature-compensated correction engine, validated
//!   calibration records and the calibration store
//! * [`acquisition`] - Sample sources and the sampling daemon
//! * [`sink`] - Output sinks for enriched records
//! * [`config`] - YAML configuration handling
//! * [`daemon`] - Background task management
//! * [`measurement`] - Raw and enriched record types

pub mod acquisition;
pub mod calibration;
pub mod config;
pub mod daemon;
pub mod measurement;
pub mod sink;
