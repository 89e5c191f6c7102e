// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-airquality project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Tests for the file-backed calibration store: lookup, validation at the
//! store boundary and live reload of a rewritten file.

use std::io::Write;

use anyhow::Result;
use tempfile::NamedTempFile;

use rust_airquality::calibration::{CalibrationError, CalibrationStore, FileCalibrationStore};

const VALID_NODE: &str = r#"
"1":
  so2:
    we_offset: 341
    we_zero: 378
    temp_factor: [-4, -4, -4, -4, -4, 0, 20, 140, 450]
    sensitivity: 0.330
  no2:
    we_offset: 224
    ae_offset: 226
    temp_factor: [1.3, 1.3, 1.3, 1.3, 1.0, 0.6, 0.4, 0.2, -1.5]
    sensitivity: 0.223
  ox:
    we_offset: 227
    ae_offset: 219
    temp_factor: [0.9, 0.9, 1.0, 1.3, 1.5, 1.7, 2.0, 2.5, 3.7]
    sensitivity: 0.334
  co:
    we_offset: 360
    ae_offset: 344
    temp_factor: [0.7, 0.7, 0.7, 0.7, 1.0, 3.0, 3.5, 4.0, 4.5]
    sensitivity: 0.444
  no:
    we_offset: 291
    ae_offset: 248
    we_zero: 344
    ae_zero: 310
    temp_factor: [1.8, 1.8, 1.4, 1.1, 1.1, 1.0, 0.9, 0.9, 0.8]
    sensitivity: 0.604
"#;

fn calibration_file(content: &str) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    file.write_all(content.as_bytes())?;
    file.flush()?;
    Ok(file)
}

#[tokio::test]
async fn test_fetch_valid_record() -> Result<()> {
    let file = calibration_file(VALID_NODE)?;
    let mut store = FileCalibrationStore::new(file.path());

    let calibration = store.fetch("1").await?;
    assert_eq!(calibration.so2.we_offset, 341.0);
    assert_eq!(calibration.so2.we_zero, Some(378.0));
    assert_eq!(calibration.so2.sensitivity, 0.330);
    assert_eq!(calibration.no2.ae_offset, Some(226.0));
    assert_eq!(calibration.no.ae_zero, Some(310.0));
    assert_eq!(calibration.co.temp_factor.len(), 9);
    assert_eq!(store.store_type(), "file");
    Ok(())
}

#[tokio::test]
async fn test_unknown_node() -> Result<()> {
    let file = calibration_file(VALID_NODE)?;
    let mut store = FileCalibrationStore::new(file.path());

    let result = store.fetch("42").await;
    match result {
        Err(CalibrationError::UnknownNode { node_id }) => assert_eq!(node_id, "42"),
        other => panic!("expected unknown node error, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn test_missing_sensitivity_is_rejected() -> Result<()> {
    let content = VALID_NODE.replace("    sensitivity: 0.223\n", "");
    let file = calibration_file(&content)?;
    let mut store = FileCalibrationStore::new(file.path());

    let result = store.fetch("1").await;
    match result {
        Err(CalibrationError::MissingCalibrationField { field }) => {
            assert_eq!(field, "no2_sensitivity");
        }
        other => panic!("expected missing field error, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn test_zero_sensitivity_is_rejected() -> Result<()> {
    let content = VALID_NODE.replace("sensitivity: 0.444", "sensitivity: 0.0");
    let file = calibration_file(&content)?;
    let mut store = FileCalibrationStore::new(file.path());

    let result = store.fetch("1").await;
    assert!(matches!(
        result,
        Err(CalibrationError::InvalidCalibration { .. })
    ));
    Ok(())
}

#[tokio::test]
async fn test_missing_gas_section_is_rejected() -> Result<()> {
    let content = VALID_NODE.replace(
        "  ox:
    we_offset: 227
    ae_offset: 219
    temp_factor: [0.9, 0.9, 1.0, 1.3, 1.5, 1.7, 2.0, 2.5, 3.7]
    sensitivity: 0.334
",
        "",
    );
    let file = calibration_file(&content)?;
    let mut store = FileCalibrationStore::new(file.path());

    let result = store.fetch("1").await;
    match result {
        Err(CalibrationError::MissingCalibrationField { field }) => assert_eq!(field, "ox"),
        other => panic!("expected missing field error, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn test_file_is_reread_on_every_fetch() -> Result<()> {
    let file = calibration_file(VALID_NODE)?;
    let mut store = FileCalibrationStore::new(file.path());

    let before = store.fetch("1").await?;
    assert_eq!(before.so2.sensitivity, 0.330);

    // Rewrite the file in place; the running store must pick up the change
    let updated = VALID_NODE.replace("sensitivity: 0.330", "sensitivity: 0.500");
    std::fs::write(file.path(), updated)?;

    let after = store.fetch("1").await?;
    assert_eq!(after.so2.sensitivity, 0.500);
    Ok(())
}

#[tokio::test]
async fn test_missing_file_is_a_store_error() {
    let mut store = FileCalibrationStore::new("/nonexistent/calibration.yaml");
    let result = store.fetch("1").await;
    assert!(matches!(result, Err(CalibrationError::Store { .. })));
}

#[tokio::test]
async fn test_unparseable_file_is_a_store_error() -> Result<()> {
    let file = calibration_file("{ not yaml: [")?;
    let mut store = FileCalibrationStore::new(file.path());

    let result = store.fetch("1").await;
    assert!(matches!(result, Err(CalibrationError::Store { .. })));
    Ok(())
}
