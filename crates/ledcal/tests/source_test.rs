//! Tests of the data directory layout read by `DataDirSource`.

use std::fs;
use std::sync::Arc;

use ledcal::source::ARTIFACT_FILE;
use ledcal::{spawn_fetch, ArtifactSource, CalibrationResult, DataDirSource, LedcalError};
use tempfile::TempDir;

fn source_with(id: &str, text: &str) -> (TempDir, DataDirSource) {
    let dir = TempDir::new().unwrap();
    let source = DataDirSource::new(dir.path());
    let run_dir = source.calibration_dir(id);
    fs::create_dir_all(&run_dir).unwrap();
    fs::write(run_dir.join(ARTIFACT_FILE), text).unwrap();
    (dir, source)
}

#[test]
fn test_fetch_reads_artifact() {
    let (_dir, source) = source_with("3", "\"skipped\"");
    assert_eq!(source.fetch("3").unwrap(), CalibrationResult::Skipped);
}

#[test]
fn test_fetch_missing_run() {
    let (_dir, source) = source_with("3", "\"failure\"");
    let err = source.fetch("4").unwrap_err();
    assert!(matches!(err, LedcalError::ArtifactNotFound(_)));
}

#[test]
fn test_fetch_malformed_json() {
    let (_dir, source) = source_with("3", "{ \"leds\": [");
    let err = source.fetch("3").unwrap_err();
    assert!(matches!(err, LedcalError::JsonError(_)));
}

#[test]
fn test_photo_path_uses_name_verbatim() {
    let dir = TempDir::new().unwrap();
    let source = DataDirSource::new(dir.path());
    let path = source.photo_path("3", "led 0001.JPG");
    assert_eq!(path, dir.path().join("calibrations").join("3").join("led 0001.JPG"));
}

#[test]
fn test_spawn_fetch_reports_errors() {
    let dir = TempDir::new().unwrap();
    let source = Arc::new(DataDirSource::new(dir.path()));
    let pending = spawn_fetch(source, "missing".to_string(), 9);

    let outcome = pending.wait();
    assert_eq!(outcome.generation, 9);
    assert!(matches!(outcome.result, Err(LedcalError::ArtifactNotFound(_))));
}
