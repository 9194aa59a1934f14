//! Parameter file loading tests
//!
//! Verifies TOML partial-override behavior: fields present in the file win,
//! everything else keeps its compiled default.

use beansort_common::params::MachineParams;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_params(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_empty_file_yields_defaults() {
    let file = write_params("");
    let params = MachineParams::load(file.path()).unwrap();
    assert_eq!(params, MachineParams::default());
}

#[test]
fn test_partial_timing_override() {
    let file = write_params(
        r#"
        [timing]
        scan_hold_ms = 50
        "#,
    );
    let params = MachineParams::load(file.path()).unwrap();
    assert_eq!(params.timing.scan_hold_ms, 50);
    // Untouched fields keep defaults
    assert_eq!(params.timing.drop_hold_ms, 800);
    assert_eq!(params.error_probability, 0.15);
}

#[test]
fn test_layout_override() {
    let file = write_params(
        r#"
        error_probability = 0.5

        [layout]
        start_x = 100.0
        px_per_sec = 500.0
        "#,
    );
    let params = MachineParams::load(file.path()).unwrap();
    assert_eq!(params.error_probability, 0.5);
    assert_eq!(params.layout.start_x, 100.0);
    assert_eq!(params.layout.px_per_sec, 500.0);
    assert_eq!(params.layout.lane_pitch, 116.0);
}

#[test]
fn test_invalid_toml_is_config_error() {
    let file = write_params("timing = \"not a table\"");
    let err = MachineParams::load(file.path()).unwrap_err();
    assert!(
        matches!(err, beansort_common::Error::Config(_)),
        "expected Config error, got {:?}",
        err
    );
}

#[test]
fn test_out_of_range_probability_rejected() {
    let file = write_params("error_probability = 2.0");
    assert!(MachineParams::load(file.path()).is_err());
}

#[test]
fn test_missing_file_is_io_error() {
    let err = MachineParams::load(std::path::Path::new("/nonexistent/beansort.toml")).unwrap_err();
    assert!(matches!(err, beansort_common::Error::Io(_)));
}
