//! Artifact tests: a synthetic run written to disk and read back.

use candlescreen_core::data::{SyntheticProvider, Universe};
use candlescreen_runner::export::{export_json, import_json, save_artifacts};
use candlescreen_runner::{run_screen, ScreenReport, ScreenerConfig, SCHEMA_VERSION};
use chrono::NaiveDate;

fn sample_report() -> ScreenReport {
    let config = ScreenerConfig {
        universe: Universe::from_symbols(".NS", ["ABB", "ACC", "TCS"]),
        ..ScreenerConfig::default()
    }
    .with_date("2024-06-03");
    let provider = SyntheticProvider::new(chrono_tz::Asia::Kolkata, 42);
    let today = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
    run_screen(&config, &provider, today, |_, _| {}).unwrap()
}

#[test]
fn artifacts_land_in_a_dated_directory() {
    let report = sample_report();
    let dir = tempfile::tempdir().unwrap();

    let run_dir = save_artifacts(&report, dir.path()).unwrap();
    let name = run_dir.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("2024-06-03_"));

    let json = std::fs::read_to_string(run_dir.join("report.json")).unwrap();
    let loaded = import_json(&json).unwrap();
    assert_eq!(loaded.records.len(), report.records.len());
    for (a, b) in loaded.records.iter().zip(&report.records) {
        assert_eq!((&a.symbol, a.signal, a.rank, a.volume_status), (&b.symbol, b.signal, b.rank, b.volume_status));
    }
    assert_eq!(loaded.dataset_hash, report.dataset_hash);

    let csv = std::fs::read_to_string(run_dir.join("results.csv")).unwrap();
    assert_eq!(csv.lines().count(), report.records.len() + 1);
    for r in &report.records {
        assert!(csv.contains(&r.symbol));
    }
}

#[test]
fn future_schema_version_is_rejected() {
    let mut report = sample_report();
    report.schema_version = SCHEMA_VERSION + 1;
    let json = export_json(&report).unwrap();
    let err = import_json(&json).unwrap_err();
    assert!(err.to_string().contains("unsupported schema version"));
}

#[test]
fn missing_schema_version_defaults_to_current() {
    let report = sample_report();
    let mut value: serde_json::Value = serde_json::from_str(&export_json(&report).unwrap()).unwrap();
    value.as_object_mut().unwrap().remove("schema_version");
    let loaded = import_json(&value.to_string()).unwrap();
    assert_eq!(loaded.schema_version, SCHEMA_VERSION);
}
