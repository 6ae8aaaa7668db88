//! Reporting and export: JSON and CSV artifacts for a screening run.
//!
//! - **JSON**: the full `ScreenReport` with schema versioning
//! - **CSV**: one row per record in presentation order, prices to two decimals
//!
//! Persisted reports carry a `schema_version` field. Unknown versions are
//! rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use candlescreen_core::domain::ResultRecord;

use crate::runner::{ScreenReport, SCHEMA_VERSION};

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `ScreenReport` to pretty JSON.
pub fn export_json(report: &ScreenReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize ScreenReport to JSON")
}

/// Deserialize a `ScreenReport` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<ScreenReport> {
    let report: ScreenReport =
        serde_json::from_str(json).context("failed to deserialize ScreenReport from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Two-decimal price cell; blank when absent.
pub fn price_cell(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.2}")).unwrap_or_default()
}

/// Export records as CSV.
///
/// Columns: symbol, first_open, first_close, second_open, second_close,
/// signal, rank, volume_status, pct_change
pub fn export_records_csv(records: &[ResultRecord]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "symbol",
        "first_open",
        "first_close",
        "second_open",
        "second_close",
        "signal",
        "rank",
        "volume_status",
        "pct_change",
    ])?;

    for r in records {
        wtr.write_record([
            r.symbol.clone(),
            price_cell(r.first_open),
            price_cell(r.first_close),
            price_cell(r.second_open),
            price_cell(r.second_close),
            r.signal.label().to_string(),
            r.rank.map_or_else(String::new, |m| m.label().to_string()),
            r.volume_status.label().to_string(),
            price_cell(r.pct_change),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the artifact set for one run.
///
/// Creates `{target_date}_{timestamp}/` under `output_dir` containing
/// `report.json` and `results.csv`, and returns its path.
pub fn save_artifacts(report: &ScreenReport, output_dir: &Path) -> Result<PathBuf> {
    let dirname = format!(
        "{}_{}",
        report.target_date,
        report.generated_at.format("%Y%m%d_%H%M%S")
    );
    let run_dir = output_dir.join(dirname);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    write_json(report, &run_dir.join("report.json"))?;
    write_csv(report, &run_dir.join("results.csv"))?;

    Ok(run_dir)
}

pub fn write_json(report: &ScreenReport, path: &Path) -> Result<()> {
    let json = export_json(report)?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}

pub fn write_csv(report: &ScreenReport, path: &Path) -> Result<()> {
    let csv = export_records_csv(&report.records)?;
    std::fs::write(path, csv).with_context(|| format!("failed to write {}", path.display()))
}
