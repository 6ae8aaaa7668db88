//! CandleScreen Runner: configuration, screening runs, and result export.
//!
//! This crate builds on `candlescreen-core` to provide:
//! - TOML configuration with validation and date resolution
//! - The parallel per-instrument fan-out with progress reporting
//! - JSON and CSV artifacts for a completed run

pub mod config;
pub mod export;
pub mod runner;

pub use config::{ConfigError, Mode, ScreenerConfig, DEFAULT_REFRESH_SECS, DEFAULT_TIMEZONE};
pub use export::{export_json, export_records_csv, import_json, save_artifacts};
pub use runner::{run_screen, RunError, ScreenReport, SCHEMA_VERSION};
