//! Serializable screener configuration.
//!
//! One TOML file holds the run mode, the target date for historical runs,
//! the exchange zone, the refresh cadence, the universe, and the pipeline
//! parameters. Every field has a default so a partial file is enough.

use std::path::{Path, PathBuf};

use candlescreen_core::data::Universe;
use candlescreen_core::screen::PipelineParams;
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Exchange zone for NSE listings.
pub const DEFAULT_TIMEZONE: &str = "Asia/Kolkata";

/// Seconds between runs in watch mode.
pub const DEFAULT_REFRESH_SECS: u64 = 60;

/// Configuration errors. All are fatal and raised before any fetch.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to serialize config TOML: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("historical mode needs a date")]
    MissingDate,

    #[error("unknown timezone '{0}'")]
    InvalidTimezone(String),

    #[error("universe is empty")]
    EmptyUniverse,

    #[error("invalid parameters: {0}")]
    InvalidParams(String),
}

/// Which session a run screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Today's session in the exchange zone.
    #[default]
    Live,
    /// A fixed past session given by `date`.
    Historical,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Live => write!(f, "live"),
            Mode::Historical => write!(f, "historical"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenerConfig {
    pub mode: Mode,
    /// `YYYY-MM-DD`; only read in historical mode.
    pub date: Option<String>,
    pub timezone: String,
    pub refresh_interval_secs: u64,
    /// Worker threads for the per-instrument fan-out (0 = one per core).
    pub max_parallel: usize,
    pub universe: Universe,
    pub params: PipelineParams,
}

impl Default for ScreenerConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Live,
            date: None,
            timezone: DEFAULT_TIMEZONE.to_string(),
            refresh_interval_secs: DEFAULT_REFRESH_SECS,
            max_parallel: 0,
            universe: Universe::default_nse(),
            params: PipelineParams::default(),
        }
    }
}

impl ScreenerConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Switch to historical mode for `date`.
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.mode = Mode::Historical;
        self.date = Some(date.into());
        self
    }

    pub fn tz(&self) -> Result<Tz, ConfigError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| ConfigError::InvalidTimezone(self.timezone.clone()))
    }

    /// Current calendar date in the exchange zone.
    pub fn today(&self) -> Result<NaiveDate, ConfigError> {
        Ok(Utc::now().with_timezone(&self.tz()?).date_naive())
    }

    /// The session this run screens: `today` in live mode, the parsed
    /// `date` in historical mode.
    pub fn target_date(&self, today: NaiveDate) -> Result<NaiveDate, ConfigError> {
        match self.mode {
            Mode::Live => Ok(today),
            Mode::Historical => {
                let raw = self.date.as_deref().ok_or(ConfigError::MissingDate)?;
                NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                    .map_err(|_| ConfigError::InvalidDate(raw.to_string()))
            }
        }
    }

    /// Reject configurations no run could use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.tz()?;
        if self.universe.is_empty() {
            return Err(ConfigError::EmptyUniverse);
        }

        let p = &self.params;
        let invalid = |msg: &str| Err(ConfigError::InvalidParams(msg.to_string()));
        if p.ma_window == 0 {
            return invalid("ma_window must be at least 1");
        }
        if p.candles_before + p.candles_start == 0 {
            return invalid("baseline window is empty");
        }
        if p.candles_start < 2 {
            return invalid("candles_start must cover the opening pair");
        }
        if p.source_interval_minutes == 0 || p.target_interval_minutes == 0 {
            return invalid("interval widths must be positive");
        }
        if p.target_interval_minutes % p.source_interval_minutes != 0 {
            return invalid("target interval must be a multiple of the source interval");
        }
        if p.lookback_days < 1 {
            return invalid("lookback_days must be at least 1");
        }
        if !(0.0..=1.0).contains(&p.body_ratio) || !(0.0..=1.0).contains(&p.close_band) {
            return invalid("body_ratio and close_band must lie in [0, 1]");
        }
        if self.refresh_interval_secs == 0 {
            return invalid("refresh_interval_secs must be positive");
        }
        Ok(())
    }
}
