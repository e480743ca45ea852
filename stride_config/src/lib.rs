#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas, recorded sample logs and run history for stride.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - `samples` loads recorded location logs (strict-header CSV or JSON lines).
//! - `history` reads and appends the persisted run-history document.
use serde::Deserialize;

pub mod atomic;
pub mod history;
pub mod samples;

pub use history::{HistoryLoad, RunHistory, RunRecord};
pub use samples::{SampleRow, load_samples_csv, load_samples_jsonl};

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct EngineCfg {
    /// Weight position fixes by 1/accuracy² instead of 1/accuracy
    pub squared_weighting: bool,
    /// Look-back window for the current pace, in seconds
    pub current_pace_window_s: u32,
    /// Width of one aggregation bucket in milliseconds
    pub bucket_width_ms: i64,
    /// Fixes with a reported accuracy above this many meters are ignored
    pub max_accuracy_m: f64,
}

impl Default for EngineCfg {
    fn default() -> Self {
        Self {
            squared_weighting: false,
            current_pace_window_s: 60,
            bucket_width_ms: 2500,
            max_accuracy_m: 5.0,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ConnectivityCfg {
    /// A position fix older than this no longer counts as "connected"
    pub recency_window_ms: i64,
}

impl Default for ConnectivityCfg {
    fn default() -> Self {
        Self {
            recency_window_ms: 10_000,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PaceCfg {
    /// Displayed paces are clamped to this ceiling (min/km)
    pub cap_min_per_km: f64,
}

impl Default for PaceCfg {
    fn default() -> Self {
        Self {
            cap_min_per_km: 50.0,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AnnounceCfg {
    pub enabled: bool,
    /// Seconds between spoken updates; a multiple of 60
    pub interval_s: u64,
}

impl Default for AnnounceCfg {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_s: 60,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct UiCfg {
    /// Dashboard refresh cadence in milliseconds
    pub refresh_ms: u64,
}

impl Default for UiCfg {
    fn default() -> Self {
        Self { refresh_ms: 1000 }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct HistoryCfg {
    /// Path of the JSON run-history document
    pub file: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub engine: EngineCfg,
    pub connectivity: ConnectivityCfg,
    pub pace: PaceCfg,
    pub announce: AnnounceCfg,
    pub ui: UiCfg,
    pub history: HistoryCfg,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Smallest accepted current-pace window, in seconds.
pub const MIN_PACE_WINDOW_S: u32 = 10;
/// Largest accepted current-pace window, in seconds.
pub const MAX_PACE_WINDOW_S: u32 = 600;
/// Current-pace windows move in steps of this many seconds.
pub const PACE_WINDOW_STEP_S: u32 = 5;

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Engine
        let window = self.engine.current_pace_window_s;
        if window < MIN_PACE_WINDOW_S {
            eyre::bail!("engine.current_pace_window_s must be >= {MIN_PACE_WINDOW_S}");
        }
        if window % PACE_WINDOW_STEP_S != 0 {
            eyre::bail!("engine.current_pace_window_s must be a multiple of {PACE_WINDOW_STEP_S}");
        }
        if window > MAX_PACE_WINDOW_S {
            eyre::bail!("engine.current_pace_window_s must be <= {MAX_PACE_WINDOW_S}");
        }
        if self.engine.bucket_width_ms <= 0 {
            eyre::bail!("engine.bucket_width_ms must be > 0");
        }
        if !(self.engine.max_accuracy_m.is_finite() && self.engine.max_accuracy_m > 0.0) {
            eyre::bail!("engine.max_accuracy_m must be > 0");
        }

        // Connectivity
        if self.connectivity.recency_window_ms <= 0 {
            eyre::bail!("connectivity.recency_window_ms must be > 0");
        }

        // Pace
        if !(self.pace.cap_min_per_km.is_finite() && self.pace.cap_min_per_km > 0.0) {
            eyre::bail!("pace.cap_min_per_km must be > 0");
        }

        // Announcements
        if self.announce.interval_s == 0 || self.announce.interval_s % 60 != 0 {
            eyre::bail!("announce.interval_s must be a positive multiple of 60");
        }

        // UI
        if self.ui.refresh_ms == 0 {
            eyre::bail!("ui.refresh_ms must be >= 1");
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly");
        }

        Ok(())
    }
}
