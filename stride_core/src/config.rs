//! Runtime configuration for the metrics engine and its hosts.
//!
//! These are separate from the TOML-deserialized config in `stride_config`;
//! see `conversions` for the mapping.

use crate::aggregate::BUCKET_WIDTH_MS;
use crate::error::BuildError;
use crate::policy::DEFAULT_MAX_ACCURACY_M;

pub use stride_config::{MAX_PACE_WINDOW_S, MIN_PACE_WINDOW_S, PACE_WINDOW_STEP_S};

/// Engine configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineCfg {
    /// Weight position fixes by 1/accuracy² instead of 1/accuracy.
    pub squared_weighting: bool,
    /// Look-back window for `current_pace`, seconds.
    pub current_pace_window_s: u32,
    /// Aggregation bucket width, milliseconds.
    pub bucket_width_ms: i64,
    /// Accuracy acceptance threshold for both policies, meters.
    pub max_accuracy_m: f64,
    /// Horizon for "last sample" and connectivity queries, milliseconds.
    pub recency_window_ms: i64,
    /// Ceiling applied by `current_pace` and `overall_pace`, min/km.
    pub pace_cap_min_per_km: f64,
}

impl Default for EngineCfg {
    fn default() -> Self {
        Self {
            squared_weighting: false,
            current_pace_window_s: 60,
            bucket_width_ms: BUCKET_WIDTH_MS,
            max_accuracy_m: DEFAULT_MAX_ACCURACY_M,
            recency_window_ms: 10_000,
            pace_cap_min_per_km: 50.0,
        }
    }
}

impl EngineCfg {
    pub fn validate(&self) -> Result<(), BuildError> {
        validate_pace_window(self.current_pace_window_s)?;
        if self.bucket_width_ms <= 0 {
            return Err(BuildError::InvalidConfig("bucket_width_ms must be > 0"));
        }
        if !(self.max_accuracy_m.is_finite() && self.max_accuracy_m > 0.0) {
            return Err(BuildError::InvalidConfig("max_accuracy_m must be > 0"));
        }
        if self.recency_window_ms <= 0 {
            return Err(BuildError::InvalidConfig("recency_window_ms must be > 0"));
        }
        if !(self.pace_cap_min_per_km.is_finite() && self.pace_cap_min_per_km > 0.0) {
            return Err(BuildError::InvalidConfig("pace_cap_min_per_km must be > 0"));
        }
        Ok(())
    }
}

/// Current-pace windows are multiples of 5 s between 10 s and 10 min.
pub fn validate_pace_window(secs: u32) -> Result<(), BuildError> {
    if !(MIN_PACE_WINDOW_S..=MAX_PACE_WINDOW_S).contains(&secs) {
        return Err(BuildError::InvalidConfig(
            "current_pace_window_s must be within 10..=600",
        ));
    }
    if secs % PACE_WINDOW_STEP_S != 0 {
        return Err(BuildError::InvalidConfig(
            "current_pace_window_s must be a multiple of 5",
        ));
    }
    Ok(())
}

/// Spoken progress updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnounceCfg {
    pub enabled: bool,
    /// Seconds between announcements; a positive multiple of 60.
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

impl AnnounceCfg {
    pub fn validate(&self) -> Result<(), BuildError> {
        if self.interval_s == 0 || self.interval_s % 60 != 0 {
            return Err(BuildError::InvalidConfig(
                "announce interval must be a positive multiple of 60",
            ));
        }
        Ok(())
    }
}
