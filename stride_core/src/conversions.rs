//! `From` implementations bridging `stride_config` types to `stride_core` types.

use crate::config::{AnnounceCfg, EngineCfg};
use crate::error::SampleError;
use crate::sample::Sample;
use crate::session::RunSummary;

// ── EngineCfg ────────────────────────────────────────────────────────────────

/// The engine knobs are spread over several TOML sections.
impl From<&stride_config::Config> for EngineCfg {
    fn from(c: &stride_config::Config) -> Self {
        Self {
            squared_weighting: c.engine.squared_weighting,
            current_pace_window_s: c.engine.current_pace_window_s,
            bucket_width_ms: c.engine.bucket_width_ms,
            max_accuracy_m: c.engine.max_accuracy_m,
            recency_window_ms: c.connectivity.recency_window_ms,
            pace_cap_min_per_km: c.pace.cap_min_per_km,
        }
    }
}

// ── AnnounceCfg ──────────────────────────────────────────────────────────────

impl From<&stride_config::AnnounceCfg> for AnnounceCfg {
    fn from(c: &stride_config::AnnounceCfg) -> Self {
        Self {
            enabled: c.enabled,
            interval_s: c.interval_s,
        }
    }
}

// ── RunSummary → history record ──────────────────────────────────────────────

impl From<RunSummary> for stride_config::RunRecord {
    fn from(s: RunSummary) -> Self {
        Self {
            when: s.when,
            time: s.time,
            distance: s.distance_km,
            pace: s.pace_min_per_km,
            altimetry: s.altimetry_m,
        }
    }
}

// ── Recorded rows ────────────────────────────────────────────────────────────

impl TryFrom<&stride_config::SampleRow> for Sample {
    type Error = SampleError;

    fn try_from(r: &stride_config::SampleRow) -> Result<Self, Self::Error> {
        Sample::builder(r.source.as_str(), r.timestamp_ms)
            .position(r.latitude, r.longitude)
            .altitude(r.altitude)
            .speed(r.speed)
            .horizontal_accuracy(r.horizontal_accuracy)
            .vertical_accuracy(r.vertical_accuracy)
            .speed_accuracy(r.speed_accuracy)
            .build()
    }
}
