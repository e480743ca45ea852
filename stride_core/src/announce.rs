//! Periodic spoken progress updates.
use std::fmt;

use crate::config::AnnounceCfg;
use crate::session::RunStats;
use crate::util::split_pace;

/// Decides when a progress update is due during a run.
#[derive(Debug, Clone)]
pub struct Announcer {
    cfg: AnnounceCfg,
    last_spoken_s: Option<i64>,
}

impl Announcer {
    pub fn new(cfg: AnnounceCfg) -> Self {
        Self {
            cfg,
            last_spoken_s: None,
        }
    }

    pub fn enabled(&self) -> bool {
        self.cfg.enabled
    }

    pub fn interval_s(&self) -> u64 {
        self.cfg.interval_s
    }

    /// Due on every positive multiple of the interval.
    pub fn is_due(&self, elapsed_s: i64) -> bool {
        let interval = i64::try_from(self.cfg.interval_s).unwrap_or(i64::MAX);
        self.cfg.enabled && interval > 0 && elapsed_s > 0 && elapsed_s % interval == 0
    }

    /// At most one announcement per elapsed second, even when polled faster.
    pub fn poll(&mut self, stats: &RunStats) -> Option<Announcement> {
        if !self.is_due(stats.elapsed_s) || self.last_spoken_s == Some(stats.elapsed_s) {
            return None;
        }
        self.last_spoken_s = Some(stats.elapsed_s);
        tracing::debug!(elapsed_s = stats.elapsed_s, "announcement due");
        Some(Announcement::from(stats))
    }

    /// Forget the last announcement; call between runs.
    pub fn reset(&mut self) {
        self.last_spoken_s = None;
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Announcement {
    pub current_pace: f64,
    pub overall_pace: f64,
    pub distance_km: f64,
}

impl From<&RunStats> for Announcement {
    fn from(s: &RunStats) -> Self {
        Self {
            current_pace: s.current_pace,
            overall_pace: s.overall_pace,
            distance_km: s.distance_km,
        }
    }
}

impl fmt::Display for Announcement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (cm, cs) = split_pace(self.current_pace);
        let (om, os) = split_pace(self.overall_pace);
        write!(
            f,
            "Current pace is {cm} minutes {cs} seconds per kilometer. \
             Overall pace is {om} minutes {os} seconds per kilometer. \
             Distance traveled is {:.1} kilometers.",
            self.distance_km
        )
    }
}
