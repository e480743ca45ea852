//! Run lifecycle: Idle -> Running -> Idle.
//!
//! A session only remembers when the run started. All figures are pulled from
//! the [`MetricsEngine`] on demand, anchored at that start time.
use crate::engine::MetricsEngine;
use crate::error::{Result, StrideError};
use crate::util::MILLIS_PER_SEC;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Idle,
    Running {
        start_ms: i64,
    },
}

/// Totals of a finished run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    /// Run start, epoch milliseconds.
    pub when: i64,
    /// Duration in whole seconds.
    pub time: i64,
    pub distance_km: f64,
    /// Overall pace (capped), min/km.
    pub pace_min_per_km: f64,
    /// Cumulative elevation change, meters.
    pub altimetry_m: f64,
}

/// Live figures of a running session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunStats {
    pub start_ms: i64,
    pub elapsed_s: i64,
    pub current_pace: f64,
    pub overall_pace: f64,
    pub distance_km: f64,
    pub elevation_m: f64,
}

/// Everything a UI tick displays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dashboard {
    pub connected: bool,
    pub position_accuracy_m: Option<f64>,
    pub elevation_accuracy_m: Option<f64>,
    pub run: Option<RunStats>,
}

#[derive(Debug, Default)]
pub struct RunSession {
    state: RunState,
}

impl RunSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, RunState::Running { .. })
    }

    /// A run may start once a recent position fix has acceptable accuracy.
    pub fn can_start(&self, engine: &MetricsEngine) -> bool {
        !self.is_running() && engine.is_connected()
    }

    pub fn start(&mut self, now_ms: i64) -> Result<()> {
        if let RunState::Running { start_ms } = self.state {
            return Err(eyre::Report::new(StrideError::State(format!(
                "run already started at {start_ms}"
            ))));
        }
        self.state = RunState::Running { start_ms: now_ms };
        tracing::info!(start_ms = now_ms, "run started");
        Ok(())
    }

    /// Finish the run and compute its totals.
    pub fn stop(&mut self, engine: &MetricsEngine) -> Result<RunSummary> {
        let RunState::Running { start_ms } = self.state else {
            return Err(eyre::Report::new(StrideError::State(
                "no run in progress".into(),
            )));
        };
        let summary = RunSummary {
            when: start_ms,
            time: (engine.now_ms() - start_ms).max(0) / MILLIS_PER_SEC,
            distance_km: engine.distance_traveled(start_ms),
            pace_min_per_km: engine.overall_pace(start_ms),
            altimetry_m: engine.elevation_gain(start_ms),
        };
        self.state = RunState::Idle;
        tracing::info!(
            time_s = summary.time,
            distance_km = summary.distance_km,
            pace = summary.pace_min_per_km,
            "run stopped"
        );
        Ok(summary)
    }

    pub fn snapshot(&self, engine: &MetricsEngine) -> Dashboard {
        let run = match self.state {
            RunState::Idle => None,
            RunState::Running { start_ms } => Some(RunStats {
                start_ms,
                elapsed_s: engine.elapsed_seconds(start_ms),
                current_pace: engine.current_pace(),
                overall_pace: engine.overall_pace(start_ms),
                distance_km: engine.distance_traveled(start_ms),
                elevation_m: engine.elevation_gain(start_ms),
            }),
        };
        Dashboard {
            connected: engine.is_connected(),
            position_accuracy_m: engine
                .last_position_sample()
                .and_then(|s| s.horizontal_accuracy()),
            elevation_accuracy_m: engine
                .last_elevation_sample()
                .and_then(|s| s.vertical_accuracy()),
            run,
        }
    }
}
