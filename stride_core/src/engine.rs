//! The metrics engine: an append-only sample log plus point-in-time queries.
//!
//! Producers call [`MetricsEngine::ingest`]; the UI polls distance, elevation,
//! pace and connectivity on its own cadence. Every query snapshots the log
//! under a short read lock and recomputes from the whole history, so the
//! producer is only ever blocked for the duration of a copy. The engine has no
//! timers and no notion of runs: callers anchor queries with timestamps.
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use stride_traits::clock::{Clock, SystemClock};

use crate::aggregate::WindowAggregator;
use crate::config::{EngineCfg, validate_pace_window};
use crate::error::Result;
use crate::policy::QualityPolicy;
use crate::sample::Sample;
use crate::track::{cumulative_elevation_change_m, path_length_m};
use crate::util::{MILLIS_PER_MINUTE, MILLIS_PER_SEC};

pub struct MetricsEngine {
    log: RwLock<Vec<Sample>>,
    clock: Arc<dyn Clock + Send + Sync>,
    aggregator: WindowAggregator,
    max_accuracy_m: f64,
    recency_window_ms: i64,
    pace_cap_min_per_km: f64,
    squared_weighting: AtomicBool,
    current_pace_window_s: AtomicU32,
}

impl core::fmt::Debug for MetricsEngine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MetricsEngine")
            .field("samples", &self.len())
            .field("bucket_width_ms", &self.aggregator.bucket_width_ms())
            .field("squared_weighting", &self.squared_weighting())
            .field("current_pace_window_s", &self.current_pace_window_s())
            .finish()
    }
}

impl MetricsEngine {
    pub fn builder() -> MetricsEngineBuilder {
        MetricsEngineBuilder::default()
    }

    /// Append a sample to the log. Validity is judged lazily by each query.
    pub fn ingest(&self, sample: Sample) {
        debug_assert!(sample.timestamp_ms() >= 0);
        let mut log = self.log.write().unwrap_or_else(PoisonError::into_inner);
        log.push(sample);
    }

    /// Number of raw samples held.
    pub fn len(&self) -> usize {
        self.log.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every raw sample; owners call this at run boundaries.
    pub fn clear(&self) {
        self.log
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Consistent copy of the raw log in arrival order.
    pub fn snapshot(&self) -> Vec<Sample> {
        self.log
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Current time according to the engine's clock.
    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    pub fn squared_weighting(&self) -> bool {
        self.squared_weighting.load(Ordering::Relaxed)
    }

    pub fn set_squared_weighting(&self, on: bool) {
        self.squared_weighting.store(on, Ordering::Relaxed);
    }

    pub fn current_pace_window_s(&self) -> u32 {
        self.current_pace_window_s.load(Ordering::Relaxed)
    }

    /// Change the current-pace window (multiple of 5 s within 10..=600).
    pub fn set_current_pace_window_s(&self, secs: u32) -> Result<()> {
        validate_pace_window(secs).map_err(eyre::Report::new)?;
        self.current_pace_window_s.store(secs, Ordering::Relaxed);
        Ok(())
    }

    pub fn pace_cap_min_per_km(&self) -> f64 {
        self.pace_cap_min_per_km
    }

    pub fn position_policy(&self) -> QualityPolicy {
        QualityPolicy::Position {
            max_accuracy_m: self.max_accuracy_m,
            squared_weighting: self.squared_weighting(),
        }
    }

    pub fn elevation_policy(&self) -> QualityPolicy {
        QualityPolicy::Elevation {
            max_accuracy_m: self.max_accuracy_m,
        }
    }

    /// Smoothed sequence of the log under `policy`, from `since_ms` on.
    pub fn optimized_sequence(&self, policy: &QualityPolicy, since_ms: i64) -> Vec<Sample> {
        let snapshot = self.snapshot();
        self.aggregator.aggregate(&snapshot, policy, since_ms)
    }

    pub fn position_sequence(&self, since_ms: i64) -> Vec<Sample> {
        self.optimized_sequence(&self.position_policy(), since_ms)
    }

    pub fn elevation_sequence(&self, since_ms: i64) -> Vec<Sample> {
        self.optimized_sequence(&self.elevation_policy(), since_ms)
    }

    /// Kilometers covered since `since_ms`.
    pub fn distance_traveled(&self, since_ms: i64) -> f64 {
        path_length_m(&self.position_sequence(since_ms)) / 1000.0
    }

    /// Cumulative absolute elevation change since `since_ms`, meters.
    pub fn elevation_gain(&self, since_ms: i64) -> f64 {
        cumulative_elevation_change_m(&self.elevation_sequence(since_ms))
    }

    /// Minutes elapsed per kilometer traveled since `since_ms`.
    ///
    /// `None` when no distance was covered or `since_ms` is not in the past:
    /// the pace is undefined and the caller picks what to display.
    pub fn pace_over_interval(&self, since_ms: i64) -> Option<f64> {
        let elapsed_ms = self.now_ms() - since_ms;
        if elapsed_ms <= 0 {
            return None;
        }
        let distance_km = self.distance_traveled(since_ms);
        if distance_km <= 0.0 {
            return None;
        }
        Some(elapsed_ms as f64 / MILLIS_PER_MINUTE as f64 / distance_km)
    }

    /// Pace over the last `current_pace_window_s`, capped. No movement reads as the cap.
    pub fn current_pace(&self) -> f64 {
        let window_ms = i64::from(self.current_pace_window_s()) * MILLIS_PER_SEC;
        self.capped_pace(self.now_ms() - window_ms)
    }

    /// Pace since `start_ms`, capped. No movement reads as the cap.
    pub fn overall_pace(&self, start_ms: i64) -> f64 {
        self.capped_pace(start_ms)
    }

    fn capped_pace(&self, since_ms: i64) -> f64 {
        self.pace_over_interval(since_ms)
            .map_or(self.pace_cap_min_per_km, |p| {
                p.min(self.pace_cap_min_per_km)
            })
    }

    /// Whole seconds since `since_ms`, truncated toward zero.
    pub fn elapsed_seconds(&self, since_ms: i64) -> i64 {
        (self.now_ms() - since_ms) / MILLIS_PER_SEC
    }

    /// Most recent smoothed position inside the recency window.
    pub fn last_position_sample(&self) -> Option<Sample> {
        let since = self.now_ms() - self.recency_window_ms;
        self.position_sequence(since).pop()
    }

    /// Most recent smoothed elevation inside the recency window.
    pub fn last_elevation_sample(&self) -> Option<Sample> {
        let since = self.now_ms() - self.recency_window_ms;
        self.elevation_sequence(since).pop()
    }

    /// A recent position fix exists and its accuracy is within (0, max].
    pub fn is_connected(&self) -> bool {
        self.last_position_sample()
            .and_then(|s| s.horizontal_accuracy())
            .is_some_and(|a| a > 0.0 && a <= self.max_accuracy_m)
    }
}

/// Builder for [`MetricsEngine`]; configuration is validated in `build()`.
#[derive(Default)]
pub struct MetricsEngineBuilder {
    cfg: Option<EngineCfg>,
    clock: Option<Arc<dyn Clock + Send + Sync>>,
    capacity: usize,
}

impl MetricsEngineBuilder {
    pub fn with_config(mut self, cfg: EngineCfg) -> Self {
        self.cfg = Some(cfg);
        self
    }

    /// Inject a clock (tests and replays use `ManualClock`).
    pub fn with_clock(mut self, clock: impl Clock + Send + Sync + 'static) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    /// Pre-size the sample log.
    pub fn with_capacity(mut self, samples: usize) -> Self {
        self.capacity = samples;
        self
    }

    pub fn build(self) -> Result<MetricsEngine> {
        let cfg = self.cfg.unwrap_or_default();
        cfg.validate().map_err(eyre::Report::new)?;
        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(SystemClock::new()));
        tracing::debug!(
            bucket_width_ms = cfg.bucket_width_ms,
            squared_weighting = cfg.squared_weighting,
            current_pace_window_s = cfg.current_pace_window_s,
            "metrics engine built"
        );
        Ok(MetricsEngine {
            log: RwLock::new(Vec::with_capacity(self.capacity)),
            clock,
            aggregator: WindowAggregator::new(cfg.bucket_width_ms),
            max_accuracy_m: cfg.max_accuracy_m,
            recency_window_ms: cfg.recency_window_ms,
            pace_cap_min_per_km: cfg.pace_cap_min_per_km,
            squared_weighting: AtomicBool::new(cfg.squared_weighting),
            current_pace_window_s: AtomicU32::new(cfg.current_pace_window_s),
        })
    }
}

