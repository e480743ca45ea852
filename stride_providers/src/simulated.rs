//! Deterministic synthetic run.
//!
//! The runner moves at constant speed along a fixed bearing. Each tick yields
//! one fix, alternating between a `gps` source (with vertical accuracy) and a
//! `fused` source (without). Position noise and reported accuracies come from
//! a seeded xorshift generator; roughly one fix in five reports a horizontal
//! accuracy worse than 5 m.
use std::sync::Arc;
use std::time::Duration;

use stride_traits::clock::Clock;
use stride_traits::{BoxError, LocationProvider, RawFix};

use crate::util::{XorShift32, offset};

#[derive(Debug, Clone)]
pub struct SimulatedRun {
    pub start_ms: i64,
    pub period_ms: i64,
    pub speed_mps: f64,
    pub bearing_deg: f64,
    pub origin: (f64, f64),
    pub base_altitude_m: f64,
    /// Amplitude of a sinusoidal hill profile, meters. 0 keeps the run flat.
    pub hill_amplitude_m: f64,
    /// Period of the hill profile, meters along the route.
    pub hill_length_m: f64,
    /// Fixes to emit; `None` runs forever.
    pub fixes: Option<u64>,
    pub seed: u32,
}

impl Default for SimulatedRun {
    fn default() -> Self {
        Self {
            start_ms: 0,
            period_ms: 1_000,
            speed_mps: 3.0,
            bearing_deg: 45.0,
            origin: (-22.9068, -43.1729),
            base_altitude_m: 10.0,
            hill_amplitude_m: 5.0,
            hill_length_m: 400.0,
            fixes: None,
            seed: 1,
        }
    }
}

pub struct SimulatedProvider {
    run: SimulatedRun,
    rng: XorShift32,
    tick: u64,
    clock: Option<Arc<dyn Clock + Send + Sync>>,
}

impl SimulatedProvider {
    pub fn new(run: SimulatedRun) -> Self {
        let rng = XorShift32::new(run.seed);
        Self {
            run,
            rng,
            tick: 0,
            clock: None,
        }
    }

    /// Pace emission with `clock`: each call sleeps one period and stamps the
    /// fix with the clock's time instead of the synthetic timeline.
    pub fn paced(mut self, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn emitted(&self) -> u64 {
        self.tick
    }

    /// Distance along the route after `tick` periods, meters.
    fn route_m(&self, tick: u64) -> f64 {
        self.run.speed_mps * (tick as f64) * (self.run.period_ms as f64) / 1000.0
    }

    fn make_fix(&mut self, captured_ms: i64) -> RawFix {
        let along = self.route_m(self.tick);
        let (lat0, lon0) = self.run.origin;
        let (lat, lon) = offset(lat0, lon0, along, self.run.bearing_deg);

        let h_acc = if self.rng.next_u32() % 5 == 0 {
            self.rng.range(5.5, 12.0)
        } else {
            self.rng.range(1.5, 4.5)
        };
        // Scatter around the true position within the reported accuracy.
        let (lat, lon) = offset(lat, lon, self.rng.range(0.0, h_acc), self.rng.range(0.0, 360.0));

        let hill = if self.run.hill_length_m > 0.0 {
            self.run.hill_amplitude_m
                * (along / self.run.hill_length_m * std::f64::consts::TAU).sin()
        } else {
            0.0
        };
        let v_acc = self.rng.range(1.0, 6.0);
        let gps = self.tick % 2 == 0;

        RawFix {
            source: (if gps { "gps" } else { "fused" }).to_owned(),
            captured_ms,
            latitude: lat,
            longitude: lon,
            altitude: self.run.base_altitude_m + hill + self.rng.range(-0.5, 0.5) * v_acc,
            speed: (self.run.speed_mps + self.rng.range(-0.3, 0.3)).max(0.0),
            horizontal_accuracy: Some(h_acc),
            vertical_accuracy: gps.then_some(v_acc),
            speed_accuracy: gps.then(|| self.rng.range(0.1, 1.0)),
        }
    }
}

impl LocationProvider for SimulatedProvider {
    fn next_fix(&mut self, _timeout: Duration) -> Result<Option<RawFix>, BoxError> {
        if self.run.fixes.is_some_and(|n| self.tick >= n) {
            return Ok(None);
        }
        let captured_ms = match &self.clock {
            Some(clock) => {
                clock.sleep(Duration::from_millis(
                    u64::try_from(self.run.period_ms).unwrap_or(0),
                ));
                clock.now_ms()
            }
            None => {
                self.run.start_ms
                    + i64::try_from(self.tick).unwrap_or(i64::MAX) * self.run.period_ms
            }
        };
        let fix = self.make_fix(captured_ms);
        tracing::trace!(tick = self.tick, ts = captured_ms, source = %fix.source, "simulated fix");
        self.tick += 1;
        Ok(Some(fix))
    }

    fn name(&self) -> &str {
        "simulated"
    }
}
