use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Wall-clock abstraction shared by providers, the metrics engine and hosts.
///
/// - now_ms(): milliseconds since the UNIX epoch
/// - sleep(): sleeps for the provided duration (implementations may simulate)
/// - ms_since(): helper to compute elapsed milliseconds from an earlier timestamp
pub trait Clock {
    fn now_ms(&self) -> i64;
    fn sleep(&self, d: Duration);

    /// Milliseconds elapsed since `epoch_ms`, saturating at 0 when `epoch_ms` lies in the future.
    fn ms_since(&self, epoch_ms: i64) -> u64 {
        let d = self.now_ms().saturating_sub(epoch_ms);
        u64::try_from(d).unwrap_or(0)
    }
}

/// Real-time clock backed by `SystemTime`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl SystemClock {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    #[inline]
    fn now_ms(&self) -> i64 {
        let since_epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO);
        i64::try_from(since_epoch.as_millis()).unwrap_or(i64::MAX)
    }

    #[inline]
    fn sleep(&self, d: Duration) {
        if d.is_zero() {
            return;
        }
        thread::sleep(d);
    }
}

/// Deterministic clock whose time is set or advanced by hand.
///
/// Clones share the same underlying time, so a host can keep one handle and
/// give another to the engine. `sleep(d)` advances time by `d` without
/// blocking; replays use this to run a recorded session faster than real time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<Mutex<i64>>,
}

impl ManualClock {
    pub fn new(start_ms: i64) -> Self {
        Self {
            now: Arc::new(Mutex::new(start_ms)),
        }
    }

    /// Advance the clock by the given duration.
    pub fn advance(&self, d: Duration) {
        let step = i64::try_from(d.as_millis()).unwrap_or(i64::MAX);
        if let Ok(mut now) = self.now.lock() {
            *now = now.saturating_add(step);
        }
    }

    /// Set the absolute time in epoch milliseconds.
    pub fn set_ms(&self, ms: i64) {
        if let Ok(mut now) = self.now.lock() {
            *now = ms;
        }
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now.lock().map(|g| *g).unwrap_or(0)
    }

    fn sleep(&self, d: Duration) {
        self.advance(d);
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now_ms(&self) -> i64 {
        (**self).now_ms()
    }

    fn sleep(&self, d: Duration) {
        (**self).sleep(d);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_shares_time_between_clones() {
        let a = ManualClock::new(1_000);
        let b = a.clone();
        a.advance(Duration::from_millis(250));
        assert_eq!(b.now_ms(), 1_250);
        b.sleep(Duration::from_secs(1));
        assert_eq!(a.now_ms(), 2_250);
    }

    #[test]
    fn ms_since_saturates_for_future_epoch() {
        let c = ManualClock::new(500);
        assert_eq!(c.ms_since(100), 400);
        assert_eq!(c.ms_since(900), 0);
    }

    #[test]
    fn system_clock_is_after_2020() {
        // 2020-01-01T00:00:00Z
        assert!(SystemClock::new().now_ms() > 1_577_836_800_000);
    }
}
