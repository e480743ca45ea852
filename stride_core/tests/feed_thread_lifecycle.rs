//! Feed threads stop on exhaustion, on provider failure and on drop.

use std::sync::Arc;
use std::time::{Duration, Instant};

use stride_core::{Feed, MetricsEngine, StrideError};
use stride_providers::{ReplayProvider, SimulatedProvider, SimulatedRun, channel};
use stride_traits::{BoxError, LocationProvider, ManualClock, RawFix};

fn engine() -> Arc<MetricsEngine> {
    Arc::new(
        MetricsEngine::builder()
            .with_clock(ManualClock::new(0))
            .build()
            .unwrap(),
    )
}

fn wait_finished(feed: &Feed) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !feed.is_finished() {
        assert!(Instant::now() < deadline, "feed did not finish");
        std::thread::sleep(Duration::from_millis(2));
    }
}

fn raw(ts: i64, lat: f64) -> RawFix {
    RawFix {
        source: "gps".into(),
        captured_ms: ts,
        latitude: lat,
        longitude: 0.0,
        altitude: 0.0,
        speed: 0.0,
        horizontal_accuracy: Some(2.0),
        vertical_accuracy: None,
        speed_accuracy: None,
    }
}

#[test]
fn feed_drains_simulated_run() {
    let e = engine();
    let provider = SimulatedProvider::new(SimulatedRun {
        fixes: Some(50),
        ..SimulatedRun::default()
    });
    let feed = Feed::spawn(provider, e.clone(), Duration::from_millis(50));
    wait_finished(&feed);
    assert_eq!(feed.provider(), "simulated");
    assert_eq!(feed.received(), 50);
    assert_eq!(feed.rejected(), 0);
    assert_eq!(e.len(), 50);
    assert!(feed.failure().is_none());
}

#[test]
fn invalid_fixes_are_counted_and_skipped() {
    let e = engine();
    let provider = ReplayProvider::new([raw(0, 0.0), raw(1_000, 100.0), raw(-5, 0.0), raw(2_000, 0.001)]);
    let feed = Feed::spawn(provider, e.clone(), Duration::from_millis(50));
    wait_finished(&feed);
    assert_eq!(feed.received(), 4);
    assert_eq!(feed.rejected(), 2);
    assert_eq!(e.len(), 2);
}

struct Broken;

impl LocationProvider for Broken {
    fn next_fix(&mut self, _timeout: Duration) -> Result<Option<RawFix>, BoxError> {
        Err("bad nmea sentence".into())
    }
    fn name(&self) -> &str {
        "broken"
    }
}

#[test]
fn provider_failure_ends_feed() {
    let feed = Feed::spawn(Broken, engine(), Duration::from_millis(10));
    wait_finished(&feed);
    assert!(matches!(feed.failure(), Some(StrideError::Provider(m)) if m.contains("nmea")));
}

#[test]
fn idle_channel_feed_exits_on_drop() {
    let (tx, rx) = channel(8);
    let feed = Feed::spawn(rx, engine(), Duration::from_millis(20));
    std::thread::sleep(Duration::from_millis(50));
    assert!(!feed.is_finished());
    assert_eq!(feed.received(), 0);

    let start = Instant::now();
    drop(feed);
    // Bounded by the provider timeout.
    assert!(start.elapsed() < Duration::from_secs(1));
    // Consumer is gone.
    assert!(tx.send(raw(0, 0.0)).is_err());
}

#[test]
fn channel_feed_exits_when_senders_drop() {
    let e = engine();
    let (tx, rx) = channel(8);
    let feed = Feed::spawn(rx, e.clone(), Duration::from_millis(20));
    for i in 0..5 {
        tx.send(raw(i * 1_000, 0.0)).unwrap();
    }
    drop(tx);
    wait_finished(&feed);
    assert_eq!(feed.received(), 5);
    assert_eq!(e.len(), 5);
}

#[test]
fn stall_is_measured_from_last_accepted_fix() {
    let clock = ManualClock::new(1_000);
    let e = Arc::new(
        MetricsEngine::builder()
            .with_clock(clock.clone())
            .build()
            .unwrap(),
    );
    let feed = Feed::spawn(ReplayProvider::new([raw(0, 0.0)]), e, Duration::from_millis(10));
    wait_finished(&feed);
    assert_eq!(feed.stalled_for_ms(4_000), 3_000);
    assert_eq!(feed.stalled_for_ms(0), 0);
}

#[test]
fn many_feeds_dont_leak_threads() {
    for _ in 0..10 {
        let (_tx, rx) = channel(1);
        let feed = Feed::spawn(rx, engine(), Duration::from_millis(5));
        std::thread::sleep(Duration::from_millis(5));
        drop(feed);
    }
}
