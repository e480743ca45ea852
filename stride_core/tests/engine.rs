use rstest::{fixture, rstest};
use stride_core::{EngineCfg, MetricsEngine, Sample};
use stride_traits::ManualClock;

struct Rig {
    clock: ManualClock,
    engine: MetricsEngine,
}

#[fixture]
fn rig() -> Rig {
    let clock = ManualClock::new(0);
    let engine = MetricsEngine::builder()
        .with_clock(clock.clone())
        .build()
        .unwrap();
    Rig { clock, engine }
}

fn fix(ts: i64, lat: f64, lon: f64, acc: f64) -> Sample {
    Sample::builder("gps", ts)
        .position(lat, lon)
        .horizontal_accuracy(acc)
        .vertical_accuracy(acc)
        .build()
        .unwrap()
}

#[rstest]
fn two_fixes_in_adjacent_buckets_give_about_100_m(rig: Rig) {
    rig.engine.ingest(fix(0, 0.0, 0.0, 3.0));
    rig.engine.ingest(fix(2_000, 0.0009, 0.0, 3.0));
    rig.clock.set_ms(2_000);

    assert_eq!(rig.engine.position_sequence(0).len(), 2);
    let km = rig.engine.distance_traveled(0);
    assert!((km - 0.1).abs() < 0.001, "km={km}");
}

#[rstest]
fn connectivity_follows_recency_and_accuracy(rig: Rig) {
    rig.engine.ingest(fix(5_000, 0.0, 0.0, 2.0));
    rig.clock.set_ms(20_000);
    assert!(!rig.engine.is_connected());
    assert!(rig.engine.last_position_sample().is_none());

    rig.engine.ingest(fix(19_000, 0.0, 0.0, 2.0));
    assert!(rig.engine.is_connected());
    let last = rig.engine.last_position_sample().unwrap();
    assert_eq!(last.timestamp_ms(), 19_000);
    assert!(last.is_synthetic());
}

#[rstest]
fn inaccurate_recent_fix_is_not_connected(rig: Rig) {
    rig.engine.ingest(fix(9_000, 0.0, 0.0, 8.0));
    rig.clock.set_ms(10_000);
    assert!(!rig.engine.is_connected());
}

#[rstest]
fn current_pace_is_clamped(rig: Rig) {
    // About one meter in a minute.
    rig.engine.ingest(fix(0, 0.0, 0.0, 2.0));
    rig.engine.ingest(fix(60_000, 0.000_009, 0.0, 2.0));
    rig.clock.set_ms(60_000);

    let raw = rig.engine.pace_over_interval(0).unwrap();
    assert!(raw > 500.0, "raw={raw}");
    assert_eq!(rig.engine.current_pace(), 50.0);
    assert_eq!(rig.engine.overall_pace(0), 50.0);
}

#[rstest]
fn no_movement_has_no_pace(rig: Rig) {
    rig.engine.ingest(fix(0, 1.0, 1.0, 2.0));
    rig.clock.set_ms(30_000);
    assert_eq!(rig.engine.pace_over_interval(0), None);
    assert_eq!(rig.engine.current_pace(), rig.engine.pace_cap_min_per_km());
}

#[rstest]
fn pace_from_the_future_is_undefined(rig: Rig) {
    // Fixes stamped ahead of the clock still produce distance after `since`.
    rig.engine.ingest(fix(10_000, 0.0, 0.0, 2.0));
    rig.engine.ingest(fix(15_000, 0.0009, 0.0, 2.0));
    rig.clock.set_ms(5_000);
    assert!(rig.engine.distance_traveled(8_000) > 0.0);

    assert_eq!(rig.engine.pace_over_interval(8_000), None);
    assert_eq!(rig.engine.pace_over_interval(5_000), None);
    assert_eq!(rig.engine.overall_pace(8_000), rig.engine.pace_cap_min_per_km());
}

#[rstest]
fn steady_run_pace(rig: Rig) {
    // 0.0009 deg of latitude (~100 m) every 30 s: about 5 min/km.
    for i in 0..=10 {
        rig.engine
            .ingest(fix(i * 30_000, 0.0009 * i as f64, 0.0, 2.0));
    }
    rig.clock.set_ms(300_000);
    let pace = rig.engine.overall_pace(0);
    assert!((pace - 5.0).abs() < 0.05, "pace={pace}");
    // Default 60 s window covers the last two legs.
    let current = rig.engine.current_pace();
    assert!((current - 5.0).abs() < 0.05, "current={current}");
}

#[rstest]
fn squared_weighting_pulls_toward_accurate_fix(rig: Rig) {
    rig.engine.ingest(fix(0, 0.0, 0.0, 1.0));
    rig.engine.ingest(fix(100, 0.001, 0.0, 4.0));

    let linear = rig.engine.position_sequence(0)[0].latitude();
    rig.engine.set_squared_weighting(true);
    let squared = rig.engine.position_sequence(0)[0].latitude();

    assert!((linear - 0.0002).abs() < 1e-12, "linear={linear}");
    assert!(squared.abs() < linear.abs());
}

#[rstest]
fn elevation_uses_vertical_accuracy_only(rig: Rig) {
    let climb = |ts, alt, v: Option<f64>| {
        Sample::builder("gps", ts)
            .altitude(alt)
            .horizontal_accuracy(1.0)
            .vertical_accuracy(v)
            .build()
            .unwrap()
    };
    rig.engine.ingest(climb(0, 10.0, Some(2.0)));
    rig.engine.ingest(climb(5_000, 15.0, Some(2.0)));
    rig.engine.ingest(climb(10_000, 99.0, None));
    rig.engine.ingest(climb(15_000, 12.0, Some(2.0)));
    assert_eq!(rig.engine.elevation_gain(0), 8.0);
    assert_eq!(rig.engine.elevation_gain(5_000), 3.0);
}

#[rstest]
fn elapsed_seconds_truncates(rig: Rig) {
    rig.clock.set_ms(2_999);
    assert_eq!(rig.engine.elapsed_seconds(0), 2);
}

#[rstest]
#[case(5, false)]
#[case(10, true)]
#[case(33, false)]
#[case(600, true)]
#[case(605, false)]
fn pace_window_setter_validates(rig: Rig, #[case] secs: u32, #[case] ok: bool) {
    assert_eq!(rig.engine.set_current_pace_window_s(secs).is_ok(), ok);
    let expected = if ok { secs } else { 60 };
    assert_eq!(rig.engine.current_pace_window_s(), expected);
}

#[rstest]
fn clear_drops_log(rig: Rig) {
    rig.engine.ingest(fix(0, 0.0, 0.0, 1.0));
    assert_eq!(rig.engine.len(), 1);
    rig.engine.clear();
    assert!(rig.engine.is_empty());
    assert!(rig.engine.position_sequence(0).is_empty());
}

#[test]
fn builder_rejects_bad_config() {
    let err = MetricsEngine::builder()
        .with_config(EngineCfg {
            bucket_width_ms: 0,
            ..EngineCfg::default()
        })
        .build()
        .unwrap_err();
    match err.downcast_ref::<stride_core::BuildError>() {
        Some(stride_core::BuildError::InvalidConfig(msg)) => {
            assert!(msg.contains("bucket_width_ms"));
        }
        other => panic!("expected InvalidConfig, got: {other:?}"),
    }
}

#[test]
fn concurrent_ingest_and_query() {
    use std::sync::Arc;
    let engine = Arc::new(
        MetricsEngine::builder()
            .with_clock(ManualClock::new(100_000))
            .build()
            .unwrap(),
    );
    let writer = {
        let engine = engine.clone();
        std::thread::spawn(move || {
            for i in 0..500 {
                engine.ingest(fix(i * 200, 0.0, 0.000_01 * i as f64, 2.0));
            }
        })
    };
    for _ in 0..50 {
        let _ = engine.distance_traveled(0);
    }
    writer.join().unwrap();
    assert_eq!(engine.len(), 500);
}
