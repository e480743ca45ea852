use stride_config::load_toml;

#[test]
fn rejects_pace_window_not_multiple_of_five() {
    let toml = r#"
[engine]
squared_weighting = true
current_pace_window_s = 42
"#;

    let cfg = load_toml(toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should reject a 42 s window");
    assert!(
        format!("{err}")
            .to_lowercase()
            .contains("current_pace_window_s must be a multiple of 5")
    );
}

#[test]
fn rejects_pace_window_below_minimum() {
    let cfg = load_toml("[engine]\ncurrent_pace_window_s = 5\n").expect("parse TOML");
    let err = cfg.validate().expect_err("should reject 5 s");
    assert!(format!("{err}").contains(">= 10"));
}

#[test]
fn rejects_announce_interval_not_whole_minutes() {
    let cfg = load_toml("[announce]\ninterval_s = 90\n").expect("parse TOML");
    let err = cfg.validate().expect_err("should reject 90 s");
    assert!(format!("{err}").contains("announce.interval_s"));
}

#[test]
fn rejects_zero_bucket_width() {
    let cfg = load_toml("[engine]\nbucket_width_ms = 0\n").expect("parse TOML");
    assert!(cfg.validate().is_err());
}

#[test]
fn accepts_full_config() {
    let toml = r#"
[engine]
squared_weighting = true
current_pace_window_s = 30
bucket_width_ms = 2500
max_accuracy_m = 5.0

[connectivity]
recency_window_ms = 10000

[pace]
cap_min_per_km = 50.0

[announce]
enabled = false
interval_s = 120

[ui]
refresh_ms = 1000

[history]
file = "runs.json"

[logging]
level = "debug"
rotation = "daily"
"#;

    let cfg = load_toml(toml).expect("parse TOML");
    cfg.validate().expect("valid config should pass");
    assert!(cfg.engine.squared_weighting);
    assert_eq!(cfg.engine.current_pace_window_s, 30);
    assert!(!cfg.announce.enabled);
    assert_eq!(cfg.history.file.as_deref(), Some("runs.json"));
}
