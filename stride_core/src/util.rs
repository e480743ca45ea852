//! Time constants and display helpers shared by the engine and its hosts.

/// Number of milliseconds in one second.
pub const MILLIS_PER_SEC: i64 = 1_000;
/// Number of milliseconds in one minute.
pub const MILLIS_PER_MINUTE: i64 = 60 * MILLIS_PER_SEC;

/// Render whole seconds as `H:MM:SS`. Negative input renders as `0:00:00`.
pub fn format_elapsed(seconds: i64) -> String {
    let s = seconds.max(0);
    format!("{}:{:02}:{:02}", s / 3600, (s % 3600) / 60, s % 60)
}

/// Split a pace in minutes per kilometer into whole minutes and seconds.
///
/// Seconds are rounded to nearest; a rounding to 60 carries into the minutes.
/// Non-finite or negative paces map to `(0, 0)`.
pub fn split_pace(min_per_km: f64) -> (u64, u64) {
    if !min_per_km.is_finite() || min_per_km <= 0.0 {
        return (0, 0);
    }
    let total_s = (min_per_km * 60.0).round() as u64;
    (total_s / 60, total_s % 60)
}

/// Render a pace as `M:SS min/km`.
pub fn format_pace(min_per_km: f64) -> String {
    let (m, s) = split_pace(min_per_km);
    format!("{m}:{s:02} min/km")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, "0:00:00")]
    #[case(59, "0:00:59")]
    #[case(61, "0:01:01")]
    #[case(3_725, "1:02:05")]
    #[case(-5, "0:00:00")]
    fn elapsed_formats(#[case] secs: i64, #[case] expected: &str) {
        assert_eq!(format_elapsed(secs), expected);
    }

    #[rstest]
    #[case(5.5, (5, 30))]
    #[case(4.999, (5, 0))]
    #[case(50.0, (50, 0))]
    #[case(f64::NAN, (0, 0))]
    fn pace_splits(#[case] pace: f64, #[case] expected: (u64, u64)) {
        assert_eq!(split_pace(pace), expected);
    }

    #[test]
    fn pace_renders_with_padded_seconds() {
        assert_eq!(format_pace(6.1), "6:06 min/km");
    }
}
