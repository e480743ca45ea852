//! Reductions over a smoothed, time-ordered sample sequence.
use geo::{HaversineDistance, point};

use crate::sample::Sample;

/// Great-circle distance between two samples in meters.
#[inline]
pub fn haversine_m(a: &Sample, b: &Sample) -> f64 {
    let pa = point!(x: a.longitude(), y: a.latitude());
    let pb = point!(x: b.longitude(), y: b.latitude());
    pa.haversine_distance(&pb)
}

/// Sum of distances between consecutive samples, meters. 0 for fewer than two.
pub fn path_length_m(seq: &[Sample]) -> f64 {
    seq.windows(2).map(|w| haversine_m(&w[0], &w[1])).sum()
}

/// Sum of absolute altitude changes between consecutive samples, meters.
/// Climbs and descents both count.
pub fn cumulative_elevation_change_m(seq: &[Sample]) -> f64 {
    seq.windows(2)
        .map(|w| (w[1].altitude() - w[0].altitude()).abs())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(lat: f64, lon: f64, alt: f64) -> Sample {
        Sample::builder("t", 0)
            .position(lat, lon)
            .altitude(alt)
            .build()
            .unwrap()
    }

    #[test]
    fn empty_and_single_are_zero() {
        assert_eq!(path_length_m(&[]), 0.0);
        assert_eq!(path_length_m(&[at(1.0, 1.0, 0.0)]), 0.0);
        assert_eq!(cumulative_elevation_change_m(&[at(1.0, 1.0, 5.0)]), 0.0);
    }

    #[test]
    fn one_thousandth_degree_of_latitude_is_about_111_m() {
        let d = haversine_m(&at(0.0, 0.0, 0.0), &at(0.001, 0.0, 0.0));
        assert!((d - 111.19).abs() < 0.5, "d={d}");
    }

    #[test]
    fn elevation_counts_climbs_and_descents() {
        let seq = [at(0.0, 0.0, 10.0), at(0.0, 0.0, 15.0), at(0.0, 0.0, 12.0)];
        assert_eq!(cumulative_elevation_change_m(&seq), 8.0);
    }
}
