//! Per-sample validity and weighting rules.
//!
//! Two policies exist: `Position` smooths latitude/longitude using the
//! horizontal accuracy, `Elevation` smooths altitude using the vertical
//! accuracy. Both reject samples whose relevant accuracy is absent or worse
//! than `max_accuracy_m`. An invalid sample is simply left out.

use crate::sample::Sample;

/// Default acceptance threshold for both policies, in meters.
pub const DEFAULT_MAX_ACCURACY_M: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QualityPolicy {
    /// Weight = 1/h, or 1/h² when `squared_weighting` is on.
    Position {
        max_accuracy_m: f64,
        squared_weighting: bool,
    },
    /// Weight = 1/v. Squared weighting never applies here.
    Elevation { max_accuracy_m: f64 },
}

impl QualityPolicy {
    pub fn position(squared_weighting: bool) -> Self {
        QualityPolicy::Position {
            max_accuracy_m: DEFAULT_MAX_ACCURACY_M,
            squared_weighting,
        }
    }

    pub fn elevation() -> Self {
        QualityPolicy::Elevation {
            max_accuracy_m: DEFAULT_MAX_ACCURACY_M,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            QualityPolicy::Position { .. } => "position",
            QualityPolicy::Elevation { .. } => "elevation",
        }
    }

    pub fn max_accuracy_m(&self) -> f64 {
        match *self {
            QualityPolicy::Position { max_accuracy_m, .. }
            | QualityPolicy::Elevation { max_accuracy_m } => max_accuracy_m,
        }
    }

    /// The accuracy field this policy judges a sample by.
    #[inline]
    pub fn accuracy(&self, sample: &Sample) -> Option<f64> {
        match self {
            QualityPolicy::Position { .. } => sample.horizontal_accuracy(),
            QualityPolicy::Elevation { .. } => sample.vertical_accuracy(),
        }
    }

    #[inline]
    pub fn is_valid(&self, sample: &Sample) -> bool {
        self.accuracy(sample)
            .is_some_and(|a| a <= self.max_accuracy_m())
    }

    /// Weight of a valid sample inside its bucket.
    ///
    /// A reported accuracy of exactly 0 means "unknown" and is weighted like
    /// the worst accepted accuracy so it can never dominate a bucket.
    #[inline]
    pub fn weight(&self, sample: &Sample) -> f64 {
        let max = self.max_accuracy_m();
        let acc = match self.accuracy(sample) {
            Some(a) if a > 0.0 => a,
            _ => max,
        };
        match self {
            QualityPolicy::Position {
                squared_weighting: true,
                ..
            } => 1.0 / (acc * acc),
            _ => 1.0 / acc,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn sample(h: Option<f64>, v: Option<f64>) -> Sample {
        Sample::builder("gps", 0)
            .horizontal_accuracy(h)
            .vertical_accuracy(v)
            .build()
            .unwrap()
    }

    #[rstest]
    #[case(Some(3.0), true)]
    #[case(Some(5.0), true)]
    #[case(Some(5.01), false)]
    #[case(None, false)]
    fn position_validity(#[case] h: Option<f64>, #[case] valid: bool) {
        let p = QualityPolicy::position(false);
        assert_eq!(p.is_valid(&sample(h, Some(1.0))), valid);
    }

    #[rstest]
    #[case(Some(4.0), true)]
    #[case(Some(9.0), false)]
    #[case(None, false)]
    fn elevation_validity_ignores_horizontal(#[case] v: Option<f64>, #[case] valid: bool) {
        let p = QualityPolicy::elevation();
        assert_eq!(p.is_valid(&sample(Some(1.0), v)), valid);
    }

    #[test]
    fn weights_follow_accuracy() {
        let s = sample(Some(2.0), Some(4.0));
        assert_eq!(QualityPolicy::position(false).weight(&s), 0.5);
        assert_eq!(QualityPolicy::position(true).weight(&s), 0.25);
        assert_eq!(QualityPolicy::elevation().weight(&s), 0.25);
    }

    #[test]
    fn zero_accuracy_gets_lowest_weight() {
        let s = sample(Some(0.0), None);
        let p = QualityPolicy::position(false);
        assert!(p.is_valid(&s));
        assert_eq!(p.weight(&s), 1.0 / DEFAULT_MAX_ACCURACY_M);
    }
}
