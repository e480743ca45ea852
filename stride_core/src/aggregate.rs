//! Fixed-window smoothing of the raw sample log.
//!
//! Samples newer than a lower bound and accepted by a [`QualityPolicy`] are
//! grouped into buckets keyed by `round(timestamp / width)`. Each bucket is
//! reduced to one synthetic sample:
//!
//! - numeric fields are the policy-weighted mean of the bucket's samples
//! - accuracy fields average only the samples that carry them
//! - the timestamp is the lower median of the bucket's timestamps
//!
//! Output is ordered by bucket index, hence strictly by time. The aggregator
//! holds only its bucket width and never mutates its input.
use std::collections::BTreeMap;

use crate::policy::QualityPolicy;
use crate::sample::Sample;

/// Default bucket width in milliseconds.
pub const BUCKET_WIDTH_MS: i64 = 2500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowAggregator {
    bucket_width_ms: i64,
}

impl Default for WindowAggregator {
    fn default() -> Self {
        Self {
            bucket_width_ms: BUCKET_WIDTH_MS,
        }
    }
}

impl WindowAggregator {
    /// Widths below 1 ms are raised to 1 ms.
    pub fn new(bucket_width_ms: i64) -> Self {
        debug_assert!(bucket_width_ms > 0, "bucket_width_ms must be > 0");
        Self {
            bucket_width_ms: bucket_width_ms.max(1),
        }
    }

    pub fn bucket_width_ms(&self) -> i64 {
        self.bucket_width_ms
    }

    /// `round(timestamp / width)` with halves rounded up, in integer arithmetic.
    #[inline]
    pub fn bucket_index(&self, timestamp_ms: i64) -> i64 {
        let w = self.bucket_width_ms;
        (2 * timestamp_ms + w).div_euclid(2 * w)
    }

    pub fn aggregate(
        &self,
        samples: &[Sample],
        policy: &QualityPolicy,
        since_ms: i64,
    ) -> Vec<Sample> {
        let mut buckets: BTreeMap<i64, Vec<&Sample>> = BTreeMap::new();
        for s in samples
            .iter()
            .filter(|s| s.timestamp_ms() >= since_ms && policy.is_valid(s))
        {
            buckets
                .entry(self.bucket_index(s.timestamp_ms()))
                .or_default()
                .push(s);
        }

        let out: Vec<Sample> = buckets
            .into_iter()
            .map(|(idx, bucket)| {
                tracing::trace!(
                    policy = policy.name(),
                    bucket = idx,
                    samples = bucket.len(),
                    "reduce bucket"
                );
                reduce_bucket(&bucket, policy)
            })
            .collect();

        tracing::debug!(
            policy = policy.name(),
            since_ms,
            input = samples.len(),
            buckets = out.len(),
            "aggregated samples"
        );
        out
    }
}

/// Running weighted mean.
#[derive(Debug, Default, Clone, Copy)]
struct WeightedMean {
    sum: f64,
    weight: f64,
}

impl WeightedMean {
    #[inline]
    fn add(&mut self, value: f64, weight: f64) {
        self.sum += value * weight;
        self.weight += weight;
    }

    #[inline]
    fn add_opt(&mut self, value: Option<f64>, weight: f64) {
        if let Some(v) = value {
            self.add(v, weight);
        }
    }

    #[inline]
    fn mean(&self) -> Option<f64> {
        if self.weight > 0.0 {
            Some(self.sum / self.weight)
        } else {
            None
        }
    }
}

fn reduce_bucket(bucket: &[&Sample], policy: &QualityPolicy) -> Sample {
    // A lone sample keeps its exact values; the weights would cancel anyway.
    if let [only] = bucket {
        return only.to_synthetic();
    }

    let mut lat = WeightedMean::default();
    let mut lon = WeightedMean::default();
    let mut alt = WeightedMean::default();
    let mut speed = WeightedMean::default();
    let mut h_acc = WeightedMean::default();
    let mut v_acc = WeightedMean::default();
    let mut s_acc = WeightedMean::default();

    for s in bucket {
        let w = policy.weight(s);
        lat.add(s.latitude(), w);
        lon.add(s.longitude(), w);
        alt.add(s.altitude(), w);
        speed.add(s.speed(), w);
        h_acc.add_opt(s.horizontal_accuracy(), w);
        v_acc.add_opt(s.vertical_accuracy(), w);
        s_acc.add_opt(s.speed_accuracy(), w);
    }

    Sample::synthetic(
        median_timestamp(bucket),
        lat.mean().unwrap_or_default(),
        lon.mean().unwrap_or_default(),
        alt.mean().unwrap_or_default(),
        speed.mean().unwrap_or_default(),
        h_acc.mean(),
        v_acc.mean(),
        s_acc.mean(),
    )
}

/// Lower median of the bucket's timestamps; no interpolation.
fn median_timestamp(bucket: &[&Sample]) -> i64 {
    let mut ts: Vec<i64> = bucket.iter().map(|s| s.timestamp_ms()).collect();
    ts.sort_unstable();
    ts.get((ts.len().saturating_sub(1)) / 2)
        .copied()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn fix(ts: i64, lat: f64, acc: f64) -> Sample {
        Sample::builder("gps", ts)
            .position(lat, 0.0)
            .horizontal_accuracy(acc)
            .build()
            .unwrap()
    }

    #[rstest]
    #[case(0, 0)]
    #[case(1249, 0)]
    #[case(1250, 1)]
    #[case(2000, 1)]
    #[case(3749, 1)]
    #[case(3750, 2)]
    fn bucket_index_rounds_half_up(#[case] ts: i64, #[case] idx: i64) {
        assert_eq!(WindowAggregator::default().bucket_index(ts), idx);
    }

    #[test]
    fn odd_width_matches_float_rounding() {
        let agg = WindowAggregator::new(3);
        for ts in 0..50 {
            let expected = ((ts as f64) / 3.0 + 0.5).floor() as i64;
            assert_eq!(agg.bucket_index(ts), expected, "ts={ts}");
        }
    }

    #[test]
    fn median_takes_lower_middle_on_even_counts() {
        let a = fix(400, 0.0, 1.0);
        let b = fix(100, 0.0, 1.0);
        let c = fix(300, 0.0, 1.0);
        let d = fix(200, 0.0, 1.0);
        assert_eq!(median_timestamp(&[&a, &b, &c, &d]), 200);
        assert_eq!(median_timestamp(&[&a, &b, &c]), 300);
    }

    #[test]
    fn speed_is_weighted_mean_of_whole_bucket() {
        let a = Sample::builder("gps", 0)
            .speed(2.0)
            .horizontal_accuracy(1.0)
            .build()
            .unwrap();
        let b = Sample::builder("gps", 100)
            .speed(4.0)
            .horizontal_accuracy(1.0)
            .build()
            .unwrap();
        let out = WindowAggregator::default().aggregate(
            &[a, b],
            &QualityPolicy::position(false),
            0,
        );
        assert_eq!(out.len(), 1);
        assert!((out[0].speed() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn accuracy_means_skip_absent_fields() {
        let a = Sample::builder("gps", 0)
            .horizontal_accuracy(2.0)
            .vertical_accuracy(3.0)
            .build()
            .unwrap();
        let b = Sample::builder("fused", 10)
            .horizontal_accuracy(2.0)
            .build()
            .unwrap();
        let out = WindowAggregator::default().aggregate(
            &[a, b],
            &QualityPolicy::position(false),
            0,
        );
        assert_eq!(out[0].vertical_accuracy(), Some(3.0));
        assert_eq!(out[0].speed_accuracy(), None);
        assert_eq!(out[0].horizontal_accuracy(), Some(2.0));
    }

    #[test]
    fn since_bound_is_inclusive() {
        let s = vec![fix(999, 0.0, 1.0), fix(1000, 0.0, 1.0)];
        let out = WindowAggregator::default().aggregate(&s, &QualityPolicy::position(false), 1000);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].timestamp_ms(), 1000);
    }
}
