//! Normalized location observations.
//!
//! A `Sample` can only be obtained through [`SampleBuilder::build`] (or the
//! `TryFrom` conversions that call it), so every sample held by the engine
//! satisfies the invariants below:
//!
//! - `timestamp_ms >= 0`
//! - latitude in [-90, 90], longitude in [-180, 180], altitude and speed finite
//! - accuracy fields, when present, are finite and >= 0
//!
//! Samples are immutable once built. The aggregator produces synthetic samples
//! of the same shape whose source is [`AVERAGE_SOURCE`].
use std::sync::Arc;

use crate::error::SampleError;

/// Source tag of every sample produced by bucket averaging.
pub const AVERAGE_SOURCE: &str = "average";

#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    source: Arc<str>,
    timestamp_ms: i64,
    latitude: f64,
    longitude: f64,
    altitude: f64,
    speed: f64,
    horizontal_accuracy: Option<f64>,
    vertical_accuracy: Option<f64>,
    speed_accuracy: Option<f64>,
}

impl Sample {
    /// Start building a sample captured by `source` at `timestamp_ms`.
    pub fn builder(source: impl Into<Arc<str>>, timestamp_ms: i64) -> SampleBuilder {
        SampleBuilder::new(source, timestamp_ms)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Capture time, epoch milliseconds.
    pub fn timestamp_ms(&self) -> i64 {
        self.timestamp_ms
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Meters.
    pub fn altitude(&self) -> f64 {
        self.altitude
    }

    /// Meters per second as reported by the provider.
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Meters; `None` when the provider omitted it.
    pub fn horizontal_accuracy(&self) -> Option<f64> {
        self.horizontal_accuracy
    }

    /// Meters; `None` when the provider omitted it.
    pub fn vertical_accuracy(&self) -> Option<f64> {
        self.vertical_accuracy
    }

    /// Meters per second; `None` when the provider omitted it.
    pub fn speed_accuracy(&self) -> Option<f64> {
        self.speed_accuracy
    }

    /// True for samples produced by bucket averaging.
    pub fn is_synthetic(&self) -> bool {
        &*self.source == AVERAGE_SOURCE
    }

    /// Assemble an averaged sample. Inputs come from already-validated samples,
    /// so the invariants hold without re-checking.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn synthetic(
        timestamp_ms: i64,
        latitude: f64,
        longitude: f64,
        altitude: f64,
        speed: f64,
        horizontal_accuracy: Option<f64>,
        vertical_accuracy: Option<f64>,
        speed_accuracy: Option<f64>,
    ) -> Self {
        Self {
            source: Arc::from(AVERAGE_SOURCE),
            timestamp_ms,
            latitude,
            longitude,
            altitude,
            speed,
            horizontal_accuracy,
            vertical_accuracy,
            speed_accuracy,
        }
    }

    /// Same values under the averaging source tag.
    pub(crate) fn to_synthetic(&self) -> Self {
        Self {
            source: Arc::from(AVERAGE_SOURCE),
            ..self.clone()
        }
    }
}

/// Builder for [`Sample`]; all checks run in `build()`.
#[derive(Debug, Clone)]
pub struct SampleBuilder {
    source: Arc<str>,
    timestamp_ms: i64,
    latitude: f64,
    longitude: f64,
    altitude: f64,
    speed: f64,
    horizontal_accuracy: Option<f64>,
    vertical_accuracy: Option<f64>,
    speed_accuracy: Option<f64>,
}

impl SampleBuilder {
    pub fn new(source: impl Into<Arc<str>>, timestamp_ms: i64) -> Self {
        Self {
            source: source.into(),
            timestamp_ms,
            latitude: 0.0,
            longitude: 0.0,
            altitude: 0.0,
            speed: 0.0,
            horizontal_accuracy: None,
            vertical_accuracy: None,
            speed_accuracy: None,
        }
    }

    pub fn position(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = latitude;
        self.longitude = longitude;
        self
    }

    pub fn altitude(mut self, meters: f64) -> Self {
        self.altitude = meters;
        self
    }

    pub fn speed(mut self, mps: f64) -> Self {
        self.speed = mps;
        self
    }

    pub fn horizontal_accuracy(mut self, meters: impl Into<Option<f64>>) -> Self {
        self.horizontal_accuracy = meters.into();
        self
    }

    pub fn vertical_accuracy(mut self, meters: impl Into<Option<f64>>) -> Self {
        self.vertical_accuracy = meters.into();
        self
    }

    pub fn speed_accuracy(mut self, mps: impl Into<Option<f64>>) -> Self {
        self.speed_accuracy = mps.into();
        self
    }

    pub fn build(self) -> Result<Sample, SampleError> {
        if self.timestamp_ms < 0 {
            return Err(SampleError::NegativeTimestamp(self.timestamp_ms));
        }
        check_range("latitude", self.latitude, 90.0)?;
        check_range("longitude", self.longitude, 180.0)?;
        check_finite("altitude", self.altitude)?;
        check_finite("speed", self.speed)?;
        check_accuracy("horizontal_accuracy", self.horizontal_accuracy)?;
        check_accuracy("vertical_accuracy", self.vertical_accuracy)?;
        check_accuracy("speed_accuracy", self.speed_accuracy)?;

        Ok(Sample {
            source: self.source,
            timestamp_ms: self.timestamp_ms,
            latitude: self.latitude,
            longitude: self.longitude,
            altitude: self.altitude,
            speed: self.speed,
            horizontal_accuracy: self.horizontal_accuracy,
            vertical_accuracy: self.vertical_accuracy,
            speed_accuracy: self.speed_accuracy,
        })
    }
}

#[inline]
fn check_finite(field: &'static str, v: f64) -> Result<(), SampleError> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(SampleError::NonFinite { field })
    }
}

#[inline]
fn check_range(field: &'static str, v: f64, limit: f64) -> Result<(), SampleError> {
    check_finite(field, v)?;
    if (-limit..=limit).contains(&v) {
        Ok(())
    } else {
        Err(SampleError::OutOfRange { field, value: v })
    }
}

#[inline]
fn check_accuracy(field: &'static str, v: Option<f64>) -> Result<(), SampleError> {
    match v {
        None => Ok(()),
        Some(a) => {
            check_finite(field, a)?;
            if a < 0.0 {
                Err(SampleError::NegativeAccuracy { field, value: a })
            } else {
                Ok(())
            }
        }
    }
}

impl TryFrom<stride_traits::RawFix> for Sample {
    type Error = SampleError;

    fn try_from(fix: stride_traits::RawFix) -> Result<Self, Self::Error> {
        Sample::builder(fix.source, fix.captured_ms)
            .position(fix.latitude, fix.longitude)
            .altitude(fix.altitude)
            .speed(fix.speed)
            .horizontal_accuracy(fix.horizontal_accuracy)
            .vertical_accuracy(fix.vertical_accuracy)
            .speed_accuracy(fix.speed_accuracy)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_keeps_fields() {
        let s = Sample::builder("gps", 1_000)
            .position(-22.9, -43.2)
            .altitude(12.0)
            .speed(3.1)
            .horizontal_accuracy(2.5)
            .build()
            .unwrap();
        assert_eq!(s.source(), "gps");
        assert_eq!(s.timestamp_ms(), 1_000);
        assert_eq!(s.latitude(), -22.9);
        assert_eq!(s.horizontal_accuracy(), Some(2.5));
        assert_eq!(s.vertical_accuracy(), None);
        assert!(!s.is_synthetic());
    }

    #[test]
    fn rejects_negative_timestamp() {
        let err = Sample::builder("gps", -1).build().unwrap_err();
        assert_eq!(err, SampleError::NegativeTimestamp(-1));
    }

    #[test]
    fn rejects_negative_accuracy() {
        let err = Sample::builder("gps", 0)
            .vertical_accuracy(-0.5)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            SampleError::NegativeAccuracy {
                field: "vertical_accuracy",
                ..
            }
        ));
    }

    #[test]
    fn rejects_nan_and_out_of_range_coordinates() {
        assert!(matches!(
            Sample::builder("gps", 0).position(f64::NAN, 0.0).build(),
            Err(SampleError::NonFinite { field: "latitude" })
        ));
        assert!(matches!(
            Sample::builder("gps", 0).position(0.0, 181.0).build(),
            Err(SampleError::OutOfRange {
                field: "longitude",
                ..
            })
        ));
    }

    #[test]
    fn zero_accuracy_is_allowed() {
        let s = Sample::builder("gps", 0)
            .horizontal_accuracy(0.0)
            .build()
            .unwrap();
        assert_eq!(s.horizontal_accuracy(), Some(0.0));
    }
}
