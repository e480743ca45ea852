pub mod clock;

pub use clock::{Clock, ManualClock, SystemClock};

/// Error type used at the provider trait boundary.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// One location observation as delivered by a provider, before validation.
///
/// Accuracy fields are `None` when the provider omitted them.
#[derive(Debug, Clone, PartialEq)]
pub struct RawFix {
    pub source: String,
    /// Capture time in milliseconds since the UNIX epoch.
    pub captured_ms: i64,
    pub latitude: f64,
    pub longitude: f64,
    /// Meters.
    pub altitude: f64,
    /// Meters per second; 0 when unknown.
    pub speed: f64,
    pub horizontal_accuracy: Option<f64>,
    pub vertical_accuracy: Option<f64>,
    pub speed_accuracy: Option<f64>,
}

pub trait LocationProvider {
    /// Block until the next fix is available or `timeout` expires.
    ///
    /// `Ok(None)` means the provider is exhausted and will produce nothing more.
    /// A timeout is reported as an error whose message contains "timeout".
    fn next_fix(&mut self, timeout: std::time::Duration) -> Result<Option<RawFix>, BoxError>;

    /// Short provider name used in logs.
    fn name(&self) -> &str;
}
