use thiserror::Error;

/// Why a location observation was refused at construction time.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SampleError {
    #[error("timestamp must be >= 0, got {0}")]
    NegativeTimestamp(i64),
    #[error("{field} must be >= 0, got {value}")]
    NegativeAccuracy { field: &'static str, value: f64 },
    #[error("{field} must be finite")]
    NonFinite { field: &'static str },
    #[error("{field} out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },
}

#[derive(Debug, Error, Clone)]
pub enum StrideError {
    #[error("invalid sample: {0}")]
    Sample(#[from] SampleError),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("invalid state: {0}")]
    State(String),
    #[error("provider error: {0}")]
    Provider(String),
    #[error("location provider closed")]
    ProviderClosed,
    #[error("timeout waiting for location provider")]
    Timeout,
    #[error("io error: {0}")]
    Io(String),
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

impl From<BuildError> for StrideError {
    fn from(e: BuildError) -> Self {
        StrideError::Config(e.to_string())
    }
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
