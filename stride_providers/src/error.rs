use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("location provider timeout")]
    Timeout,
    #[error("location provider closed")]
    Closed,
    #[error("malformed fix: {0}")]
    Malformed(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ProviderError>;
