use thiserror::Error;

/// Canonical error type for engine operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Input data failed validation.
    #[error("validation error: {0}")]
    Validation(String),

    /// The metrics registry could not be constructed or updated.
    #[error("metrics error: {0}")]
    Metrics(String),

    /// A report could not be rendered or exported.
    #[error("report error: {0}")]
    Report(String),

    /// I/O error occurred while writing report artifacts.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Creates a `Validation` variant.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a `Metrics` variant.
    #[must_use]
    pub fn metrics(message: impl Into<String>) -> Self {
        Self::Metrics(message.into())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Report(err.to_string())
    }
}

/// Convenient result alias for engine operations.
pub type CoreResult<T> = Result<T, CoreError>;
