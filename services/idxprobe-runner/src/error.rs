use idxprobe_core::CoreError;
use thiserror::Error;

/// Error type for the runner service.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// Configuration could not be loaded or failed validation.
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// The HTTP client could not be constructed.
    #[error("http client error: {0}")]
    Client(#[from] reqwest::Error),

    /// Engine-level failure.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// I/O error while writing runner artifacts.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenient result alias for runner operations.
pub type RunnerResult<T> = Result<T, RunnerError>;
