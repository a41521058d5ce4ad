use thiserror::Error;

/// Crate-wide error type for the asynchronous refinement adapters and configuration.
///
/// The synchronous analysis engine never produces one of these: invalid input maps to a
/// canned default result instead.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AppError {
    /// Transport-level failures (connection refused, TLS, non-success status).
    #[error("HTTP error: {0}")]
    Http(String),

    /// An external call did not complete in time.
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// The remote answered, but the payload could not be understood.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Configuration problems (missing or malformed environment variables).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation errors.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The caller abandoned the analysis before refinement finished.
    #[error("Cancelled")]
    Cancelled,
}

impl From<tokio::time::error::Elapsed> for AppError {
    fn from(err: tokio::time::error::Elapsed) -> Self {
        AppError::Timeout(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidResponse(format!("JSON error: {}", err))
    }
}

impl From<url::ParseError> for AppError {
    fn from(err: url::ParseError) -> Self {
        AppError::Config(format!("URL parse error: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Config(format!("Validation errors: {}", err))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::Timeout(err.to_string())
        } else if err.is_decode() {
            AppError::InvalidResponse(err.to_string())
        } else {
            AppError::Http(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
