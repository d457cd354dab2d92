//! Error types for IGA synchronization.

use thiserror::Error;

/// Result type alias using `IgaError`.
pub type IgaResult<T> = Result<T, IgaError>;

/// Errors that can occur when synchronizing from an IGA platform.
#[derive(Debug, Error)]
pub enum IgaError {
    /// Configuration resolution or validation error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The platform answered with a non-success, non-429 status.
    #[error("API request failed with status {status}: {message}")]
    Http { status: u16, message: String },

    /// Request timed out after exhausting the retry budget.
    #[error("Request to {url} timed out after {attempts} attempts")]
    Timeout { url: String, attempts: u32 },

    /// Connection-level failure after exhausting the retry budget.
    #[error("Connection to {url} failed after {attempts} attempts: {message}")]
    Connection {
        url: String,
        attempts: u32,
        message: String,
    },

    /// Consecutive 429 responses exceeded the rate-limit retry cap.
    #[error("Rate limited {attempts} consecutive times, giving up")]
    RateLimitExceeded { attempts: u32 },

    /// A single user record could not be normalized.
    #[error("Invalid user record: {0}")]
    InvalidRecord(String),

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Request(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// File I/O error during export.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
