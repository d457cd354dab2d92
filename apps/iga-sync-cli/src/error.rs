//! CLI error types and exit codes

use iga_sync::IgaError;
use thiserror::Error;

/// Exit codes for the CLI
/// - 0: Success
/// - 1: General error
/// - 2: Authentication error
/// - 3: Network error
/// - 4: Validation error
/// - 5: Server error
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Connection failed: {0}\n\nTroubleshooting:\n  - Check your internet connection\n  - Verify IGA_API_URL points at the API root\n  - Try again in a few moments")]
    ConnectionFailed(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("I/O error: {0}")]
    Io(String),
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::AuthenticationFailed(_) => 2,
            CliError::Network(_) | CliError::ConnectionFailed(_) => 3,
            CliError::Validation(_) => 4,
            CliError::Server(_) => 5,
            CliError::Api { status, .. } => {
                if *status >= 500 {
                    5
                } else if *status == 401 || *status == 403 {
                    2
                } else {
                    4
                }
            }
            CliError::Config(_) | CliError::Io(_) => 1,
        }
    }

    /// Print the error to stderr with appropriate formatting
    pub fn print(&self) {
        let use_color = std::env::var("NO_COLOR").is_err();

        if use_color {
            eprintln!("\x1b[31mError:\x1b[0m {}", self);
        } else {
            eprintln!("Error: {}", self);
        }

        if let Some(suggestion) = self.suggestion() {
            if use_color {
                eprintln!("\n\x1b[33mSuggestion:\x1b[0m {}", suggestion);
            } else {
                eprintln!("\nSuggestion: {}", suggestion);
            }
        }
    }

    /// Get a suggested action for this error
    fn suggestion(&self) -> Option<&'static str> {
        match self {
            CliError::AuthenticationFailed(_) => {
                Some("Check that IGA_API_KEY holds a valid API key.")
            }
            CliError::ConnectionFailed(_) => Some("Check your network connection and try again."),
            CliError::Config(_) => Some("Set IGA_API_URL and IGA_API_KEY, then retry."),
            _ => None,
        }
    }
}

impl From<IgaError> for CliError {
    fn from(e: IgaError) -> Self {
        match e {
            IgaError::Configuration(message) => CliError::Config(message),
            IgaError::Http { status, message } => match status {
                401 | 403 => {
                    CliError::AuthenticationFailed(format!("status {}: {}", status, message))
                }
                500.. => CliError::Server(format!("status {}: {}", status, message)),
                _ => CliError::Api { status, message },
            },
            IgaError::Timeout { .. } | IgaError::Connection { .. } => {
                CliError::ConnectionFailed(e.to_string())
            }
            IgaError::RateLimitExceeded { .. } => CliError::Server(e.to_string()),
            IgaError::Request(err) => CliError::from(err),
            IgaError::Json(err) => CliError::Config(format!("JSON error: {}", err)),
            IgaError::Url(err) => CliError::Config(format!("Invalid URL: {}", err)),
            IgaError::InvalidRecord(message) => CliError::Validation(message),
            IgaError::Io(err) => CliError::Io(err.to_string()),
        }
    }
}

impl From<reqwest::Error> for CliError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() {
            CliError::ConnectionFailed(e.to_string())
        } else if e.is_timeout() {
            CliError::Network("Request timed out".to_string())
        } else {
            CliError::Network(e.to_string())
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Config(format!("JSON error: {}", e))
    }
}
