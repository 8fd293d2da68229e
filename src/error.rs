//! Custom error types for moviemate.
//!
//! Every fallible operation in the crate returns [`AppError`]. Views turn
//! these into user-facing notices via [`AppError::user_message`].

use std::error::Error;
use std::fmt;
use std::io;

/// Application error types.
#[derive(Debug)]
pub enum AppError {
    /// The request never reached the server (connect, timeout, TLS)
    Network(String),
    /// The server answered with a non-2xx status
    Http { status: u16, message: String },
    /// API response parsing errors
    Parse(String),
    /// Configuration errors
    Config(String),
    /// File I/O errors
    Io(io::Error),
    /// No results found
    NotFound(String),
    /// Invalid input from user
    InvalidInput(String),
    /// The same action is already in flight
    Busy(String),
}

impl AppError {
    /// Whether repeating the same request could succeed.
    ///
    /// Transport failures, server errors and rate limiting are transient;
    /// other 4xx responses and local validation failures are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::Network(_) => true,
            AppError::Http { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Short message suitable for a transient notification.
    pub fn user_message(&self) -> String {
        match self {
            AppError::InvalidInput(msg) => msg.clone(),
            AppError::Busy(_) => "Still working on the previous request".to_string(),
            AppError::NotFound(_) | AppError::Http { status: 404, .. } => {
                "Content not found".to_string()
            }
            err if err.is_retryable() => "Something went wrong. Please try again.".to_string(),
            _ => "Request was rejected. Please check all fields.".to_string(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Network(msg) => write!(f, "Network error: {}", msg),
            AppError::Http { status, message } => {
                write!(f, "HTTP error {}: {}", status, message)
            }
            AppError::Parse(msg) => write!(f, "Parse error: {}", msg),
            AppError::Config(msg) => write!(f, "Config error: {}", msg),
            AppError::Io(err) => write!(f, "I/O error: {}", err),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            AppError::Busy(msg) => write!(f, "Busy: {}", msg),
        }
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AppError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Io(err)
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => AppError::Http {
                status: status.as_u16(),
                message: err.to_string(),
            },
            None if err.is_decode() => AppError::Parse(err.to_string()),
            None => AppError::Network(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Parse(err.to_string())
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for AppError {
    fn from(err: toml::ser::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

/// Result type alias using AppError.
pub type Result<T> = std::result::Result<T, AppError>;
