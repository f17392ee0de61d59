//! Error types for dashboard API operations.
//!
//! Every client operation returns [`Result`]; the `Err` side is the failure
//! variant of an operation and always carries a human-readable message that
//! can be shown to the user as-is via [`Error::message`].

use serde::Serialize;
use thiserror::Error;

use crate::normalize::ListShape;

/// Message used when a failure carries no structured server message.
pub const DEFAULT_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

/// Main error type for dashboard API operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The request never produced a response (unreachable host, DNS, timeout).
    #[error("Transport failure: {detail}")]
    Transport {
        /// User-facing message
        message: String,
        /// Underlying transport error text
        detail: String,
        /// Whether the request timed out
        timed_out: bool,
        /// Whether the connection could not be established
        connect: bool,
    },

    /// The server answered with a non-success status.
    #[error("Server error ({status}): {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Message extracted from the error body
        message: String,
    },

    /// A list endpoint returned something other than a sequence (strict mode only).
    #[error("Expected a list from {endpoint}, got {shape}")]
    ShapeMismatch {
        /// Endpoint that was queried
        endpoint: String,
        /// Shape that was actually received
        shape: ListShape,
    },

    /// Endpoint or base URL could not be turned into a request URL
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// The request could not be assembled (e.g. an invalid header value)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A file attachment could not be read
    #[error("Attachment error: {0}")]
    Attachment(String),
}

/// Specialized result type for dashboard API operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Structured error response for serialization.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// HTTP status, when the failure came from the server
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl Error {
    /// Builds a transport failure carrying the default message.
    #[must_use]
    pub fn transport(detail: impl Into<String>, timed_out: bool, connect: bool) -> Self {
        Self::Transport {
            message: DEFAULT_ERROR_MESSAGE.to_string(),
            detail: detail.into(),
            timed_out,
            connect,
        }
    }

    /// Returns the message intended for the user.
    ///
    /// For server failures this is the `message` field of the error body when
    /// one was present; everything else yields [`DEFAULT_ERROR_MESSAGE`]. The
    /// diagnostic detail stays in the `Display` output.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Transport { message, .. } | Self::Server { message, .. } => message.as_str(),
            Self::ShapeMismatch { .. }
            | Self::InvalidEndpoint(_)
            | Self::InvalidRequest(_)
            | Self::ConfigError(_)
            | Self::Attachment(_) => DEFAULT_ERROR_MESSAGE,
        }
    }

    /// Returns the diagnostic text behind the user-facing message.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::Transport { detail, .. } => detail.clone(),
            Self::InvalidEndpoint(detail)
            | Self::InvalidRequest(detail)
            | Self::ConfigError(detail)
            | Self::Attachment(detail) => detail.clone(),
            Self::Server { .. } | Self::ShapeMismatch { .. } => self.to_string(),
        }
    }

    /// Returns the error code for this error type.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Transport {
                timed_out: true, ..
            } => "TIMEOUT",
            Self::Transport { .. } => "TRANSPORT_FAILURE",
            Self::Server { .. } => "SERVER_FAILURE",
            Self::ShapeMismatch { .. } => "SHAPE_MISMATCH",
            Self::InvalidEndpoint(_) => "INVALID_ENDPOINT",
            Self::InvalidRequest(_) => "INVALID_REQUEST",
            Self::ConfigError(_) => "CONFIG_ERROR",
            Self::Attachment(_) => "ATTACHMENT_ERROR",
        }
    }

    /// Returns the HTTP status for server failures.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns true when repeating the request might succeed.
    ///
    /// The client never retries on its own; this is advisory for callers.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { .. } => true,
            Self::Server { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Converts the error into an `ErrorResponse`.
    #[must_use]
    pub fn into_error_response(self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.message().to_string(),
            status: self.status(),
        }
    }
}

// Conversions from external error types
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::Server {
                status: status.as_u16(),
                message: DEFAULT_ERROR_MESSAGE.to_string(),
            };
        }
        let detail = error_chain(&err);
        if err.is_builder() {
            return Self::InvalidRequest(detail);
        }
        Self::transport(detail, err.is_timeout(), err.is_connect())
    }
}

/// Joins an error with its sources, since reqwest keeps the cause out of `Display`.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidEndpoint(err.to_string())
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::ConfigError(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Attachment(err.to_string())
    }
}
