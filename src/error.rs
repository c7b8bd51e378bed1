//! Error handling module for fleetswitch
//!
//! This module defines the error types used throughout the site behavior
//! layer, providing a unified error handling strategy and the mapping from
//! each error to the notification a visitor sees.

use thiserror::Error;

/// Result type alias for fleetswitch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for fleetswitch
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation errors for visitor input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Rate limiting errors
    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    /// Failures of the (simulated) submission transport
    #[error("Transport error: {0}")]
    Transport(String),

    /// Page content could not be generated
    #[error("Content error: {0}")]
    Content(String),

    /// The render surface rejected an update
    #[error("Render error: {0}")]
    Render(String),

    /// An action was addressed to a coordinator that is not mounted
    #[error("No {0} is mounted")]
    NotMounted(&'static str),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    /// Create a validation error
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        Error::Validation(msg.into())
    }

    /// Create a rate limit error
    pub fn rate_limit<S: Into<String>>(msg: S) -> Self {
        Error::RateLimit(msg.into())
    }

    /// Create a transport error
    pub fn transport<S: Into<String>>(msg: S) -> Self {
        Error::Transport(msg.into())
    }

    /// Create a content error
    pub fn content<S: Into<String>>(msg: S) -> Self {
        Error::Content(msg.into())
    }

    /// Create a render error
    pub fn render<S: Into<String>>(msg: S) -> Self {
        Error::Render(msg.into())
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Error::Internal(msg.into())
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Transport(_) | Error::RateLimit(_))
    }

    /// Text shown to the visitor when this error ends a user action
    pub fn user_message(&self) -> &'static str {
        match self {
            Error::Validation(_) => "Please correct the highlighted fields and try again.",
            Error::RateLimit(_) => "Too many attempts. Please wait a minute before trying again.",
            Error::Transport(_) => {
                "Sorry, we couldn't send your message. Please try again in a moment."
            },
            Error::NotMounted(_) => "This action isn't available on the current page.",
            Error::Config(_)
            | Error::Content(_)
            | Error::Render(_)
            | Error::Serialization(_)
            | Error::Io(_)
            | Error::Internal(_) => "Something went wrong. Please refresh the page.",
        }
    }

    /// Get a string representation of the error type
    pub fn error_type(&self) -> &'static str {
        match self {
            Error::Config(_) => "configuration_error",
            Error::Validation(_) => "validation_error",
            Error::RateLimit(_) => "rate_limit",
            Error::Transport(_) => "transport_error",
            Error::Content(_) => "content_error",
            Error::Render(_) => "render_error",
            Error::NotMounted(_) => "not_mounted",
            Error::Serialization(_) => "serialization_error",
            Error::Io(_) => "io_error",
            Error::Internal(_) => "internal_error",
        }
    }
}

/// Convert from envconfig::Error to our Error type
impl From<envconfig::Error> for Error {
    fn from(err: envconfig::Error) -> Self {
        Error::Config(err.to_string())
    }
}
