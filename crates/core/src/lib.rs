//! Shared primitives for all Rust crates in autoerase.

#![forbid(unsafe_code)]

use thiserror::Error;

/// Result type used across autoerase crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated non-empty UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid configuration or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Network or connection failure while talking to the homeserver.
    #[error("transport error: {0}")]
    Transport(String),

    /// Response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// Homeserver answered an administrative call with a non-success status.
    #[error("server returned status {status}: {body}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Response body kept for diagnostics.
        body: String,
    },

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}
