// src/error.rs
use thiserror::Error;

/// Errors raised while building the emitter or running the demo server.
///
/// Per-point emission failures are [`SendError`]s and never reach the
/// request path; see [`crate::metrics::WavefrontEmitter`].
#[derive(Error, Debug)]
pub enum AppError {
    #[error("error creating sender: {0}")]
    SenderCreation(#[source] SendError),

    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    #[error("Configuration parse error: {message}")]
    ConfigParse { message: String, line: Option<usize> },

    #[error("Configuration validation failed: {message}")]
    ConfigValidation {
        message: String,
        field: Option<String>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Server error: {0}")]
    Server(String),
}

impl AppError {
    pub fn config_validation(message: impl Into<String>, field: Option<impl Into<String>>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
            field: field.map(Into::into),
        }
    }
}

/// Errors returned by a [`crate::sender::MetricsSender`].
#[derive(Error, Debug)]
pub enum SendError {
    #[error("invalid server URL '{url}': {reason}")]
    InvalidServer { url: String, reason: String },

    #[error("API token is empty")]
    MissingToken,

    #[error("no Tokio runtime available to run the flush task")]
    NoRuntime,

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("invalid point: {0}")]
    InvalidPoint(String),

    #[error("buffer full ({capacity} points), point dropped")]
    BufferFull { capacity: usize },

    #[error("failed to reach ingestion endpoint: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("ingestion endpoint rejected batch with status {status}")]
    Rejected { status: u16 },

    #[error("sender is closed")]
    Closed,
}

/// A specialized `Result` type for the crate.
pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sender_creation_uses_fixed_template() {
        let err = AppError::SenderCreation(SendError::MissingToken);
        assert_eq!(err.to_string(), "error creating sender: API token is empty");
    }

    #[test]
    fn sender_creation_keeps_cause() {
        use std::error::Error as _;

        let err = AppError::SenderCreation(SendError::InvalidServer {
            url: "nope".into(),
            reason: "relative URL without a base".into(),
        });
        let source = err.source().expect("cause should be preserved");
        assert!(source.to_string().contains("nope"));
    }
}
