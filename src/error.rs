//! Error types for the framework.

use thiserror::Error;

/// Main error type for framework operations.
#[derive(Debug, Error)]
pub enum RetraceError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{0} is not implemented")]
    NotImplemented(&'static str),

    #[error("template not found: {0}")]
    TemplateNotFound(String),

    #[error("render failed: {0}")]
    Render(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for RetraceError {
    fn from(e: serde_json::Error) -> Self {
        RetraceError::Serialization(e.to_string())
    }
}

/// Errors delivered through HTTP request callbacks. These are never returned
/// from the request methods themselves; the callback receives them as the
/// `Err` arm of its `Result` argument.
#[derive(Clone, Debug, Error)]
pub enum HttpError {
    #[error("failed to contact remote server: {0}")]
    Transport(String),

    #[error("request failed with status {status}: {body}")]
    Status { status: u16, body: String },
}

/// Result type for framework operations.
pub type Result<T> = std::result::Result<T, RetraceError>;
