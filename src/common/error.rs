//! Error types for the engine.

use thiserror::Error;

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {message}")]
    ParseError { message: String },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

/// The external placeholder expander could not resolve a template.
#[derive(Debug, Error)]
#[error("Placeholder expansion failed for {user}: {message}")]
pub struct ExpansionError {
    pub user: String,
    pub message: String,
}

impl ExpansionError {
    pub fn new(user: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            message: message.into(),
        }
    }
}

/// A single recipient's sink rejected a message.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Recipient '{recipient}' is no longer connected")]
    Disconnected { recipient: String },

    #[error("Recipient '{recipient}' rejected the message: {message}")]
    Rejected { recipient: String, message: String },
}

/// Errors surfaced by `MessageService` operations.
///
/// Missing templates and delivery failures never show up here; they are
/// handled inside the pipeline.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Expansion error: {0}")]
    Expansion(#[from] ExpansionError),
}

/// Result type alias for configuration loading.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for service operations.
pub type ServiceResult<T = ()> = std::result::Result<T, ServiceError>;
