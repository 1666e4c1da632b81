//! Curator-specific error types

use shared::SharedError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CuratorError {
    #[error("Fetch from {source_name} failed: {message}")]
    FetchError { source_name: String, message: String },

    #[error("Translation failed: {message}")]
    TranslationError { message: String },

    #[error("Publish failed: {message}")]
    PublishError { message: String },

    #[error("Mirror of post {post_id} failed: {message}")]
    MirrorError { post_id: String, message: String },

    #[error("State persistence failed: {operation} - {message}")]
    PersistError { operation: String, message: String },

    #[error("Session rejected during {operation}: {message}")]
    Unauthorized { operation: String, message: String },

    #[error("Session setup failed: {message}")]
    SessionError { message: String },

    #[error("Configuration error: {field} - {message}")]
    ConfigurationError { field: String, message: String },

    #[error("Shared component error: {0}")]
    SharedError(#[from] SharedError),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl CuratorError {
    pub fn fetch(source_name: &str, message: impl Into<String>) -> Self {
        Self::FetchError {
            source_name: source_name.to_string(),
            message: message.into(),
        }
    }

    pub fn translation(message: impl Into<String>) -> Self {
        Self::TranslationError {
            message: message.into(),
        }
    }

    pub fn publish(message: impl Into<String>) -> Self {
        Self::PublishError {
            message: message.into(),
        }
    }

    pub fn mirror(post_id: &str, message: impl Into<String>) -> Self {
        Self::MirrorError {
            post_id: post_id.to_string(),
            message: message.into(),
        }
    }

    pub fn persist(operation: &str, message: impl Into<String>) -> Self {
        Self::PersistError {
            operation: operation.to_string(),
            message: message.into(),
        }
    }

    pub fn unauthorized(operation: &str, message: impl Into<String>) -> Self {
        Self::Unauthorized {
            operation: operation.to_string(),
            message: message.into(),
        }
    }

    pub fn config(field: &str, message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Whether the platform rejected the session's credentials
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }
}

pub type CuratorResult<T> = Result<T, CuratorError>;
