//! Shared error types for the curation agent

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SharedError {
    #[error("Deserialization failed: {message}")]
    DeserializationError { message: String },

    #[error("Invalid configuration: {field} = {value}")]
    InvalidConfig { field: String, value: String },
}

pub type SharedResult<T> = Result<T, SharedError>;
