//! Error types for notebook processing.

use std::path::PathBuf;

/// Result type for notebook operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading, transforming, or writing notebooks.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Failed to read a notebook file.
    #[error("Failed to read file {path}: {message}")]
    ReadError { path: PathBuf, message: String },

    /// Failed to write an output file.
    #[error("Failed to write file {path}: {message}")]
    WriteError { path: PathBuf, message: String },

    /// Failed to serialize/deserialize notebook JSON.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to decode a base64 image payload.
    #[error("Image decode error: {0}")]
    ImageDecodeError(#[from] base64::DecodeError),

    /// Invalid notebook structure.
    #[error("Invalid notebook: {0}")]
    InvalidNotebook(String),
}
