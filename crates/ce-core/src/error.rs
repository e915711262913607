//! Error types for Contour

use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum ContourError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid parameter: {0}")]
    InvalidParam(String),
}

/// Result type alias
pub type ContourResult<T> = Result<T, ContourError>;
