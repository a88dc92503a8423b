//! Jarvis Error Types
//!
//! Centralized error handling for the assistant front end.

use thiserror::Error;

/// Central error type for Jarvis
#[derive(Error, Debug)]
pub enum JarvisError {
    #[error("Transcription error: {0}")]
    Transcription(String),

    #[error("Translation error: {0}")]
    Translation(String),

    #[error("Speech output error: {0}")]
    Speech(String),

    #[error("Browser launch error: {0}")]
    Browser(String),

    #[error("Audio capture error: {0}")]
    Audio(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for Jarvis operations
pub type JarvisResult<T> = Result<T, JarvisError>;
