//! Error types for mc-core

use thiserror::Error;

/// Main error type for mc-core
#[derive(Error, Debug)]
pub enum Error {
    #[error("Ollama API error: {0}")]
    Ollama(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Prompt template error: {0}")]
    Template(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for mc-core
pub type Result<T> = std::result::Result<T, Error>;
