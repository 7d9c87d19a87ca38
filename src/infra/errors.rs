// src/infra/errors.rs — Error types for Scribe

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScribeError {
    // Model backend
    #[error("Ollama error: {message}")]
    Provider { message: String },

    #[error("No compatible Ollama models found. Please ensure Ollama is running and has models installed.")]
    NoModels,

    // Inputs on disk
    #[error("Prompt catalog error: {0}")]
    Catalog(String),

    #[error("Session log '{}' is incompatible or corrupted: {reason}", .path.display())]
    InvalidSessionLog { path: PathBuf, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    // Infra
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ScribeError {
    pub fn provider(message: impl Into<String>) -> Self {
        ScribeError::Provider {
            message: message.into(),
        }
    }

    pub fn invalid_log(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        ScribeError::InvalidSessionLog {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
