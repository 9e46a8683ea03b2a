//! Configuration errors.

use super::error_code::{self, WallToWallErrorCode};

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    FileNotFound { path: String },

    #[error("Config parse error in {path}: {message}")]
    ParseError { path: String, message: String },

    #[error("Config validation failed for {field}: {message}")]
    ValidationFailed { field: String, message: String },

    #[error("Missing required config key: {key}")]
    MissingKey { key: String },

    #[error("Classifier {classifier}: ambiguous values column, candidates: {candidates:?}")]
    AmbiguousClassifierColumn {
        classifier: String,
        candidates: Vec<String>,
    },

    #[error("Classifier {classifier}: no values column found in {path}")]
    ClassifierColumnNotFound { classifier: String, path: String },
}

impl WallToWallErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        error_code::CONFIG_ERROR
    }
}
