//! Project errors: aggregates subsystem errors via `From` conversions.

use super::error_code::{self, WallToWallErrorCode};
use super::{AttributeError, ConfigError, DisturbanceError, StorageError, TransitionError};

/// Errors that can occur while preparing a project.
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Attribute error: {0}")]
    Attribute(#[from] AttributeError),

    #[error("Disturbance error: {0}")]
    Disturbance(#[from] DisturbanceError),

    #[error("Transition error: {0}")]
    Transition(#[from] TransitionError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Tiler failed: {0}")]
    Tiler(String),

    #[error("Input database build failed: {0}")]
    InputDatabase(String),

    #[error("Rollback failed: {0}")]
    Rollback(String),

    #[error("IO error on {path}: {message}")]
    Io { path: String, message: String },
}

impl ProjectError {
    /// Build an `Io` variant from a path and an underlying error.
    pub fn io(path: &std::path::Path, err: impl std::fmt::Display) -> Self {
        Self::Io {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }
}

impl WallToWallErrorCode for ProjectError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Config(e) => e.error_code(),
            Self::Attribute(e) => e.error_code(),
            Self::Disturbance(e) => e.error_code(),
            Self::Transition(e) => e.error_code(),
            Self::Storage(e) => e.error_code(),
            Self::Tiler(_) => error_code::TILER_ERROR,
            Self::InputDatabase(_) => error_code::INPUT_DATABASE_ERROR,
            Self::Rollback(_) => error_code::ROLLBACK_ERROR,
            Self::Io { .. } => error_code::IO_ERROR,
        }
    }
}
