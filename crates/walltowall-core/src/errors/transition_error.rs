//! Transition-rule errors.

use super::error_code::{self, WallToWallErrorCode};

/// Errors raised while registering, reading or writing transition rules.
#[derive(Debug, thiserror::Error)]
pub enum TransitionError {
    #[error("Error reading transition rules {path}: {message}")]
    Read { path: String, message: String },

    #[error("Error writing transition rules {path}: {message}")]
    Write { path: String, message: String },

    #[error("Transition rule still reads {attributes} per feature; resolve it before registering")]
    UnresolvedRule { attributes: String },

    #[error("Transition rule registry lock poisoned")]
    RegistryPoisoned,
}

impl WallToWallErrorCode for TransitionError {
    fn error_code(&self) -> &'static str {
        error_code::TRANSITION_ERROR
    }
}
