//! Disturbance resolution errors. All of these abort the run.

use super::error_code::{self, WallToWallErrorCode};
use super::{AttributeError, StorageError};

/// Errors that can occur while resolving a disturbance pattern into tiler layers.
#[derive(Debug, thiserror::Error)]
pub enum DisturbanceError {
    #[error(
        "Error scanning for disturbance layer pattern {pattern}: \
         parent directory {directory} does not exist"
    )]
    PatternDirectoryMissing { pattern: String, directory: String },

    #[error("Invalid disturbance layer pattern {pattern}: {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Year not parseable from filename in {path}")]
    YearNotInFilename { path: String },

    #[error("No disturbance year configured or found in {path}")]
    YearUnresolved { path: String },

    #[error("No disturbance type configured or found in {path}")]
    DisturbanceTypeUnresolved { path: String },

    #[error("Invalid filter range {value:?} for {attribute}: {message}")]
    InvalidFilterRange {
        attribute: String,
        value: String,
        message: String,
    },

    #[error("Filter attribute {attribute} not found in {path}")]
    FilterAttributeMissing { attribute: String, path: String },

    #[error("Attribute error: {0}")]
    Attribute(#[from] AttributeError),

    #[error("Disturbance type vocabulary unavailable: {0}")]
    Vocabulary(#[from] StorageError),
}

impl WallToWallErrorCode for DisturbanceError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::PatternDirectoryMissing { .. } | Self::InvalidPattern { .. } => {
                error_code::PATTERN_DIRECTORY_MISSING
            }
            Self::YearNotInFilename { .. } | Self::YearUnresolved { .. } => {
                error_code::YEAR_UNRESOLVED
            }
            Self::DisturbanceTypeUnresolved { .. } => error_code::DISTURBANCE_TYPE_UNRESOLVED,
            Self::InvalidFilterRange { .. } | Self::FilterAttributeMissing { .. } => {
                error_code::FILTER_ERROR
            }
            Self::Attribute(e) => e.error_code(),
            Self::Vocabulary(e) => e.error_code(),
        }
    }
}
