//! Attribute-table errors.

use super::error_code::{self, WallToWallErrorCode};

/// Errors raised while reading attribute names and distinct values from a layer.
#[derive(Debug, thiserror::Error)]
pub enum AttributeError {
    #[error("Layer not found: {path}")]
    LayerNotFound { path: String },

    #[error("Error reading attribute table {path}: {message}")]
    TableRead { path: String, message: String },

    #[error("Error reading lookup table {path}: {message}")]
    LookupRead { path: String, message: String },

    #[error("Attribute {attribute} not found in {path}")]
    UnknownAttribute { attribute: String, path: String },

    #[error("Error getting layer {layer} from {path}")]
    SublayerNotFound { layer: String, path: String },

    #[error("Vector driver error for {path}: {message}")]
    Driver { path: String, message: String },
}

impl WallToWallErrorCode for AttributeError {
    fn error_code(&self) -> &'static str {
        error_code::ATTRIBUTE_ERROR
    }
}
