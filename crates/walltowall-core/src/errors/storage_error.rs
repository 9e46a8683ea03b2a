//! Storage errors.

use super::error_code::{self, WallToWallErrorCode};

/// Errors that can occur while reading the archive index / input database.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("SQLite error: {message}")]
    SqliteError { message: String },

    #[error("Database not found: {path}")]
    DatabaseNotFound { path: String },

    #[error("No disturbance type table found in {path}")]
    VocabularyTableMissing { path: String },
}

impl WallToWallErrorCode for StorageError {
    fn error_code(&self) -> &'static str {
        error_code::STORAGE_ERROR
    }
}
