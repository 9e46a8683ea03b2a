//! Stable error codes for user-facing reporting.

/// Every error enum implements this to expose a structured code alongside
/// its human-readable message.
pub trait WallToWallErrorCode {
    /// Returns the error code string (e.g., "CONFIG_ERROR").
    fn error_code(&self) -> &'static str;

    /// Returns the formatted report string: `[ERROR_CODE] message`.
    fn report_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const ATTRIBUTE_ERROR: &str = "ATTRIBUTE_ERROR";
pub const PATTERN_DIRECTORY_MISSING: &str = "PATTERN_DIRECTORY_MISSING";
pub const YEAR_UNRESOLVED: &str = "YEAR_UNRESOLVED";
pub const DISTURBANCE_TYPE_UNRESOLVED: &str = "DISTURBANCE_TYPE_UNRESOLVED";
pub const FILTER_ERROR: &str = "FILTER_ERROR";
pub const TRANSITION_ERROR: &str = "TRANSITION_ERROR";
pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
pub const TILER_ERROR: &str = "TILER_ERROR";
pub const INPUT_DATABASE_ERROR: &str = "INPUT_DATABASE_ERROR";
pub const ROLLBACK_ERROR: &str = "ROLLBACK_ERROR";
pub const IO_ERROR: &str = "IO_ERROR";
