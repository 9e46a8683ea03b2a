//! Error handling for walltowall.
//! One error enum per subsystem, `thiserror` only.

pub mod attribute_error;
pub mod config_error;
pub mod disturbance_error;
pub mod error_code;
pub mod project_error;
pub mod storage_error;
pub mod transition_error;

pub use attribute_error::AttributeError;
pub use config_error::ConfigError;
pub use disturbance_error::DisturbanceError;
pub use error_code::WallToWallErrorCode;
pub use project_error::ProjectError;
pub use storage_error::StorageError;
pub use transition_error::TransitionError;
