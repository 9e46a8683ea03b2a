//! Configuration system for walltowall.
//! JSON project configuration plus TOML tool settings with layered resolution.

pub mod configuration;
pub mod disturbance_config;
pub mod project_config;
pub mod settings;

pub use configuration::Configuration;
pub use disturbance_config::{
    DisturbanceConfig, FilterConfig, SplitDimension, SublayerSelector, TransitionConfig, YearSpec,
};
pub use project_config::{
    BoundingBoxConfig, ClassifierConfig, CohortConfig, ColumnRef, InputDatabaseConfig,
    InventoryYear, LayerConfig, ProjectConfig, RollbackConfig,
};
pub use settings::{CliOverrides, PrepareSettings};
