//! Seams to external collaborators.

pub mod attribute_source;
pub mod disturbance_types;
pub mod input_database;
pub mod rollback;
pub mod tiler;

pub use attribute_source::{AttributeSource, AttributeSourceFactory, VectorDataset};
pub use disturbance_types::DisturbanceTypeSource;
pub use input_database::{ClassifierDefinition, InputDatabaseBuilder};
pub use rollback::{RollbackEngine, RollbackInventoryYear, RollbackRequest};
pub use tiler::{Tiler, TilerOptions, TransitionRuleSink};
