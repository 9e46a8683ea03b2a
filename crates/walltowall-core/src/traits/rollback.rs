//! The external spatial rollback engine.

use std::path::PathBuf;

use super::ClassifierDefinition;

/// Inventory vintage as the rollback engine consumes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RollbackInventoryYear {
    Year(i32),
    /// A tiled raster holding per-pixel inventory years.
    Layer(PathBuf),
}

/// Everything the rollback engine needs for one run.
#[derive(Debug, Clone)]
pub struct RollbackRequest {
    pub classifiers: Vec<ClassifierDefinition>,
    pub tiled_layers_path: PathBuf,
    pub input_db_path: PathBuf,
    /// The engine writes rollback layers and its own `transition_rules.csv` here.
    pub output_path: PathBuf,
    pub age_distribution: PathBuf,
    pub inventory_year: RollbackInventoryYear,
    pub rollback_year: i32,
    pub prioritize_disturbances: bool,
    pub single_draw: bool,
    pub establishment_disturbance_type: String,
    pub max_mem_gb: Option<u64>,
}

/// Reconstructs historical stand state from the tiled inventory.
pub trait RollbackEngine {
    fn run(&self, request: &RollbackRequest) -> Result<(), String>;
}
