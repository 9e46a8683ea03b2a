//! Rollback configuration bound to the project layout.

use std::path::{Path, PathBuf};

use walltowall_core::config::{InventoryYear, RollbackConfig};
use walltowall_core::errors::ProjectError;
use walltowall_core::traits::{ClassifierDefinition, RollbackInventoryYear, RollbackRequest};

#[derive(Debug, Clone, PartialEq)]
pub struct Rollback {
    pub age_distribution: PathBuf,
    pub inventory_year: InventoryYear,
    pub rollback_year: i32,
    pub prioritize_disturbances: bool,
    pub single_draw: bool,
    pub establishment_disturbance_type: String,
}

impl Rollback {
    /// `age_distribution` must already be resolved against the config directory.
    pub fn from_config(config: &RollbackConfig, age_distribution: PathBuf) -> Self {
        Self {
            age_distribution,
            inventory_year: config.inventory_year.clone(),
            rollback_year: config.effective_rollback_year(),
            prioritize_disturbances: config.prioritize_disturbances,
            single_draw: config.single_draw,
            establishment_disturbance_type: config
                .effective_establishment_disturbance_type()
                .to_string(),
        }
    }

    /// An inventory year given as a layer name refers to that layer's tiled
    /// raster (`<name>_moja.tif*`).
    pub fn inventory_year(&self, tiled_layers: &Path) -> Result<RollbackInventoryYear, ProjectError> {
        let name = match &self.inventory_year {
            InventoryYear::Year(year) => return Ok(RollbackInventoryYear::Year(*year)),
            InventoryYear::Layer(name) => name,
        };

        let escaped = PathBuf::from(glob::Pattern::escape(&tiled_layers.to_string_lossy()))
            .join(format!("{}_moja.tif*", glob::Pattern::escape(name)));
        let found = glob::glob(&escaped.to_string_lossy())
            .map_err(|e| ProjectError::Rollback(e.to_string()))?
            .filter_map(Result::ok)
            .next();

        found.map(RollbackInventoryYear::Layer).ok_or_else(|| {
            ProjectError::Rollback(format!(
                "inventory year layer {name} not found in {}",
                tiled_layers.display()
            ))
        })
    }

    pub fn request(
        &self,
        classifiers: Vec<ClassifierDefinition>,
        tiled_layers: &Path,
        input_db: &Path,
        output_path: &Path,
        max_mem_gb: Option<u64>,
    ) -> Result<RollbackRequest, ProjectError> {
        Ok(RollbackRequest {
            classifiers,
            tiled_layers_path: tiled_layers.to_path_buf(),
            input_db_path: input_db.to_path_buf(),
            output_path: output_path.to_path_buf(),
            age_distribution: self.age_distribution.clone(),
            inventory_year: self.inventory_year(tiled_layers)?,
            rollback_year: self.rollback_year,
            prioritize_disturbances: self.prioritize_disturbances,
            single_draw: self.single_draw,
            establishment_disturbance_type: self.establishment_disturbance_type.clone(),
            max_mem_gb,
        })
    }
}
