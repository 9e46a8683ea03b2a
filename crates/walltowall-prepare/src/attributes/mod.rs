//! Attribute tables for raster and vector layers.

pub mod encoding;
pub mod raster_table;
pub mod substitution;
pub mod vector_table;

use std::path::Path;
use std::sync::Arc;

use walltowall_core::errors::AttributeError;
use walltowall_core::traits::{AttributeSource, AttributeSourceFactory, VectorDataset};
use walltowall_core::types::LayerSource;

pub use raster_table::RasterAttributeTable;
pub use substitution::SubstitutionTable;
pub use vector_table::VectorAttributeTable;

/// Opens the right attribute table for a layer: rasters read their lookup
/// table, vectors go through the vector driver.
#[derive(Clone)]
pub struct LayerSources {
    dataset: Arc<dyn VectorDataset>,
}

impl LayerSources {
    pub fn new(dataset: Arc<dyn VectorDataset>) -> Self {
        Self { dataset }
    }
}

impl AttributeSourceFactory for LayerSources {
    fn open(
        &self,
        source: &LayerSource,
        lookup_table: Option<&Path>,
    ) -> Result<Box<dyn AttributeSource>, AttributeError> {
        if source.is_raster() {
            let table = match lookup_table {
                Some(lookup) => RasterAttributeTable::open(&source.path, lookup)?,
                None => RasterAttributeTable::without_attributes(&source.path)?,
            };
            return Ok(Box::new(table));
        }

        let substitutions = lookup_table.map(SubstitutionTable::load).transpose()?;
        let table = VectorAttributeTable::open(
            Arc::clone(&self.dataset),
            &source.path,
            source.sublayer.clone(),
            substitutions,
        )?;
        Ok(Box::new(table))
    }

    fn sublayer_names(&self, path: &Path) -> Result<Vec<String>, AttributeError> {
        self.dataset.layer_names(path)
    }
}
