//! The study area every other layer is aligned to.

use walltowall_core::config::BoundingBoxConfig;
use walltowall_core::errors::AttributeError;
use walltowall_core::traits::AttributeSourceFactory;
use walltowall_core::types::BoundingBoxLayer;

use crate::layer::Layer;

pub const DEFAULT_EPSG: u32 = 4326;
pub const DEFAULT_RESOLUTION: f64 = 0.001;

#[derive(Debug, Clone, PartialEq)]
pub struct BoundingBox {
    pub layer: Layer,
    pub epsg: u32,
    pub resolution: f64,
}

impl BoundingBox {
    pub fn new(layer: Layer) -> Self {
        Self {
            layer,
            epsg: DEFAULT_EPSG,
            resolution: DEFAULT_RESOLUTION,
        }
    }

    /// Apply the configured projection and pixel size; unset or zero values
    /// keep the defaults.
    pub fn configured(layer: Layer, config: &BoundingBoxConfig) -> Self {
        Self {
            layer,
            epsg: config.effective_epsg(),
            resolution: config.effective_resolution(),
        }
    }

    /// Raster bounding boxes shrink to their data extent; vector ones keep
    /// the full feature extent.
    pub fn to_tiler_layer(
        &self,
        factory: &dyn AttributeSourceFactory,
    ) -> Result<BoundingBoxLayer, AttributeError> {
        Ok(BoundingBoxLayer {
            layer: self.layer.to_tiler_layer(factory)?,
            epsg: self.epsg,
            resolution: self.resolution,
            shrink_to_data: self.layer.is_raster(),
        })
    }
}
