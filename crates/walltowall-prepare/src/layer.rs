//! Non-disturbance layers.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use walltowall_core::errors::AttributeError;
use walltowall_core::traits::{AttributeSource, AttributeSourceFactory};
use walltowall_core::types::{LayerSource, TilerAttribute, TilerLayer};

/// Layer name the rollback engine reads stand age from.
pub const INITIAL_AGE_LAYER: &str = "initial_age";

/// A named spatial layer tiled as-is: stand age, inventory year, a
/// classifier, or the bounding box.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub name: String,
    pub source: LayerSource,
    /// Attribute holding the layer's value; `None` tiles pixel values directly.
    pub attribute: Option<String>,
    pub lookup_table: Option<PathBuf>,
    /// Forwarded verbatim to the tiler.
    pub options: BTreeMap<String, serde_json::Value>,
}

impl Layer {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            source: LayerSource::new(path),
            attribute: None,
            lookup_table: None,
            options: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }

    pub fn with_lookup_table(mut self, lookup_table: impl Into<PathBuf>) -> Self {
        self.lookup_table = Some(lookup_table.into());
        self
    }

    pub fn with_options(mut self, options: BTreeMap<String, serde_json::Value>) -> Self {
        self.options.extend(options);
        self
    }

    pub fn path(&self) -> &Path {
        &self.source.path
    }

    pub fn is_raster(&self) -> bool {
        self.source.is_raster()
    }

    pub fn attribute_table(
        &self,
        factory: &dyn AttributeSourceFactory,
    ) -> Result<Box<dyn AttributeSource>, AttributeError> {
        factory.open(&self.source, self.lookup_table.as_deref())
    }

    /// Build the tiler descriptor. Stand age is always tiled as a 16-bit
    /// integer raster.
    pub fn to_tiler_layer(
        &self,
        factory: &dyn AttributeSourceFactory,
    ) -> Result<TilerLayer, AttributeError> {
        let mut attributes = Vec::new();
        if let Some(attribute) = &self.attribute {
            let table = self
                .attribute_table(factory)?
                .unique_values(Some(std::slice::from_ref(attribute)))?;
            let mut tiler_attribute = TilerAttribute::new(attribute.clone());
            tiler_attribute.values = table.get(attribute).map(<[_]>::to_vec);
            attributes.push(tiler_attribute);
        }

        let mut options = self.options.clone();
        if self.name == INITIAL_AGE_LAYER {
            options.insert("data_type".to_string(), serde_json::json!("Int16"));
        }

        Ok(TilerLayer {
            name: self.name.clone(),
            source: self.source.clone(),
            raw: self.attribute.is_none(),
            attributes,
            lookup_table: self.lookup_table.clone(),
            options,
        })
    }
}
