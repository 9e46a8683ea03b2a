//! Attribute extraction from vector and raster sources.

use std::path::Path;

use crate::errors::AttributeError;
use crate::types::{AttributeTable, AttributeValue, LayerSource};

/// Distinct-value access to one layer's attribute table.
///
/// Implementations must return a consistent schema for the lifetime of one
/// resolution pass.
pub trait AttributeSource {
    /// All attribute names in declared order.
    fn attribute_names(&self) -> Result<Vec<String>, AttributeError>;

    /// Distinct values for the given attributes, or for every attribute when
    /// `attributes` is `None`.
    fn unique_values(&self, attributes: Option<&[String]>) -> Result<AttributeTable, AttributeError>;

    /// Translate filter values expressed in substituted (user-facing) terms
    /// back into the values stored in the layer. Sources without substitution
    /// return the values unchanged.
    fn original_values(
        &self,
        _attribute: &str,
        values: &[AttributeValue],
    ) -> Result<Vec<AttributeValue>, AttributeError> {
        Ok(values.to_vec())
    }
}

/// Opens attribute sources for concrete layers.
pub trait AttributeSourceFactory {
    /// Open the attribute source for `source`, applying `lookup_table`
    /// substitutions when given.
    fn open(
        &self,
        source: &LayerSource,
        lookup_table: Option<&Path>,
    ) -> Result<Box<dyn AttributeSource>, AttributeError>;

    /// Names of the sublayers in a multi-layer container file.
    fn sublayer_names(&self, path: &Path) -> Result<Vec<String>, AttributeError>;
}

/// Low-level vector dataset access, provided by a GIS driver binding.
pub trait VectorDataset: Send + Sync {
    /// Layer names inside a (possibly multi-layer) dataset.
    fn layer_names(&self, path: &Path) -> Result<Vec<String>, AttributeError>;

    /// Field names of a layer; `layer` = `None` selects the first layer.
    fn field_names(&self, path: &Path, layer: Option<&str>) -> Result<Vec<String>, AttributeError>;

    /// `SELECT DISTINCT field FROM layer`.
    fn distinct_values(
        &self,
        path: &Path,
        layer: Option<&str>,
        field: &str,
    ) -> Result<Vec<AttributeValue>, AttributeError>;
}
