//! Descriptors handed to the external tiler.
//!
//! These are plain data: the tiler decides how to rasterize them. They are
//! serializable so a tiler running out of process can receive them as JSON.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::{AttributeValue, LayerSource, LayerValue, TransitionRule};

/// One attribute carried into the tiled output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TilerAttribute {
    /// Attribute name in the source layer.
    pub name: String,
    /// Column name in the tiled output.
    pub alias: String,
    /// Only features whose value is in this list are rasterized.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Vec<AttributeValue>>,
    /// Distinct values after lookup-table substitution, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<AttributeValue>>,
}

impl TilerAttribute {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            alias: name.clone(),
            name,
            filter: None,
            values: None,
        }
    }

    pub fn aliased(name: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: alias.into(),
            filter: None,
            values: None,
        }
    }
}

/// A plain (non-disturbance) layer to tile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TilerLayer {
    pub name: String,
    pub source: LayerSource,
    /// Geometry/pixel values only, or the attribute table as well.
    pub raw: bool,
    #[serde(default)]
    pub attributes: Vec<TilerAttribute>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lookup_table: Option<PathBuf>,
    /// Pass-through options (`data_type`, `nodata`, ...).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, serde_json::Value>,
}

/// Which registered rule a disturbance layer applies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum TransitionBinding {
    /// A constant rule already registered under `id`.
    Registered { id: u64 },
    /// A rule with per-feature parts the tiler registers as it reads values.
    PerFeature { rule: TransitionRule },
}

/// A disturbance layer to tile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisturbanceTilerLayer {
    pub layer: TilerLayer,
    pub year: LayerValue,
    pub disturbance_type: LayerValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proportion: Option<LayerValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition: Option<TransitionBinding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition_undisturbed: Option<TransitionBinding>,
}

/// The study-area definition: every other layer is aligned to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingBoxLayer {
    pub layer: TilerLayer,
    pub epsg: u32,
    pub resolution: f64,
    /// Shrink the study area to the data extent (raster bounding layers only).
    pub shrink_to_data: bool,
}

/// Anything the tiler accepts in its layer list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum TilerInput {
    Layer(TilerLayer),
    Disturbance(DisturbanceTilerLayer),
}

impl TilerInput {
    pub fn name(&self) -> &str {
        match self {
            Self::Layer(layer) => &layer.name,
            Self::Disturbance(disturbance) => &disturbance.layer.name,
        }
    }
}
