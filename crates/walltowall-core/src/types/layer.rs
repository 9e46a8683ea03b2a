//! Layer sources and per-layer value references.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::AttributeValue;

const RASTER_EXTENSIONS: &[&str] = &["tif", "tiff", "img", "vrt", "asc", "bil", "nc"];
const CONTAINER_EXTENSIONS: &[&str] = &["gdb", "gpkg"];

/// Whether a layer is pixel- or feature-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    Raster,
    Vector,
}

impl LayerKind {
    /// Classify a path by its extension. Anything not recognised as a raster
    /// format is read through the vector driver.
    pub fn from_path(path: &Path) -> Self {
        let is_raster = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| RASTER_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
            .unwrap_or(false);

        if is_raster {
            Self::Raster
        } else {
            Self::Vector
        }
    }
}

/// Returns true for multi-layer container formats whose sublayers are
/// addressed by name.
pub fn is_container(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| CONTAINER_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// A concrete file (or one sublayer of a container file) on disk.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerSource {
    pub path: PathBuf,
    pub sublayer: Option<String>,
    pub kind: LayerKind,
}

impl LayerSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let kind = LayerKind::from_path(&path);
        Self {
            path,
            sublayer: None,
            kind,
        }
    }

    pub fn with_sublayer(mut self, sublayer: impl Into<String>) -> Self {
        self.sublayer = Some(sublayer.into());
        self.kind = LayerKind::Vector;
        self
    }

    pub fn is_raster(&self) -> bool {
        self.kind == LayerKind::Raster
    }

    /// File name without extension, used as the default tiler name.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// A per-layer value that is either constant or read per feature/pixel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "source", content = "value")]
pub enum LayerValue {
    Literal(AttributeValue),
    Attribute(String),
}

impl LayerValue {
    pub fn attribute_name(&self) -> Option<&str> {
        match self {
            Self::Attribute(name) => Some(name),
            Self::Literal(_) => None,
        }
    }

    pub fn literal(&self) -> Option<&AttributeValue> {
        match self {
            Self::Literal(value) => Some(value),
            Self::Attribute(_) => None,
        }
    }

    pub fn is_attribute(&self) -> bool {
        matches!(self, Self::Attribute(_))
    }
}
