//! Project configuration (the user's JSON file).

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::DisturbanceConfig;

/// A column of a CSV table, by header name or zero-based position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnRef {
    Index(usize),
    Name(String),
}

/// A spatial layer: either a bare path or a full definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LayerConfig {
    Path(PathBuf),
    Full {
        layer: PathBuf,
        #[serde(default)]
        attribute: Option<String>,
        #[serde(default)]
        lookup_table: Option<PathBuf>,
        #[serde(flatten)]
        extra: BTreeMap<String, serde_json::Value>,
    },
}

impl LayerConfig {
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::Path(path) => path,
            Self::Full { layer, .. } => layer,
        }
    }

    pub fn attribute(&self) -> Option<&str> {
        match self {
            Self::Path(_) => None,
            Self::Full { attribute, .. } => attribute.as_deref(),
        }
    }

    pub fn lookup_table(&self) -> Option<&PathBuf> {
        match self {
            Self::Path(_) => None,
            Self::Full { lookup_table, .. } => lookup_table.as_ref(),
        }
    }

    pub fn extra(&self) -> BTreeMap<String, serde_json::Value> {
        match self {
            Self::Path(_) => BTreeMap::new(),
            Self::Full { extra, .. } => extra.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingBoxConfig {
    pub layer: PathBuf,
    #[serde(default)]
    pub attribute: Option<String>,
    #[serde(default)]
    pub epsg: Option<u32>,
    #[serde(default)]
    pub resolution: Option<f64>,
}

impl BoundingBoxConfig {
    /// EPSG code, defaulting to 4326.
    pub fn effective_epsg(&self) -> u32 {
        self.epsg.filter(|e| *e != 0).unwrap_or(4326)
    }

    /// Pixel size, defaulting to 0.001.
    pub fn effective_resolution(&self) -> f64 {
        self.resolution.filter(|r| *r > 0.0).unwrap_or(0.001)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    pub layer: PathBuf,
    #[serde(default)]
    pub attribute: Option<String>,
    #[serde(default)]
    pub lookup_table: Option<PathBuf>,
    #[serde(default)]
    pub values_path: Option<PathBuf>,
    #[serde(default)]
    pub values_col: Option<ColumnRef>,
    #[serde(default)]
    pub yield_col: Option<ColumnRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputDatabaseConfig {
    /// Archive index database holding the default parameters and the
    /// disturbance-type vocabulary.
    pub aidb: PathBuf,
    #[serde(default)]
    pub yields: Option<PathBuf>,
    #[serde(default)]
    pub yield_interval: Option<u32>,
}

impl InputDatabaseConfig {
    pub fn effective_yield_interval(&self) -> u32 {
        self.yield_interval.unwrap_or(10)
    }
}

/// Inventory year for rollback: a literal year, or the name of a tiled layer
/// holding per-pixel inventory years.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InventoryYear {
    Year(i32),
    Layer(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollbackConfig {
    pub age_distribution: PathBuf,
    pub inventory_year: InventoryYear,
    #[serde(default)]
    pub rollback_year: Option<i32>,
    #[serde(default)]
    pub prioritize_disturbances: bool,
    #[serde(default)]
    pub single_draw: bool,
    #[serde(default)]
    pub establishment_disturbance_type: Option<String>,
}

impl RollbackConfig {
    pub fn effective_rollback_year(&self) -> i32 {
        self.rollback_year.unwrap_or(1990)
    }

    pub fn effective_establishment_disturbance_type(&self) -> &str {
        self.establishment_disturbance_type
            .as_deref()
            .unwrap_or("Wildfire")
    }
}

/// Extra layer sets tiled separately for cohort simulation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CohortConfig {
    #[serde(default)]
    pub layers: BTreeMap<String, LayerConfig>,
    #[serde(default)]
    pub classifiers: BTreeMap<String, ClassifierConfig>,
}

/// The full project configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub project_name: String,
    pub bounding_box: BoundingBoxConfig,
    #[serde(default)]
    pub classifiers: BTreeMap<String, ClassifierConfig>,
    #[serde(default)]
    pub layers: BTreeMap<String, LayerConfig>,
    /// File pattern → disturbance configuration.
    #[serde(default)]
    pub disturbances: BTreeMap<String, DisturbanceConfig>,
    pub input_db: InputDatabaseConfig,
    #[serde(default)]
    pub rollback: Option<RollbackConfig>,
    #[serde(default)]
    pub transition_rules: Option<PathBuf>,
    #[serde(default)]
    pub transition_rules_undisturbed: Option<PathBuf>,
    #[serde(default)]
    pub cohorts: Vec<CohortConfig>,
    #[serde(default)]
    pub disturbance_rules: Option<PathBuf>,
    #[serde(default)]
    pub rule_based_disturbances: Vec<PathBuf>,
    #[serde(default)]
    pub start_year: Option<i32>,
    #[serde(default)]
    pub end_year: Option<i32>,
}
