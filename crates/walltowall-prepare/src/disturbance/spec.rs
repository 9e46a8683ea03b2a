//! Configuration-time description of one disturbance pattern.

use std::collections::BTreeMap;
use std::path::PathBuf;

use walltowall_core::config::{
    DisturbanceConfig, FilterConfig, SplitDimension, SublayerSelector, TransitionConfig, YearSpec,
};
use walltowall_core::types::AttributeValue;

/// A file pattern plus the rules for turning each match into tiler layers.
#[derive(Debug, Clone, PartialEq)]
pub struct DisturbanceSpec {
    /// Absolute path whose file name may contain wildcards.
    pub pattern: PathBuf,
    pub year: Option<YearSpec>,
    pub disturbance_type: Option<String>,
    pub transition: Option<TransitionConfig>,
    pub transition_undisturbed: Option<TransitionConfig>,
    pub lookup_table: Option<PathBuf>,
    /// Keyed by `year`, `disturbance_type` or an attribute name.
    pub filters: BTreeMap<String, FilterConfig>,
    pub split_on: Vec<SplitDimension>,
    pub name: Option<String>,
    /// Sublayers to read from multi-layer containers.
    pub layers: Option<SublayerSelector>,
    pub metadata_attributes: Vec<String>,
    pub proportion: Option<AttributeValue>,
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl DisturbanceSpec {
    pub fn new(pattern: impl Into<PathBuf>) -> Self {
        Self {
            pattern: pattern.into(),
            year: None,
            disturbance_type: None,
            transition: None,
            transition_undisturbed: None,
            lookup_table: None,
            filters: BTreeMap::new(),
            split_on: vec![SplitDimension::Year],
            name: None,
            layers: None,
            metadata_attributes: Vec::new(),
            proportion: None,
            extra: BTreeMap::new(),
        }
    }

    /// Build from a project configuration entry. `pattern` and
    /// `lookup_table` must already be resolved against the config directory.
    pub fn from_config(
        pattern: PathBuf,
        config: &DisturbanceConfig,
        lookup_table: Option<PathBuf>,
    ) -> Self {
        Self {
            pattern,
            year: config.year.clone(),
            disturbance_type: config.disturbance_type.clone(),
            transition: config.transition.clone(),
            transition_undisturbed: config.transition_undisturbed.clone(),
            lookup_table,
            filters: config.filters.clone(),
            split_on: config.effective_split_on(),
            name: config.name.clone(),
            layers: config.layers.clone(),
            metadata_attributes: config.metadata_attributes.clone(),
            proportion: config.proportion.clone(),
            extra: config.extra.clone(),
        }
    }

    pub fn splits_on(&self, dimension: SplitDimension) -> bool {
        self.split_on.contains(&dimension)
    }
}
