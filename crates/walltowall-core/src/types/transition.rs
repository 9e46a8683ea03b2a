//! Post-disturbance state assignments.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::LayerValue;

/// Which rule table a transition belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionCategory {
    /// Applied to pixels the disturbance touches.
    Disturbed,
    /// Applied to pixels inside the layer's extent that the disturbance misses.
    Undisturbed,
}

impl TransitionCategory {
    /// File name the rule table of this category is written to.
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Disturbed => "transition_rules.csv",
            Self::Undisturbed => "undisturbed_transition_rules.csv",
        }
    }
}

/// Resulting classifier values of a transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierAssignment {
    /// Classifier name → constant value.
    Static(BTreeMap<String, String>),
    /// Classifier names whose values are read per feature from identically
    /// named (aliased) columns of the tiled layer.
    Spatial(Vec<String>),
}

impl ClassifierAssignment {
    pub fn is_spatial(&self) -> bool {
        matches!(self, Self::Spatial(_))
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Static(values) => values.is_empty(),
            Self::Spatial(names) => names.is_empty(),
        }
    }
}

impl Default for ClassifierAssignment {
    fn default() -> Self {
        Self::Static(BTreeMap::new())
    }
}

/// A (regen_delay, age_after, classifiers) triple. Each field is either a
/// constant or a reference to a layer attribute.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransitionRule {
    pub regen_delay: Option<LayerValue>,
    pub age_after: Option<LayerValue>,
    pub classifiers: ClassifierAssignment,
}

impl TransitionRule {
    /// Attribute names this rule reads per feature.
    pub fn attribute_names(&self) -> Vec<&str> {
        [&self.age_after, &self.regen_delay]
            .into_iter()
            .flatten()
            .filter_map(LayerValue::attribute_name)
            .collect()
    }

    /// True when every field is constant, so the rule can be registered once
    /// instead of per feature.
    pub fn is_static(&self) -> bool {
        self.attribute_names().is_empty() && !self.classifiers.is_spatial()
    }
}
