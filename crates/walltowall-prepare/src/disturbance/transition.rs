//! Transition construction for one layer.

use std::collections::BTreeMap;

use walltowall_core::config::TransitionConfig;
use walltowall_core::types::{AttributeTable, ClassifierAssignment, TransitionRule};

use super::resolver::configured_or_default;

/// A transition rule bound to one layer's attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerTransition {
    pub rule: TransitionRule,
    /// Source attribute → classifier name, for spatial-classifier transitions.
    /// The tiled output carries each attribute under its classifier's name.
    pub classifier_aliases: BTreeMap<String, String>,
}

impl LayerTransition {
    pub fn is_spatial(&self) -> bool {
        self.rule.classifiers.is_spatial()
    }
}

/// Bind a configured transition to a layer. `age_after` and `regen_delay`
/// fall back to identically named attributes. When every configured
/// classifier value names an attribute of the layer, the classifiers are
/// read per feature instead of assigned.
pub fn make_transition(
    table: &AttributeTable,
    config: Option<&TransitionConfig>,
) -> Option<LayerTransition> {
    let config = config?;

    let age_after = configured_or_default(table, "age_after", config.age_after.as_ref());
    let regen_delay = configured_or_default(table, "regen_delay", config.regen_delay.as_ref());

    let spatial = !config.classifiers.is_empty()
        && config.classifiers.values().all(|attribute| table.contains(attribute));

    let (classifiers, classifier_aliases) = if spatial {
        (
            ClassifierAssignment::Spatial(config.classifiers.keys().cloned().collect()),
            config
                .classifiers
                .iter()
                .map(|(classifier, attribute)| (attribute.clone(), classifier.clone()))
                .collect(),
        )
    } else {
        (
            ClassifierAssignment::Static(config.classifiers.clone()),
            BTreeMap::new(),
        )
    };

    Some(LayerTransition {
        rule: TransitionRule {
            regen_delay,
            age_after,
            classifiers,
        },
        classifier_aliases,
    })
}
