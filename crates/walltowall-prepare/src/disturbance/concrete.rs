//! Resolved disturbance layers and their tiler descriptors.

use std::collections::BTreeMap;
use std::path::PathBuf;

use walltowall_core::errors::TransitionError;
use walltowall_core::traits::TransitionRuleSink;
use walltowall_core::types::{
    AttributeValue, DisturbanceTilerLayer, LayerSource, LayerValue, TilerAttribute, TilerInput,
    TilerLayer, TransitionBinding, TransitionCategory, TransitionRule,
};

/// One file, sublayer or split partition ready for tiling.
///
/// Created by [`super::Disturbance::resolve`], consumed immediately by the
/// tiler and never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ConcreteDisturbanceLayer {
    pub name: String,
    pub source: LayerSource,
    /// Geometry/pixel values only, without the attribute table.
    pub raw: bool,
    pub year: LayerValue,
    pub disturbance_type: LayerValue,
    pub proportion: Option<LayerValue>,
    pub transition: Option<TransitionRule>,
    pub transition_undisturbed: Option<TransitionRule>,
    /// Attributes carried into the tiled output, with their output aliases
    /// and value filters (in the layer's stored values).
    pub attributes: Vec<TilerAttribute>,
    pub lookup_table: Option<PathBuf>,
    /// Unrecognised configuration keys, forwarded verbatim.
    pub options: BTreeMap<String, serde_json::Value>,
}

impl ConcreteDisturbanceLayer {
    /// Values `attribute` is restricted to, if filtered.
    pub fn filter(&self, attribute: &str) -> Option<&[AttributeValue]> {
        self.attributes
            .iter()
            .find(|a| a.name == attribute)
            .and_then(|a| a.filter.as_deref())
    }

    /// Output alias of a carried attribute.
    pub fn alias(&self, attribute: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == attribute)
            .map(|a| a.alias.as_str())
    }

    /// Build the tiler descriptor. Constant transitions are registered once
    /// here; transitions with per-feature parts are handed to the tiler to
    /// register as it reads each feature.
    pub fn render(&self, rules: &dyn TransitionRuleSink) -> Result<TilerInput, TransitionError> {
        let bind = |rule: &TransitionRule, category| -> Result<TransitionBinding, TransitionError> {
            if rule.is_static() {
                let id = rules.register(category, rule)?;
                Ok(TransitionBinding::Registered { id })
            } else {
                Ok(TransitionBinding::PerFeature { rule: rule.clone() })
            }
        };

        let transition = self
            .transition
            .as_ref()
            .map(|rule| bind(rule, TransitionCategory::Disturbed))
            .transpose()?;
        let transition_undisturbed = self
            .transition_undisturbed
            .as_ref()
            .map(|rule| bind(rule, TransitionCategory::Undisturbed))
            .transpose()?;

        Ok(TilerInput::Disturbance(DisturbanceTilerLayer {
            layer: TilerLayer {
                name: self.name.clone(),
                source: self.source.clone(),
                raw: self.raw,
                attributes: self.attributes.clone(),
                lookup_table: self.lookup_table.clone(),
                options: self.options.clone(),
            },
            year: self.year.clone(),
            disturbance_type: self.disturbance_type.clone(),
            proportion: self.proportion.clone(),
            transition,
            transition_undisturbed,
        }))
    }
}

/// Attributes selected for tiling, in selection order.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct AttributeSelection {
    attributes: Vec<TilerAttribute>,
}

impl AttributeSelection {
    /// Carry `name` under its own name unless already selected.
    pub(crate) fn select(&mut self, name: &str) {
        if !self.contains(name) {
            self.attributes.push(TilerAttribute::new(name));
        }
    }

    /// Carry `name` under `alias`, replacing an earlier alias.
    pub(crate) fn rename(&mut self, name: &str, alias: &str) {
        match self.attributes.iter_mut().find(|a| a.name == name) {
            Some(attribute) => attribute.alias = alias.to_string(),
            None => self.attributes.push(TilerAttribute::aliased(name, alias)),
        }
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.attributes.iter().any(|a| a.name == name)
    }

    /// The selection with the given value filters applied.
    pub(crate) fn with_filters(
        &self,
        filters: &BTreeMap<String, Vec<AttributeValue>>,
    ) -> Vec<TilerAttribute> {
        self.attributes
            .iter()
            .map(|attribute| {
                let mut attribute = attribute.clone();
                attribute.filter = filters.get(&attribute.name).cloned();
                attribute
            })
            .collect()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut TilerAttribute> {
        self.attributes.iter_mut()
    }
}
