//! Shared transition-rule registry handed to the tiler.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use walltowall_core::errors::TransitionError;
use walltowall_core::traits::TransitionRuleSink;
use walltowall_core::types::{
    AttributeValue, ClassifierAssignment, LayerValue, TransitionCategory, TransitionRule,
};

use super::columns::{self, AGE_AFTER, DEFAULT_REGEN_DELAY, ID, REGEN_DELAY, WILDCARD};

/// A registered rule in its written form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct RuleKey {
    regen_delay: String,
    age_after: String,
    classifiers: BTreeMap<String, String>,
}

impl RuleKey {
    fn from_rule(rule: &TransitionRule) -> Result<Self, TransitionError> {
        let per_feature: Vec<&str> = rule.attribute_names();
        let classifiers = match &rule.classifiers {
            ClassifierAssignment::Static(values) if per_feature.is_empty() => values.clone(),
            ClassifierAssignment::Static(_) => {
                return Err(TransitionError::UnresolvedRule {
                    attributes: per_feature.join(", "),
                })
            }
            ClassifierAssignment::Spatial(names) => {
                return Err(TransitionError::UnresolvedRule {
                    attributes: names.join(", "),
                })
            }
        };

        let literal = |value: &Option<LayerValue>| {
            value
                .as_ref()
                .and_then(LayerValue::literal)
                .map(AttributeValue::as_text)
        };

        Ok(Self {
            regen_delay: literal(&rule.regen_delay).unwrap_or_else(|| DEFAULT_REGEN_DELAY.to_string()),
            age_after: literal(&rule.age_after).unwrap_or_default(),
            classifiers,
        })
    }
}

#[derive(Debug, Default)]
struct RegistryState {
    next_id: u64,
    ids: HashMap<(TransitionCategory, RuleKey), u64>,
    rules: BTreeMap<TransitionCategory, Vec<(u64, RuleKey)>>,
}

/// Deduplicating, thread-safe rule registry. Clones share state, so tiler
/// workers can each hold one.
#[derive(Debug, Clone, Default)]
pub struct TransitionRuleRegistry {
    state: Arc<Mutex<RegistryState>>,
}

impl TransitionRuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<T>(
        &self,
        f: impl FnOnce(&mut RegistryState) -> T,
    ) -> Result<T, TransitionError> {
        let mut state = self.state.lock().map_err(|_| TransitionError::RegistryPoisoned)?;
        Ok(f(&mut state))
    }

    /// Number of distinct rules registered in `category`.
    pub fn len(&self, category: TransitionCategory) -> Result<usize, TransitionError> {
        self.with_state(|state| state.rules.get(&category).map_or(0, Vec::len))
    }

    pub fn is_empty(&self) -> Result<bool, TransitionError> {
        self.with_state(|state| state.rules.values().all(Vec::is_empty))
    }

    /// Write one CSV per non-empty category into `output_dir`
    /// (`transition_rules.csv`, `undisturbed_transition_rules.csv`).
    pub fn write_rules(&self, output_dir: &Path) -> Result<Vec<PathBuf>, TransitionError> {
        let snapshot = self.with_state(|state| state.rules.clone())?;

        let mut written = Vec::new();
        for (category, rules) in snapshot {
            if rules.is_empty() {
                continue;
            }
            let path = output_dir.join(category.file_name());
            write_category(&path, &rules)?;
            tracing::info!(
                path = %path.display(),
                rules = rules.len(),
                "wrote transition rules"
            );
            written.push(path);
        }
        Ok(written)
    }
}

impl TransitionRuleSink for TransitionRuleRegistry {
    fn register(
        &self,
        category: TransitionCategory,
        rule: &TransitionRule,
    ) -> Result<u64, TransitionError> {
        let key = RuleKey::from_rule(rule)?;
        self.with_state(|state| {
            if let Some(id) = state.ids.get(&(category, key.clone())) {
                return *id;
            }
            state.next_id += 1;
            let id = state.next_id;
            state.ids.insert((category, key.clone()), id);
            state.rules.entry(category).or_default().push((id, key));
            id
        })
    }
}

fn write_category(path: &Path, rules: &[(u64, RuleKey)]) -> Result<(), TransitionError> {
    let write_err = |message: String| TransitionError::Write {
        path: path.display().to_string(),
        message,
    };

    let classifiers: BTreeSet<&String> = rules.iter().flat_map(|(_, r)| r.classifiers.keys()).collect();
    let header = columns::order_columns(
        [ID, REGEN_DELAY, AGE_AFTER]
            .into_iter()
            .map(str::to_string)
            .chain(classifiers.iter().map(|c| c.to_string())),
    );

    let mut writer = csv::Writer::from_path(path).map_err(|e| write_err(e.to_string()))?;
    writer.write_record(&header).map_err(|e| write_err(e.to_string()))?;
    for (id, rule) in rules {
        let record: Vec<String> = header
            .iter()
            .map(|column| match column.as_str() {
                ID => id.to_string(),
                REGEN_DELAY => rule.regen_delay.clone(),
                AGE_AFTER => rule.age_after.clone(),
                classifier => rule
                    .classifiers
                    .get(classifier)
                    .cloned()
                    .unwrap_or_else(|| WILDCARD.to_string()),
            })
            .collect();
        writer.write_record(&record).map_err(|e| write_err(e.to_string()))?;
    }
    writer.flush().map_err(|e| write_err(e.to_string()))
}
