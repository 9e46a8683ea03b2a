//! Disturbance pattern configuration as written by users.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::types::AttributeValue;

/// Sentinel year value meaning "parse the year from the file name".
pub const YEAR_FROM_FILENAME: &str = "filename";

/// Configured disturbance year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "AttributeValue", into = "AttributeValue")]
pub enum YearSpec {
    Filename,
    /// A literal year, or the name of an attribute holding it.
    Value(AttributeValue),
}

impl From<AttributeValue> for YearSpec {
    fn from(value: AttributeValue) -> Self {
        match value {
            AttributeValue::Text(ref text) if text == YEAR_FROM_FILENAME => Self::Filename,
            other => Self::Value(other),
        }
    }
}

impl From<YearSpec> for AttributeValue {
    fn from(spec: YearSpec) -> Self {
        match spec {
            YearSpec::Filename => AttributeValue::Text(YEAR_FROM_FILENAME.to_string()),
            YearSpec::Value(value) => value,
        }
    }
}

/// Dimensions vector disturbance layers can be partitioned on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitDimension {
    Year,
    DisturbanceType,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

fn deserialize_split_on<'de, D>(deserializer: D) -> Result<Vec<SplitDimension>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let parsed = Option::<OneOrMany<SplitDimension>>::deserialize(deserializer)?;
    Ok(match parsed {
        Some(OneOrMany::One(dimension)) => vec![dimension],
        Some(OneOrMany::Many(dimensions)) => dimensions,
        None => Vec::new(),
    })
}

/// Sublayers to read from a multi-layer container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SublayerSelector {
    /// Wildcard pattern matched against every sublayer name.
    Pattern(String),
    /// Exact sublayer names.
    Names(Vec<String>),
}

/// A configured filter value: a single value, a list, or the text `"(min,max)"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterConfig {
    List(Vec<AttributeValue>),
    Single(AttributeValue),
}

/// Transition applied to disturbed (or undisturbed) pixels.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransitionConfig {
    #[serde(default)]
    pub regen_delay: Option<AttributeValue>,
    #[serde(default)]
    pub age_after: Option<AttributeValue>,
    /// Classifier name → new value, or → name of a layer attribute holding it.
    #[serde(default)]
    pub classifiers: BTreeMap<String, String>,
}

/// One entry of the project's `disturbances` section; the map key is the
/// file pattern.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisturbanceConfig {
    #[serde(default)]
    pub year: Option<YearSpec>,
    #[serde(default)]
    pub disturbance_type: Option<String>,
    #[serde(default)]
    pub transition: Option<TransitionConfig>,
    #[serde(default)]
    pub transition_undisturbed: Option<TransitionConfig>,
    #[serde(default)]
    pub lookup_table: Option<PathBuf>,
    #[serde(default)]
    pub filters: BTreeMap<String, FilterConfig>,
    #[serde(default, deserialize_with = "deserialize_split_on")]
    pub split_on: Vec<SplitDimension>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub layers: Option<SublayerSelector>,
    #[serde(default)]
    pub metadata_attributes: Vec<String>,
    #[serde(default)]
    pub proportion: Option<AttributeValue>,
    /// Unrecognised keys, forwarded verbatim to the tiler layer.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl DisturbanceConfig {
    /// Split dimensions in effect; an absent or empty list means `year`.
    pub fn effective_split_on(&self) -> Vec<SplitDimension> {
        if self.split_on.is_empty() {
            vec![SplitDimension::Year]
        } else {
            self.split_on.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_sentinel_and_literals() {
        let c: DisturbanceConfig = serde_json::from_str(r#"{"year": "filename"}"#).unwrap();
        assert_eq!(c.year, Some(YearSpec::Filename));

        let c: DisturbanceConfig = serde_json::from_str(r#"{"year": 2001}"#).unwrap();
        assert_eq!(c.year, Some(YearSpec::Value(AttributeValue::Integer(2001))));

        let c: DisturbanceConfig = serde_json::from_str(r#"{"year": "DIST_YR"}"#).unwrap();
        assert_eq!(c.year, Some(YearSpec::Value("DIST_YR".into())));
    }

    #[test]
    fn split_on_accepts_string_or_list() {
        let c: DisturbanceConfig =
            serde_json::from_str(r#"{"split_on": "disturbance_type"}"#).unwrap();
        assert_eq!(c.effective_split_on(), vec![SplitDimension::DisturbanceType]);

        let c: DisturbanceConfig =
            serde_json::from_str(r#"{"split_on": ["year", "disturbance_type"]}"#).unwrap();
        assert_eq!(c.split_on.len(), 2);

        let c: DisturbanceConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(c.effective_split_on(), vec![SplitDimension::Year]);
    }

    #[test]
    fn unknown_keys_are_captured() {
        let c: DisturbanceConfig =
            serde_json::from_str(r#"{"disturbance_type": "Wildfire", "nodata_value": 255}"#)
                .unwrap();
        assert_eq!(c.extra.get("nodata_value"), Some(&serde_json::json!(255)));
        assert!(!c.extra.contains_key("disturbance_type"));
    }

    #[test]
    fn sublayer_selector_forms() {
        let c: DisturbanceConfig = serde_json::from_str(r#"{"layers": "fire_*"}"#).unwrap();
        assert_eq!(c.layers, Some(SublayerSelector::Pattern("fire_*".into())));
        let c: DisturbanceConfig = serde_json::from_str(r#"{"layers": ["a", "b"]}"#).unwrap();
        assert_eq!(
            c.layers,
            Some(SublayerSelector::Names(vec!["a".into(), "b".into()]))
        );
    }
}
