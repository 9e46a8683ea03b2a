//! Attribute values and distinct-value tables read from spatial layers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single attribute value as read from a layer or a configuration file.
///
/// Text rendering follows the layer's own representation: reals always carry
/// a fractional part (`1990.0`), so a real-typed column never passes for a
/// four-character year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl AttributeValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Text form used for vocabulary membership, substitution and CSV output.
    pub fn as_text(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Integer(v) => v.to_string(),
            Self::Real(v) => format!("{v:?}"),
            Self::Text(v) => v.clone(),
        }
    }

    /// Returns the value as an integer when it is one, or is text/real holding one exactly.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(v) => Some(*v),
            Self::Real(v) if v.fract() == 0.0 => Some(*v as i64),
            Self::Text(v) => v.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Equality across representations: `2001`, `2001.0` and `"2001"` all match.
    pub fn loosely_equals(&self, other: &AttributeValue) -> bool {
        if self == other {
            return true;
        }
        match (self, other) {
            (Self::Null, _) | (_, Self::Null) => false,
            (Self::Text(a), Self::Text(b)) => a == b,
            _ => match (self.as_integer(), other.as_integer()) {
                (Some(a), Some(b)) => a == b,
                _ => self.as_text() == other.as_text(),
            },
        }
    }

    /// Convert `self` into the representation used by `template`, the way a
    /// configured filter value is cast to the type of an attribute's values.
    pub fn coerce_like(&self, template: &AttributeValue) -> AttributeValue {
        match template {
            Self::Integer(_) => self.as_integer().map(Self::Integer).unwrap_or_else(|| self.clone()),
            Self::Real(_) => match self {
                Self::Integer(v) => Self::Real(*v as f64),
                Self::Text(v) => v.trim().parse().map(Self::Real).unwrap_or_else(|_| self.clone()),
                _ => self.clone(),
            },
            Self::Text(_) => match self {
                Self::Null => Self::Null,
                _ => Self::Text(self.as_text()),
            },
            Self::Null => self.clone(),
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

impl From<i64> for AttributeValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<f64> for AttributeValue {
    fn from(v: f64) -> Self {
        Self::Real(v)
    }
}

impl From<&str> for AttributeValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

/// One attribute and the distinct values observed for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeColumn {
    pub name: String,
    pub values: Vec<AttributeValue>,
}

/// Distinct values per attribute, in the layer's declared attribute order.
///
/// Iteration order is stable and matches the source schema; heuristics that
/// pick "the first attribute satisfying a predicate" rely on it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeTable {
    columns: Vec<AttributeColumn>,
}

impl AttributeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an attribute, keeping the first occurrence of each distinct value.
    pub fn insert(&mut self, name: impl Into<String>, values: Vec<AttributeValue>) {
        let name = name.into();
        let mut distinct: Vec<AttributeValue> = Vec::with_capacity(values.len());
        for value in values {
            if !distinct.contains(&value) {
                distinct.push(value);
            }
        }

        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(column) => column.values = distinct,
            None => self.columns.push(AttributeColumn { name, values: distinct }),
        }
    }

    pub fn with(mut self, name: impl Into<String>, values: Vec<AttributeValue>) -> Self {
        self.insert(name, values);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&[AttributeValue]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &AttributeColumn> {
        self.columns.iter()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl FromIterator<(String, Vec<AttributeValue>)> for AttributeTable {
    fn from_iter<I: IntoIterator<Item = (String, Vec<AttributeValue>)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (name, values) in iter {
            table.insert(name, values);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn real_values_render_with_fraction() {
        assert_eq!(AttributeValue::Real(1990.0).as_text(), "1990.0");
        assert_eq!(AttributeValue::Integer(1990).as_text(), "1990");
    }

    #[test]
    fn loose_equality_crosses_types() {
        assert!(AttributeValue::Integer(2001).loosely_equals(&"2001".into()));
        assert!(AttributeValue::Real(2001.0).loosely_equals(&AttributeValue::Integer(2001)));
        assert!(!AttributeValue::Null.loosely_equals(&AttributeValue::Integer(0)));
        assert!(!AttributeValue::Text("fire".into()).loosely_equals(&"Fire".into()));
    }

    #[test]
    fn insert_deduplicates_values() {
        let table = AttributeTable::new().with(
            "dist_year",
            vec![1990i64.into(), 1990i64.into(), 2005i64.into()],
        );
        assert_eq!(table.get("dist_year").unwrap().len(), 2);
    }

    #[test]
    fn untagged_deserialization() {
        let values: Vec<AttributeValue> = serde_json::from_str(r#"[null, 1, 2.5, "x"]"#).unwrap();
        assert_eq!(
            values,
            vec![
                AttributeValue::Null,
                AttributeValue::Integer(1),
                AttributeValue::Real(2.5),
                AttributeValue::Text("x".into())
            ]
        );
    }
}
