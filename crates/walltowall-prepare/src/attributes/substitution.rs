//! Lookup-table value substitution.
//!
//! A lookup table is a CSV of `(original, replacement)` column pairs. The
//! header of each original column names the attribute it applies to; the
//! replacement column's header is ignored.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use walltowall_core::errors::AttributeError;
use walltowall_core::types::AttributeValue;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubstitutionTable {
    path: PathBuf,
    /// attribute → original text → replacement text
    forward: BTreeMap<String, BTreeMap<String, String>>,
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

impl SubstitutionTable {
    pub fn load(path: &Path) -> Result<Self, AttributeError> {
        let lookup_err = |message: String| AttributeError::LookupRead {
            path: path.display().to_string(),
            message,
        };

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(|e| lookup_err(e.to_string()))?;
        let header: Vec<String> = reader
            .headers()
            .map_err(|e| lookup_err(e.to_string()))?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').to_string())
            .collect();

        let mut forward: BTreeMap<String, BTreeMap<String, String>> = header
            .iter()
            .step_by(2)
            .map(|attribute| (attribute.clone(), BTreeMap::new()))
            .collect();

        for record in reader.records() {
            let record = record.map_err(|e| lookup_err(e.to_string()))?;
            for original_col in (0..header.len()).step_by(2) {
                let (Some(original), Some(replacement)) =
                    (record.get(original_col), record.get(original_col + 1))
                else {
                    continue;
                };
                if is_blank(original) || is_blank(replacement) {
                    continue;
                }
                if let Some(values) = forward.get_mut(&header[original_col]) {
                    values.insert(original.to_string(), replacement.to_string());
                }
            }
        }

        Ok(Self {
            path: path.to_path_buf(),
            forward,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replacement for `value`, or `value` unchanged when no substitution applies.
    pub fn substitute(&self, attribute: &str, value: &AttributeValue) -> AttributeValue {
        if value.is_null() {
            return AttributeValue::Null;
        }
        self.forward
            .get(attribute)
            .and_then(|values| values.get(&value.as_text()))
            .map(|replacement| AttributeValue::Text(replacement.clone()))
            .unwrap_or_else(|| value.clone())
    }

    /// Every original value that substitutes to `replacement`. Several
    /// originals can share one replacement.
    pub fn originals(&self, attribute: &str, replacement: &AttributeValue) -> Vec<String> {
        let wanted = replacement.as_text();
        self.forward
            .get(attribute)
            .map(|values| {
                values
                    .iter()
                    .filter(|(_, r)| **r == wanted)
                    .map(|(original, _)| original.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn covers(&self, attribute: &str) -> bool {
        self.forward.contains_key(attribute)
    }
}
