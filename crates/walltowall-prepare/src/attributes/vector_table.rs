//! Vector attribute tables read through the vector driver.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use walltowall_core::errors::AttributeError;
use walltowall_core::traits::{AttributeSource, VectorDataset};
use walltowall_core::types::{AttributeTable, AttributeValue};

use super::encoding::repair_table;
use super::SubstitutionTable;

/// Distinct attribute values of one vector layer, after lookup-table
/// substitution and encoding repair.
///
/// Field names and per-attribute values are read lazily and cached for the
/// lifetime of the table.
pub struct VectorAttributeTable {
    dataset: Arc<dyn VectorDataset>,
    layer_path: PathBuf,
    sublayer: Option<String>,
    substitutions: Option<SubstitutionTable>,
    field_names: OnceLock<Vec<String>>,
    raw_values: Mutex<BTreeMap<String, Vec<AttributeValue>>>,
}

impl VectorAttributeTable {
    pub fn open(
        dataset: Arc<dyn VectorDataset>,
        layer_path: &Path,
        sublayer: Option<String>,
        substitutions: Option<SubstitutionTable>,
    ) -> Result<Self, AttributeError> {
        if !layer_path.exists() {
            return Err(AttributeError::LayerNotFound {
                path: layer_path.display().to_string(),
            });
        }

        Ok(Self {
            dataset,
            layer_path: layer_path.to_path_buf(),
            sublayer,
            substitutions,
            field_names: OnceLock::new(),
            raw_values: Mutex::new(BTreeMap::new()),
        })
    }

    fn display_name(&self) -> String {
        let stem = self
            .layer_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        match &self.sublayer {
            Some(sublayer) => format!("{stem} [{sublayer}]"),
            None => stem,
        }
    }

    fn fields(&self) -> Result<&[String], AttributeError> {
        if let Some(fields) = self.field_names.get() {
            return Ok(fields);
        }
        let fields = self
            .dataset
            .field_names(&self.layer_path, self.sublayer.as_deref())
            .map_err(|e| match (e, &self.sublayer) {
                (AttributeError::Driver { .. }, Some(sublayer)) => AttributeError::SublayerNotFound {
                    layer: sublayer.clone(),
                    path: self.layer_path.display().to_string(),
                },
                (e, _) => e,
            })?;
        Ok(self.field_names.get_or_init(|| fields))
    }

    /// Distinct values as stored in the layer, before substitution.
    fn raw_values(&self, attributes: &[String]) -> Result<AttributeTable, AttributeError> {
        let mut cache = self.raw_values.lock().map_err(|_| AttributeError::Driver {
            path: self.layer_path.display().to_string(),
            message: "attribute cache lock poisoned".to_string(),
        })?;

        let missing: Vec<&String> = attributes.iter().filter(|a| !cache.contains_key(*a)).collect();
        if !missing.is_empty() {
            tracing::info!(layer = %self.display_name(), "reading attribute table");
            let total = missing.len();
            for (i, attribute) in missing.into_iter().enumerate() {
                tracing::info!("    ({} / {}) {}", i + 1, total, attribute);
                let values = self.dataset.distinct_values(
                    &self.layer_path,
                    self.sublayer.as_deref(),
                    attribute,
                )?;
                cache.insert(attribute.clone(), values);
            }
        }

        Ok(attributes
            .iter()
            .map(|a| (a.clone(), cache.get(a).cloned().unwrap_or_default()))
            .collect())
    }
}

impl AttributeSource for VectorAttributeTable {
    fn attribute_names(&self) -> Result<Vec<String>, AttributeError> {
        Ok(self.fields()?.to_vec())
    }

    fn unique_values(&self, attributes: Option<&[String]>) -> Result<AttributeTable, AttributeError> {
        let fields = self.fields()?;
        let selected: Vec<String> = match attributes {
            Some(attributes) => {
                if let Some(unknown) = attributes.iter().find(|a| !fields.contains(a)) {
                    return Err(AttributeError::UnknownAttribute {
                        attribute: unknown.clone(),
                        path: self.layer_path.display().to_string(),
                    });
                }
                attributes.to_vec()
            }
            None => fields.to_vec(),
        };

        let raw = self.raw_values(&selected)?;
        let substituted: AttributeTable = raw
            .iter()
            .map(|column| {
                let values = match &self.substitutions {
                    Some(subs) => column
                        .values
                        .iter()
                        .map(|v| subs.substitute(&column.name, v))
                        .collect(),
                    None => column.values.clone(),
                };
                (column.name.clone(), values)
            })
            .collect();

        Ok(repair_table(substituted, &self.display_name()))
    }

    /// Users filter by substituted values while the layer stores originals.
    /// Each filter value maps to every original that substitutes to it, in
    /// the layer's own value type; values without a substitution pass through.
    fn original_values(
        &self,
        attribute: &str,
        values: &[AttributeValue],
    ) -> Result<Vec<AttributeValue>, AttributeError> {
        let Some(subs) = self.substitutions.as_ref().filter(|s| s.covers(attribute)) else {
            return Ok(values.to_vec());
        };

        let raw = self.raw_values(&[attribute.to_string()])?;
        let stored = raw.get(attribute).unwrap_or_default();

        let mut originals = Vec::new();
        for value in values {
            let matches = subs.originals(attribute, value);
            if matches.is_empty() {
                originals.push(value.clone());
                continue;
            }
            for original in matches {
                let typed = stored
                    .iter()
                    .find(|s| s.as_text() == original)
                    .cloned()
                    .unwrap_or(AttributeValue::Text(original));
                if !originals.contains(&typed) {
                    originals.push(typed);
                }
            }
        }
        Ok(originals)
    }
}
