//! Classifiers: a spatial layer plus the table of legal values.

use std::collections::BTreeSet;
use std::path::PathBuf;

use walltowall_core::config::ColumnRef;
use walltowall_core::errors::{ConfigError, ProjectError};
use walltowall_core::traits::{AttributeSourceFactory, ClassifierDefinition};
use walltowall_core::types::TilerLayer;

use crate::layer::Layer;

/// Header and columns of a classifier values table.
struct ValuesTable {
    header: Vec<String>,
    columns: Vec<BTreeSet<String>>,
}

impl ValuesTable {
    fn read(path: &std::path::Path) -> Result<Self, ConfigError> {
        let parse_err = |message: String| ConfigError::ParseError {
            path: path.display().to_string(),
            message,
        };

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(|_| ConfigError::FileNotFound {
                path: path.display().to_string(),
            })?;
        let header: Vec<String> = reader
            .headers()
            .map_err(|e| parse_err(e.to_string()))?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();

        let mut columns = vec![BTreeSet::new(); header.len()];
        for record in reader.records() {
            let record = record.map_err(|e| parse_err(e.to_string()))?;
            for (column, cell) in columns.iter_mut().zip(record.iter()) {
                let cell = cell.trim();
                if !cell.is_empty() {
                    column.insert(cell.to_string());
                }
            }
        }

        Ok(Self { header, columns })
    }

    fn column_named(&self, reference: &ColumnRef) -> Option<usize> {
        match reference {
            ColumnRef::Index(i) => (*i < self.header.len()).then_some(*i),
            ColumnRef::Name(name) => self.header.iter().position(|h| h == name),
        }
    }
}

/// A named classifier tiled from a layer, with an optional values table
/// (typically the growth-curve file) the input database is populated from.
#[derive(Debug, Clone, PartialEq)]
pub struct Classifier {
    pub name: String,
    pub layer: Layer,
    pub values_path: Option<PathBuf>,
    pub values_col: Option<ColumnRef>,
    pub yield_col: Option<ColumnRef>,
}

impl Classifier {
    pub fn new(name: impl Into<String>, layer: Layer) -> Self {
        Self {
            name: name.into(),
            layer,
            values_path: None,
            values_col: None,
            yield_col: None,
        }
    }

    pub fn with_values(mut self, values_path: impl Into<PathBuf>) -> Self {
        self.values_path = Some(values_path.into());
        self
    }

    pub fn to_tiler_layer(
        &self,
        factory: &dyn AttributeSourceFactory,
    ) -> Result<TilerLayer, ProjectError> {
        let mut layer = self.layer.to_tiler_layer(factory)?;
        layer.name = self.name.clone();
        Ok(layer)
    }

    /// Resolve the values and yield columns for the input-database builder.
    ///
    /// The values column is, in order: the configured column; a column named
    /// after the classifier; the single column containing every value found
    /// in the layer. Several candidates is an error, as is none.
    pub fn definition(
        &self,
        factory: &dyn AttributeSourceFactory,
    ) -> Result<ClassifierDefinition, ProjectError> {
        let Some(values_path) = &self.values_path else {
            return Ok(ClassifierDefinition {
                name: self.name.clone(),
                values_path: None,
                values_column: None,
                yield_column: None,
            });
        };

        let table = ValuesTable::read(values_path)?;
        let not_found = || ConfigError::ClassifierColumnNotFound {
            classifier: self.name.clone(),
            path: values_path.display().to_string(),
        };

        let layer_values = self.layer_values(factory)?;
        let values_index = match &self.values_col {
            Some(reference) => table.column_named(reference).ok_or_else(not_found)?,
            None => self.match_values_column(&table, &layer_values, values_path)?,
        };

        let orphans: Vec<&String> = layer_values
            .iter()
            .filter(|v| !table.columns[values_index].contains(*v))
            .collect();
        if !orphans.is_empty() {
            tracing::warn!(
                classifier = %self.name,
                column = %table.header[values_index],
                count = orphans.len(),
                sample = ?orphans.iter().take(5).collect::<Vec<_>>(),
                "classifier values in layer but not in values table"
            );
        }

        let yield_column = self
            .yield_col
            .as_ref()
            .map(|reference| {
                table
                    .column_named(reference)
                    .map(|i| table.header[i].clone())
                    .ok_or_else(not_found)
            })
            .transpose()?;

        Ok(ClassifierDefinition {
            name: self.name.clone(),
            values_path: Some(values_path.clone()),
            values_column: Some(table.header[values_index].clone()),
            yield_column,
        })
    }

    fn layer_values(
        &self,
        factory: &dyn AttributeSourceFactory,
    ) -> Result<BTreeSet<String>, ProjectError> {
        let Some(attribute) = &self.layer.attribute else {
            return Ok(BTreeSet::new());
        };
        let table = self
            .layer
            .attribute_table(factory)?
            .unique_values(Some(std::slice::from_ref(attribute)))?;
        Ok(table
            .get(attribute)
            .unwrap_or_default()
            .iter()
            .filter(|v| !v.is_null())
            .map(|v| v.as_text().trim().to_string())
            .collect())
    }

    fn match_values_column(
        &self,
        table: &ValuesTable,
        layer_values: &BTreeSet<String>,
        values_path: &std::path::Path,
    ) -> Result<usize, ConfigError> {
        if let Some(i) = table.header.iter().position(|h| h == &self.name) {
            return Ok(i);
        }
        if let Some(i) = table
            .header
            .iter()
            .position(|h| h.eq_ignore_ascii_case(&self.name))
        {
            return Ok(i);
        }

        if layer_values.is_empty() {
            return Err(ConfigError::ClassifierColumnNotFound {
                classifier: self.name.clone(),
                path: values_path.display().to_string(),
            });
        }

        let candidates: Vec<usize> = table
            .columns
            .iter()
            .enumerate()
            .filter(|(_, column)| layer_values.is_subset(column))
            .map(|(i, _)| i)
            .collect();

        match candidates.as_slice() {
            [single] => {
                tracing::info!(
                    classifier = %self.name,
                    column = %table.header[*single],
                    "matched classifier values column by content"
                );
                Ok(*single)
            }
            [] => Err(ConfigError::ClassifierColumnNotFound {
                classifier: self.name.clone(),
                path: values_path.display().to_string(),
            }),
            many => Err(ConfigError::AmbiguousClassifierColumn {
                classifier: self.name.clone(),
                candidates: many.iter().map(|i| table.header[*i].clone()).collect(),
            }),
        }
    }
}
