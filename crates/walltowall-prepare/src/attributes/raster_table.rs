//! Raster attribute tables backed by a CSV lookup table.

use std::path::{Path, PathBuf};

use walltowall_core::errors::AttributeError;
use walltowall_core::traits::AttributeSource;
use walltowall_core::types::{AttributeTable, AttributeValue};

/// Parse one CSV cell the way a typed table reader would: integers, then
/// reals, then text. Empty cells are null.
pub(crate) fn parse_cell(cell: &str) -> AttributeValue {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return AttributeValue::Null;
    }
    if let Ok(v) = trimmed.parse::<i64>() {
        return AttributeValue::Integer(v);
    }
    if let Ok(v) = trimmed.parse::<f64>() {
        return AttributeValue::Real(v);
    }
    AttributeValue::Text(cell.to_string())
}

/// Attribute table of a raster layer: the first column of the lookup table
/// is the pixel value, the remaining columns are attributes.
#[derive(Debug, Clone)]
pub struct RasterAttributeTable {
    layer_path: PathBuf,
    table: AttributeTable,
}

impl RasterAttributeTable {
    pub fn open(layer_path: &Path, lookup_path: &Path) -> Result<Self, AttributeError> {
        if !layer_path.exists() {
            return Err(AttributeError::LayerNotFound {
                path: layer_path.display().to_string(),
            });
        }

        let table_err = |message: String| AttributeError::TableRead {
            path: lookup_path.display().to_string(),
            message,
        };

        let mut reader = csv::Reader::from_path(lookup_path).map_err(|e| table_err(e.to_string()))?;
        let header: Vec<String> = reader
            .headers()
            .map_err(|e| table_err(e.to_string()))?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').to_string())
            .collect();

        let mut columns: Vec<Vec<AttributeValue>> = vec![Vec::new(); header.len()];
        for record in reader.records() {
            let record = record.map_err(|e| table_err(e.to_string()))?;
            for (column, cell) in columns.iter_mut().zip(record.iter()) {
                let value = parse_cell(cell);
                if !column.contains(&value) {
                    column.push(value);
                }
            }
        }

        let table = header
            .into_iter()
            .zip(columns)
            .skip(1)
            .collect::<AttributeTable>();

        tracing::debug!(
            layer = %layer_path.display(),
            attributes = table.len(),
            "read raster attribute table"
        );

        Ok(Self {
            layer_path: layer_path.to_path_buf(),
            table,
        })
    }

    /// A raster without a lookup table: pixel values only, no attributes.
    pub fn without_attributes(layer_path: &Path) -> Result<Self, AttributeError> {
        if !layer_path.exists() {
            return Err(AttributeError::LayerNotFound {
                path: layer_path.display().to_string(),
            });
        }
        Ok(Self {
            layer_path: layer_path.to_path_buf(),
            table: AttributeTable::new(),
        })
    }
}

impl AttributeSource for RasterAttributeTable {
    fn attribute_names(&self) -> Result<Vec<String>, AttributeError> {
        Ok(self.table.names().map(str::to_string).collect())
    }

    fn unique_values(&self, attributes: Option<&[String]>) -> Result<AttributeTable, AttributeError> {
        let Some(attributes) = attributes else {
            return Ok(self.table.clone());
        };

        let mut selected = AttributeTable::new();
        for attribute in attributes {
            let values = self.table.get(attribute).ok_or_else(|| {
                AttributeError::UnknownAttribute {
                    attribute: attribute.clone(),
                    path: self.layer_path.display().to_string(),
                }
            })?;
            selected.insert(attribute.clone(), values.to_vec());
        }
        Ok(selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_parse_by_type() {
        assert_eq!(parse_cell("1990"), AttributeValue::Integer(1990));
        assert_eq!(parse_cell("0.5"), AttributeValue::Real(0.5));
        assert_eq!(parse_cell("Wildfire"), AttributeValue::Text("Wildfire".into()));
        assert_eq!(parse_cell("  "), AttributeValue::Null);
    }
}
