//! Extra input-database files: disturbance rules and rule-based disturbances.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use walltowall_core::errors::ProjectError;

pub const DISTURBANCE_RULES_FILE: &str = "disturbance_rules.json";
pub const RULE_BASED_DISTURBANCES_FILE: &str = "rule_based_disturbances.csv";

/// Copy the disturbance rules file into `output_dir`.
pub fn copy_disturbance_rules(source: &Path, output_dir: &Path) -> Result<PathBuf, ProjectError> {
    let destination = output_dir.join(DISTURBANCE_RULES_FILE);
    std::fs::copy(source, &destination).map_err(|e| ProjectError::io(source, e))?;
    Ok(destination)
}

/// Concatenate rule-based disturbance tables. The header is the union of
/// every source's columns in first-seen order; missing cells are empty.
pub fn concat_rule_based_disturbances(
    sources: &[PathBuf],
    output_dir: &Path,
) -> Result<PathBuf, ProjectError> {
    let mut header: Vec<String> = Vec::new();
    let mut rows: Vec<BTreeMap<String, String>> = Vec::new();

    for source in sources {
        let mut reader = csv::Reader::from_path(source).map_err(|e| ProjectError::io(source, e))?;
        let source_header: Vec<String> = reader
            .headers()
            .map_err(|e| ProjectError::io(source, e))?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').to_string())
            .collect();
        for column in &source_header {
            if !header.contains(column) {
                header.push(column.clone());
            }
        }

        for record in reader.records() {
            let record = record.map_err(|e| ProjectError::io(source, e))?;
            rows.push(
                source_header
                    .iter()
                    .cloned()
                    .zip(record.iter().map(str::to_string))
                    .collect(),
            );
        }
    }

    let destination = output_dir.join(RULE_BASED_DISTURBANCES_FILE);
    let mut writer = csv::Writer::from_path(&destination).map_err(|e| ProjectError::io(&destination, e))?;
    writer
        .write_record(&header)
        .map_err(|e| ProjectError::io(&destination, e))?;
    for row in &rows {
        writer
            .write_record(header.iter().map(|c| row.get(c).map_or("", String::as_str)))
            .map_err(|e| ProjectError::io(&destination, e))?;
    }
    writer.flush().map_err(|e| ProjectError::io(&destination, e))?;

    tracing::info!(
        path = %destination.display(),
        sources = sources.len(),
        rows = rows.len(),
        "wrote rule-based disturbances"
    );
    Ok(destination)
}
