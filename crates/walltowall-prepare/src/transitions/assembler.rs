//! Merging tiler-produced and user-supplied transition rules into the
//! single table the input database imports.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use uuid::Uuid;
use walltowall_core::errors::TransitionError;
use walltowall_core::types::TransitionCategory;

use super::columns::{
    self, AGE_AFTER, AGE_RESET_TYPE, DEFAULT_AGE_RESET_TYPE, DEFAULT_REGEN_DELAY,
    DISTURBANCE_TYPE, ID, REGEN_DELAY, WILDCARD,
};

type Row = BTreeMap<String, String>;

/// Outputs of one assembly pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreparedTransitions {
    pub disturbed: Option<PathBuf>,
    pub undisturbed: Option<PathBuf>,
}

/// Merges transition-rule sources into a rectangular table: every row
/// carries every column, defaults filled, ids generated where missing.
#[derive(Debug, Clone, Default)]
pub struct TransitionRuleAssembler {
    classifiers: Vec<String>,
    user_rules: Option<PathBuf>,
    user_rules_undisturbed: Option<PathBuf>,
}

impl TransitionRuleAssembler {
    /// `classifiers` are the project's classifier names; each gets a column
    /// and a `<classifier>_match` column even when no source mentions it.
    pub fn new(classifiers: Vec<String>) -> Self {
        Self {
            classifiers,
            user_rules: None,
            user_rules_undisturbed: None,
        }
    }

    pub fn with_user_rules(mut self, path: Option<PathBuf>) -> Self {
        self.user_rules = path;
        self
    }

    pub fn with_user_rules_undisturbed(mut self, path: Option<PathBuf>) -> Self {
        self.user_rules_undisturbed = path;
        self
    }

    /// Remove previous outputs, then merge both the disturbed and the
    /// undisturbed rules found in `tiler_dir` with the user's files.
    pub fn prepare(
        &self,
        tiler_dir: &Path,
        output_path: &Path,
    ) -> Result<PreparedTransitions, TransitionError> {
        let undisturbed_path = undisturbed_output_path(output_path);
        for stale in [output_path, undisturbed_path.as_path()] {
            remove_stale(stale)?;
        }

        Ok(PreparedTransitions {
            disturbed: self.merge(tiler_dir, output_path)?,
            undisturbed: self.merge_undisturbed(tiler_dir, &undisturbed_path)?,
        })
    }

    /// Merge the tiler's `transition_rules.csv` with the user's rule file.
    /// Returns `None` when neither exists.
    pub fn merge(
        &self,
        tiler_dir: &Path,
        output_path: &Path,
    ) -> Result<Option<PathBuf>, TransitionError> {
        let tiler_rules = tiler_dir.join(TransitionCategory::Disturbed.file_name());
        merge_rules(&tiler_rules, self.user_rules.as_deref(), &self.classifiers, output_path)
    }

    /// Same as [`Self::merge`] for rules applied to undisturbed pixels.
    pub fn merge_undisturbed(
        &self,
        tiler_dir: &Path,
        output_path: &Path,
    ) -> Result<Option<PathBuf>, TransitionError> {
        let tiler_rules = tiler_dir.join(TransitionCategory::Undisturbed.file_name());
        merge_rules(
            &tiler_rules,
            self.user_rules_undisturbed.as_deref(),
            &self.classifiers,
            output_path,
        )
    }
}

/// `gcbmwalltowall_transitions.csv` → `gcbmwalltowall_undisturbed_transitions.csv`
pub fn undisturbed_output_path(output_path: &Path) -> PathBuf {
    let file_name = output_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let renamed = match file_name.split_once('_') {
        Some((head, tail)) => format!("{head}_undisturbed_{tail}"),
        None => format!("undisturbed_{file_name}"),
    };
    output_path.with_file_name(renamed)
}

fn remove_stale(path: &Path) -> Result<(), TransitionError> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "removed previous transition rules");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(TransitionError::Write {
            path: path.display().to_string(),
            message: e.to_string(),
        }),
    }
}

/// Rows of one CSV source plus its header.
fn read_rows(path: &Path) -> Result<(Vec<String>, Vec<Row>), TransitionError> {
    let read_err = |message: String| TransitionError::Read {
        path: path.display().to_string(),
        message,
    };

    let mut reader = csv::Reader::from_path(path).map_err(|e| read_err(e.to_string()))?;
    let header: Vec<String> = reader
        .headers()
        .map_err(|e| read_err(e.to_string()))?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| read_err(e.to_string()))?;
        let row: Row = header
            .iter()
            .zip(record.iter())
            .map(|(column, value)| (column.clone(), value.to_string()))
            .collect();
        rows.push(row);
    }
    Ok((header, rows))
}

/// Pool rows from the tiler file then the user file, fill defaults and
/// write one rectangular table.
///
/// A configured user file that does not exist is an error; a missing tiler
/// file only means tiling registered no rules.
pub fn merge_rules(
    tiler_rules: &Path,
    user_rules: Option<&Path>,
    classifiers: &[String],
    output_path: &Path,
) -> Result<Option<PathBuf>, TransitionError> {
    if let Some(user_rules) = user_rules {
        if !user_rules.is_file() {
            return Err(TransitionError::Read {
                path: user_rules.display().to_string(),
                message: "file not found".to_string(),
            });
        }
    }

    let sources: Vec<&Path> = std::iter::once(tiler_rules)
        .filter(|p| p.is_file())
        .chain(user_rules)
        .collect();
    if sources.is_empty() {
        return Ok(None);
    }

    let mut seen_columns: BTreeSet<String> = BTreeSet::new();
    let mut rows: Vec<Row> = Vec::new();
    for source in &sources {
        let (header, source_rows) = read_rows(source)?;
        tracing::debug!(path = %source.display(), rows = source_rows.len(), "read transition rules");
        seen_columns.extend(header);
        rows.extend(source_rows);
    }

    let mut all_columns: BTreeSet<String> = seen_columns;
    all_columns.extend(
        [ID, DISTURBANCE_TYPE, AGE_RESET_TYPE, REGEN_DELAY, AGE_AFTER]
            .into_iter()
            .map(str::to_string),
    );
    for classifier in classifiers {
        all_columns.insert(classifier.clone());
        all_columns.insert(columns::match_column(classifier));
    }
    let header = columns::order_columns(all_columns);

    for row in &mut rows {
        fill_defaults(row, &header);
    }

    write_rows(output_path, &header, &rows)?;
    tracing::info!(
        path = %output_path.display(),
        rows = rows.len(),
        sources = sources.len(),
        "merged transition rules"
    );
    Ok(Some(output_path.to_path_buf()))
}

fn default_value(column: &str) -> String {
    match column {
        ID => Uuid::new_v4().to_string(),
        DISTURBANCE_TYPE | AGE_AFTER => String::new(),
        AGE_RESET_TYPE => DEFAULT_AGE_RESET_TYPE.to_string(),
        REGEN_DELAY => DEFAULT_REGEN_DELAY.to_string(),
        c if columns::is_match_column(c) => String::new(),
        _ => WILDCARD.to_string(),
    }
}

/// Fill every column missing from `row`. A blank id counts as missing.
fn fill_defaults(row: &mut Row, header: &[String]) {
    for column in header {
        let missing = match row.get(column) {
            None => true,
            Some(value) => column == ID && value.trim().is_empty(),
        };
        if missing {
            row.insert(column.clone(), default_value(column));
        }
    }
}

fn write_rows(path: &Path, header: &[String], rows: &[Row]) -> Result<(), TransitionError> {
    let write_err = |message: String| TransitionError::Write {
        path: path.display().to_string(),
        message,
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| write_err(e.to_string()))?;
    }

    let mut writer = csv::Writer::from_path(path).map_err(|e| write_err(e.to_string()))?;
    writer.write_record(header).map_err(|e| write_err(e.to_string()))?;
    for row in rows {
        let record = header.iter().map(|column| row.get(column).map_or("", String::as_str));
        writer.write_record(record).map_err(|e| write_err(e.to_string()))?;
    }
    writer.flush().map_err(|e| write_err(e.to_string()))
}
