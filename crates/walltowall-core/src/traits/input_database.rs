//! The external input-database builder.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Classifier information the database builder needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierDefinition {
    pub name: String,
    pub values_path: Option<PathBuf>,
    /// Column of the values table holding legal classifier values.
    pub values_column: Option<String>,
    pub yield_column: Option<String>,
}

/// Imports classifiers, yields and transition rules into a queryable database.
pub trait InputDatabaseBuilder {
    fn create(
        &self,
        classifiers: &[ClassifierDefinition],
        output_path: &Path,
        transition_rules_path: Option<&Path>,
    ) -> Result<(), String>;
}
