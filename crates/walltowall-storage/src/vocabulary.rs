//! Disturbance-type vocabulary backed by a database file.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use walltowall_core::errors::StorageError;
use walltowall_core::traits::DisturbanceTypeSource;

use crate::connection::open_read_only;
use crate::queries::disturbance_types::{detect_table, query_disturbance_types};

/// A database holding disturbance type definitions: an archive index
/// database or an already-built GCBM input database.
///
/// Every call re-reads the database; callers that need a stable snapshot
/// cache the result themselves.
#[derive(Debug, Clone)]
pub struct InputDatabase {
    path: PathBuf,
}

impl InputDatabase {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DisturbanceTypeSource for InputDatabase {
    fn disturbance_types(&self) -> Result<BTreeSet<String>, StorageError> {
        let conn = open_read_only(&self.path)?;
        let table = detect_table(&conn)?.ok_or_else(|| StorageError::VocabularyTableMissing {
            path: self.path.display().to_string(),
        })?;

        let types = query_disturbance_types(&conn, table)?;
        tracing::debug!(
            path = %self.path.display(),
            count = types.len(),
            "loaded disturbance type vocabulary"
        );
        Ok(types)
    }
}
