//! Disturbance type names from either database flavour.

use std::collections::BTreeSet;

use rusqlite::{params, Connection};
use walltowall_core::errors::StorageError;

/// Where the vocabulary lives in a given database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VocabularyTable {
    /// Archive index database: `tblDisturbanceTypeDefault.DistTypeName`.
    ArchiveIndex,
    /// GCBM input database: `disturbance_type.name`.
    InputDatabase,
}

impl VocabularyTable {
    fn query(self) -> &'static str {
        match self {
            Self::ArchiveIndex => "SELECT DistTypeName FROM tblDisturbanceTypeDefault",
            Self::InputDatabase => "SELECT name FROM disturbance_type",
        }
    }
}

fn table_exists(conn: &Connection, table: &str) -> Result<bool, StorageError> {
    conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1 COLLATE NOCASE",
        params![table],
        |row| row.get::<_, i64>(0),
    )
    .map(|count| count > 0)
    .map_err(|e| StorageError::SqliteError { message: e.to_string() })
}

/// Detect which vocabulary table the database carries.
pub fn detect_table(conn: &Connection) -> Result<Option<VocabularyTable>, StorageError> {
    if table_exists(conn, "tblDisturbanceTypeDefault")? {
        return Ok(Some(VocabularyTable::ArchiveIndex));
    }
    if table_exists(conn, "disturbance_type")? {
        return Ok(Some(VocabularyTable::InputDatabase));
    }
    Ok(None)
}

/// All non-empty disturbance type names in `table`.
pub fn query_disturbance_types(
    conn: &Connection,
    table: VocabularyTable,
) -> Result<BTreeSet<String>, StorageError> {
    let mut stmt = conn
        .prepare(table.query())
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;

    let rows = stmt
        .query_map([], |row| row.get::<_, Option<String>>(0))
        .map_err(|e| StorageError::SqliteError { message: e.to_string() })?;

    let mut names = BTreeSet::new();
    for row in rows {
        let name = row.map_err(|e| StorageError::SqliteError { message: e.to_string() })?;
        if let Some(name) = name.filter(|n| !n.trim().is_empty()) {
            names.insert(name);
        }
    }
    Ok(names)
}
