//! Read-only connections.

use std::path::Path;

use rusqlite::{Connection, OpenFlags};
use walltowall_core::errors::StorageError;

/// Open an existing database read-only.
pub fn open_read_only(path: &Path) -> Result<Connection, StorageError> {
    if !path.is_file() {
        return Err(StorageError::DatabaseNotFound {
            path: path.display().to_string(),
        });
    }

    Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(|e| StorageError::SqliteError {
        message: e.to_string(),
    })
}
