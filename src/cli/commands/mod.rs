//! Command implementations.

pub mod collect;
pub mod completions;
pub mod init;
pub mod sync;
pub mod user;
pub mod version;

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::resolve_db_path;
use crate::error::{Error, Result};
use crate::storage::SqliteStorage;

/// Open an existing database; reading never creates one.
pub(crate) fn open_existing(db_path: Option<&PathBuf>) -> Result<SqliteStorage> {
    let db_path = resolve_db_path(db_path.map(PathBuf::as_path))?;
    if !db_path.exists() {
        return Err(Error::NotInitialized);
    }
    SqliteStorage::open(&db_path)
}

/// Open the database, creating it and its directory if needed.
pub(crate) fn open_or_create(db_path: Option<&PathBuf>) -> Result<SqliteStorage> {
    let db_path = resolve_db_path(db_path.map(PathBuf::as_path))?;
    ensure_parent_dir(&db_path)?;
    SqliteStorage::open(&db_path)
}

pub(crate) fn ensure_parent_dir(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|e| Error::StorageUnavailable {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
        }
        _ => Ok(()),
    }
}
