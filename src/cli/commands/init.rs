//! Create the userbook database.
//!
//! `init` is optional: `add`, `import` and `collect` create the database on
//! first use. Read-only commands refuse to create one and report
//! `NOT_INITIALIZED` instead.

use crate::cli::commands::ensure_parent_dir;
use crate::config::resolve_db_path;
use crate::error::{Error, Result};
use crate::storage::SqliteStorage;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

#[derive(Serialize)]
struct InitOutput {
    database: PathBuf,
    recreated: bool,
}

/// Execute the init command.
///
/// With `force`, an existing database file is deleted and recreated empty.
///
/// # Errors
///
/// Returns `AlreadyInitialized` if the database exists and `force` is not
/// set, or an error if the file cannot be created.
pub fn execute(force: bool, db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let db_path = resolve_db_path(db_path.map(PathBuf::as_path))?;

    let exists = db_path.exists();
    if exists && !force {
        return Err(Error::AlreadyInitialized { path: db_path });
    }
    if exists {
        fs::remove_file(&db_path)?;
    }

    ensure_parent_dir(&db_path)?;
    SqliteStorage::open(&db_path)?;

    if json {
        let output = InitOutput {
            database: db_path,
            recreated: exists,
        };
        let payload = serde_json::to_string(&output)?;
        println!("{payload}");
    } else {
        println!("Initialized userbook database");
        println!("  Database: {}", db_path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_creates_database_and_directory() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("nested").join("users.db");

        execute(false, Some(&db_path), true).unwrap();
        assert!(db_path.exists());

        let storage = SqliteStorage::open(&db_path).unwrap();
        assert_eq!(storage.count_users().unwrap(), 0);
    }

    #[test]
    fn test_init_fails_if_already_initialized() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("users.db");

        execute(false, Some(&db_path), true).unwrap();
        let result = execute(false, Some(&db_path), true);
        assert!(matches!(result, Err(Error::AlreadyInitialized { .. })));
    }

    #[test]
    fn test_init_force_recreates_empty() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("users.db");

        execute(false, Some(&db_path), true).unwrap();
        SqliteStorage::open(&db_path)
            .unwrap()
            .create_user("Ann", "Lee", None)
            .unwrap();

        execute(true, Some(&db_path), true).unwrap();
        let storage = SqliteStorage::open(&db_path).unwrap();
        assert_eq!(storage.count_users().unwrap(), 0);
    }
}
