//! Configuration management.
//!
//! Resolves where the database lives and where export files go by default.
//!
//! # Layout
//!
//! - **Database**: `~/.userbook/data/userbook.db` unless overridden
//! - **Test database**: `~/.userbook/test/userbook.db` when `USERBOOK_TEST_DB` is set
//! - **Exports**: `users_export.csv` / `users_export.json` in the working directory

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::sync::SyncFormat;

/// Environment variable holding an explicit database path.
pub const DB_ENV: &str = "USERBOOK_DB";

/// Environment variable that switches to the isolated test database.
pub const TEST_DB_ENV: &str = "USERBOOK_TEST_DB";

/// Get the global userbook directory (`~/.userbook`).
#[must_use]
pub fn global_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".userbook"))
}

/// Check if test mode is enabled.
///
/// Any non-empty value other than `0` or `false` enables it.
#[must_use]
pub fn is_test_mode() -> bool {
    std::env::var(TEST_DB_ENV).is_ok_and(|v| is_truthy(&v))
}

fn is_truthy(value: &str) -> bool {
    !value.is_empty() && value != "0" && !value.eq_ignore_ascii_case("false")
}

/// Get the test database path (`~/.userbook/test/userbook.db`).
#[must_use]
pub fn test_db_path() -> Option<PathBuf> {
    global_dir().map(|dir| dir.join("test").join("userbook.db"))
}

/// Resolve the database path.
///
/// Priority:
/// 1. `explicit_path` (the `--db` flag, which clap also fills from `USERBOOK_DB`)
/// 2. `USERBOOK_TEST_DB` → the test database
/// 3. Global location: `~/.userbook/data/userbook.db`
///
/// # Errors
///
/// Returns `Config` if no home directory can be determined.
pub fn resolve_db_path(explicit_path: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit_path {
        return Ok(path.to_path_buf());
    }

    let resolved = if is_test_mode() {
        test_db_path()
    } else {
        global_dir().map(|dir| dir.join("data").join("userbook.db"))
    };

    resolved.ok_or_else(|| {
        Error::Config(format!(
            "could not determine a home directory; pass --db or set {DB_ENV}"
        ))
    })
}

/// Export/import path used when none is given: the format's default file
/// name in the working directory.
#[must_use]
pub fn default_sync_path(format: SyncFormat) -> PathBuf {
    PathBuf::from(format.default_file_name())
}

/// Default path for `collect` output.
#[must_use]
pub fn default_collect_path() -> PathBuf {
    PathBuf::from("users_collected.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_db_path_with_explicit() {
        let explicit = PathBuf::from("/custom/path/users.db");
        assert_eq!(resolve_db_path(Some(&explicit)).unwrap(), explicit);
    }

    #[test]
    fn test_resolve_db_path_default_file_name() {
        let path = resolve_db_path(None).unwrap();
        assert!(path.ends_with("userbook.db"));
    }

    #[test]
    fn test_test_db_path_is_separate() {
        let global = global_dir().unwrap();
        let test = test_db_path().unwrap();

        assert!(test.starts_with(global.join("test")));
        assert_ne!(global.join("data").join("userbook.db"), test);
    }

    #[test]
    fn test_is_truthy() {
        assert!(!is_truthy(""));
        assert!(!is_truthy("0"));
        assert!(!is_truthy("FALSE"));
        assert!(is_truthy("1"));
        assert!(is_truthy("yes"));
    }

    #[test]
    fn test_default_sync_paths() {
        assert_eq!(
            default_sync_path(SyncFormat::Delimited),
            PathBuf::from("users_export.csv")
        );
        assert_eq!(
            default_sync_path(SyncFormat::Structured),
            PathBuf::from("users_export.json")
        );
    }
}
