//! Export functionality.
//!
//! # Snapshot Mode
//!
//! An export is a snapshot of the whole `users` table, not a log of
//! changes. The full file content is rendered in memory first and then
//! written with [`atomic_write`], so a failed export leaves any previous
//! file in place. How atomic the final rename is depends on the filesystem.

use std::path::Path;

use tracing::info;

use crate::model::User;
use crate::storage::sqlite::SqliteStorage;
use crate::sync::delimited::format_row;
use crate::sync::file::atomic_write;
use crate::sync::types::{DELIMITED_HEADER, ExportStats, SyncFormat, SyncResult, UserRecord};

/// Exporter for CSV and JSON snapshot files.
pub struct Exporter<'a> {
    storage: &'a SqliteStorage,
}

impl<'a> Exporter<'a> {
    /// Create a new exporter reading from `storage`.
    #[must_use]
    pub fn new(storage: &'a SqliteStorage) -> Self {
        Self { storage }
    }

    /// Export all users to `path` in the given format.
    ///
    /// # Errors
    ///
    /// Returns an error if the table cannot be read or the file cannot be
    /// written.
    pub fn export(&self, format: SyncFormat, path: &Path) -> SyncResult<ExportStats> {
        let users = self.storage.get_all_users()?;
        let records = users.len();

        let content = match format {
            SyncFormat::Delimited => render_delimited(&users),
            SyncFormat::Structured => render_structured(users)?,
        };

        atomic_write(path, &content)?;
        info!(%format, records, path = %path.display(), "export complete");

        Ok(ExportStats {
            records,
            bytes: content.len(),
        })
    }

    /// Export all users as CSV.
    ///
    /// # Errors
    ///
    /// See [`Exporter::export`].
    pub fn export_delimited(&self, path: &Path) -> SyncResult<ExportStats> {
        self.export(SyncFormat::Delimited, path)
    }

    /// Export all users as a JSON array.
    ///
    /// # Errors
    ///
    /// See [`Exporter::export`].
    pub fn export_structured(&self, path: &Path) -> SyncResult<ExportStats> {
        self.export(SyncFormat::Structured, path)
    }
}

/// Render users as CSV: the fixed header, then one line per user.
/// An absent age is an empty field.
#[must_use]
pub fn render_delimited(users: &[User]) -> String {
    let mut out = format_row(&DELIMITED_HEADER);
    for user in users {
        let id = user.id.to_string();
        let age = user.age.map(|a| a.to_string()).unwrap_or_default();
        out.push_str(&format_row(&[
            id.as_str(),
            user.given_name.as_str(),
            user.family_name.as_str(),
            age.as_str(),
            user.created_at.as_str(),
        ]));
    }
    out
}

/// Render users as a pretty-printed JSON array.
///
/// `serde_json` writes non-ASCII characters as-is, so names stay readable.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_structured(users: Vec<User>) -> SyncResult<String> {
    let records: Vec<UserRecord> = users.into_iter().map(UserRecord::from).collect();
    let mut out = serde_json::to_string_pretty(&records)?;
    out.push('\n');
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn user(id: i64, given: &str, family: &str, age: Option<i64>) -> User {
        User {
            id,
            given_name: given.into(),
            family_name: family.into(),
            age,
            created_at: "2026-10-19 08:00:00".into(),
        }
    }

    #[test]
    fn test_render_delimited() {
        let users = vec![
            user(1, "Alex", "Smith", Some(29)),
            user(2, "Bo", "Park, Jr.", None),
        ];
        let csv = render_delimited(&users);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "id,name,last_name,age,created_at");
        assert_eq!(lines[1], "1,Alex,Smith,29,2026-10-19 08:00:00");
        assert_eq!(lines[2], "2,Bo,\"Park, Jr.\",,2026-10-19 08:00:00");
    }

    #[test]
    fn test_render_delimited_empty_table_has_header() {
        assert_eq!(render_delimited(&[]), "id,name,last_name,age,created_at\n");
    }

    #[test]
    fn test_render_structured_keeps_non_ascii() {
        let json = render_structured(vec![user(1, "Алексей", "Логвинов", None)]).unwrap();
        assert!(json.contains("Алексей"));
        assert!(json.contains("\"age\": null"));
        assert!(json.starts_with("[\n  {\n    \"id\": 1,"));
    }

    #[test]
    fn test_export_writes_both_formats() {
        let temp_dir = TempDir::new().unwrap();
        let mut storage = SqliteStorage::open_memory().unwrap();
        storage.create_user("Alex", "Smith", Some(29)).unwrap();
        storage.create_user("Ann", "Lee", None).unwrap();

        let exporter = Exporter::new(&storage);

        let csv_path = temp_dir.path().join("users.csv");
        let stats = exporter.export_delimited(&csv_path).unwrap();
        assert_eq!(stats.records, 2);
        assert_eq!(fs::read_to_string(&csv_path).unwrap().lines().count(), 3);

        let json_path = temp_dir.path().join("users.json");
        let stats = exporter.export_structured(&json_path).unwrap();
        assert_eq!(stats.records, 2);
        let parsed: Vec<UserRecord> =
            serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(parsed[0].name, "Alex");
        assert_eq!(parsed[1].age, None);
        assert_eq!(stats.bytes as u64, crate::sync::file::file_size(&json_path));
    }

    #[test]
    fn test_database_failure_reports_database_error() {
        let temp_dir = TempDir::new().unwrap();
        let storage = SqliteStorage::open_memory().unwrap();
        storage.conn().execute_batch("DROP TABLE users").unwrap();

        let err: crate::error::Error = Exporter::new(&storage)
            .export_delimited(&temp_dir.path().join("users.csv"))
            .unwrap_err()
            .into();
        assert_eq!(err.error_code().as_str(), "DATABASE_ERROR");
        assert_eq!(err.exit_code(), 2);
    }
}
