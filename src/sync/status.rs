//! Sync status display.
//!
//! Reports how many users are stored and which export files exist on disk,
//! with a record count for each file that can still be parsed.

use std::fs;
use std::path::{Path, PathBuf};

use colored::Colorize;

use crate::storage::sqlite::SqliteStorage;
use crate::sync::delimited::parse_rows;
use crate::sync::file::file_size;
use crate::sync::types::{ExportFileInfo, SyncFormat, SyncResult, SyncStatus};

/// Get the current sync status.
///
/// Each of `paths` is checked on disk; missing files and files with an
/// unknown extension are left out.
///
/// # Errors
///
/// Returns an error if the database cannot be queried.
pub fn get_sync_status(storage: &SqliteStorage, paths: &[PathBuf]) -> SyncResult<SyncStatus> {
    let total_users = storage.count_users()?;

    let export_files = paths
        .iter()
        .filter(|path| path.is_file())
        .filter_map(|path| {
            let format = SyncFormat::from_path(path)?;
            Some(ExportFileInfo {
                path: path.clone(),
                format,
                size: file_size(path),
                records: count_records(format, path),
            })
        })
        .collect();

    Ok(SyncStatus {
        total_users,
        export_files,
    })
}

/// Count the user records in an export file, or `None` if it does not parse.
fn count_records(format: SyncFormat, path: &Path) -> Option<usize> {
    let text = fs::read_to_string(path).ok()?;
    match format {
        SyncFormat::Delimited => {
            let rows = parse_rows(&text);
            if rows.is_empty() || rows.iter().any(Result::is_err) {
                return None;
            }
            Some(rows.len() - 1)
        }
        SyncFormat::Structured => {
            let value: serde_json::Value = serde_json::from_str(&text).ok()?;
            value.as_array().map(Vec::len)
        }
    }
}

/// Print sync status to stdout in a human-readable format.
pub fn print_status(status: &SyncStatus) {
    println!("{}", "Sync Status".bold().underline());
    println!();

    println!("{}", "Database:".blue().bold());
    println!("  Users: {}", status.total_users);
    println!();

    if status.export_files.is_empty() {
        println!("{}", "No export files found.".dimmed());
        if status.total_users > 0 {
            println!(
                "{}",
                "Run 'userbook export --format csv' to create one.".dimmed()
            );
        }
        return;
    }

    println!("{}", "Export Files:".blue().bold());
    for file in &status.export_files {
        let records = file
            .records
            .map_or_else(|| "unreadable".red().to_string(), |n| format!("{n} records"));
        println!(
            "  {} [{}] ({}, {})",
            file.path.display(),
            file.format,
            format_size(file.size),
            records
        );
    }
}

/// Format a byte size as a human-readable string.
#[allow(clippy::cast_precision_loss)]
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * KB;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::export::Exporter;
    use tempfile::TempDir;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(1024), "1.0 KB");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(1024 * 1024), "1.0 MB");
    }

    #[test]
    fn test_get_sync_status_empty() {
        let temp_dir = TempDir::new().unwrap();
        let storage = SqliteStorage::open(&temp_dir.path().join("test.db")).unwrap();
        let paths = vec![temp_dir.path().join("users_export.csv")];

        let status = get_sync_status(&storage, &paths).unwrap();
        assert_eq!(status.total_users, 0);
        assert!(status.export_files.is_empty());
    }

    #[test]
    fn test_get_sync_status_with_export_files() {
        let temp_dir = TempDir::new().unwrap();
        let mut storage = SqliteStorage::open_memory().unwrap();
        storage.create_user("Ann", "Lee", None).unwrap();
        storage.create_user("Bo", "Park", Some(41)).unwrap();

        let csv = temp_dir.path().join("users_export.csv");
        let json = temp_dir.path().join("users_export.json");
        let exporter = Exporter::new(&storage);
        exporter.export_delimited(&csv).unwrap();
        exporter.export_structured(&json).unwrap();

        let status = get_sync_status(&storage, &[csv.clone(), json]).unwrap();
        assert_eq!(status.total_users, 2);
        assert_eq!(status.export_files.len(), 2);
        assert_eq!(status.export_files[0].path, csv);
        assert_eq!(status.export_files[0].records, Some(2));
        assert_eq!(status.export_files[1].format, SyncFormat::Structured);
        assert_eq!(status.export_files[1].records, Some(2));
    }

    #[test]
    fn test_unparseable_file_has_no_count() {
        let temp_dir = TempDir::new().unwrap();
        let storage = SqliteStorage::open_memory().unwrap();
        let json = temp_dir.path().join("broken.json");
        fs::write(&json, "{not json").unwrap();

        let status = get_sync_status(&storage, &[json]).unwrap();
        assert_eq!(status.export_files.len(), 1);
        assert_eq!(status.export_files[0].records, None);
    }
}
