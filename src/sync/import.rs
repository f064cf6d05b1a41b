//! Import functionality.
//!
//! Imports merge external records into the table; they never delete or
//! truncate. Every write goes through [`SqliteStorage`], which owns id
//! assignment and the `last_name` uniqueness check.
//!
//! Failure scope:
//! - missing source file, unreadable CSV header, or JSON that is not a
//!   well-formed array: the whole call fails and nothing is written
//! - a bad row (unparseable CSV line, bad field, storage error): logged,
//!   counted in `ImportStats::failed`, and the batch continues
//! - a row whose `last_name` is taken: counted in `ImportStats::skipped`

use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::Error;
use crate::model::ReplaceOutcome;
use crate::storage::sqlite::SqliteStorage;
use crate::sync::delimited::{CsvRow, parse_rows};
use crate::sync::file::read_source;
use crate::sync::hash::{has_changed, record_hash, user_hash};
use crate::sync::types::{ImportMode, ImportStats, SyncError, SyncFormat, SyncResult, UserRecord};
use crate::validate::parse_age;

/// Importer for CSV and JSON files.
pub struct Importer<'a> {
    storage: &'a mut SqliteStorage,
    mode: ImportMode,
}

/// Column positions resolved from a CSV header.
struct CsvColumns {
    name: usize,
    last_name: usize,
    age: Option<usize>,
    width: usize,
}

impl CsvColumns {
    fn from_header(path: &Path, header: &CsvRow) -> SyncResult<Self> {
        let position = |column: &str| {
            header.fields.iter().position(|f| {
                f.trim_start_matches('\u{feff}')
                    .trim()
                    .eq_ignore_ascii_case(column)
            })
        };
        let missing = |column: &str| SyncError::MalformedFile {
            path: path.to_path_buf(),
            message: format!("header has no `{column}` column"),
        };

        Ok(Self {
            name: position("name").ok_or_else(|| missing("name"))?,
            last_name: position("last_name").ok_or_else(|| missing("last_name"))?,
            age: position("age"),
            width: header.fields.len(),
        })
    }
}

impl<'a> Importer<'a> {
    /// Create a new importer with the specified mode.
    #[must_use]
    pub fn new(storage: &'a mut SqliteStorage, mode: ImportMode) -> Self {
        Self { storage, mode }
    }

    /// Import a file in the given format.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or malformed as a whole.
    pub fn import(&mut self, format: SyncFormat, path: &Path) -> SyncResult<ImportStats> {
        match format {
            SyncFormat::Delimited => self.import_delimited(path),
            SyncFormat::Structured => self.import_structured(path),
        }
    }

    /// Import users from a CSV file with a header row.
    ///
    /// Columns are matched by header name (`name`, `last_name`, optional
    /// `age`); `id` and `created_at` columns are ignored, so CSV imports
    /// always insert-or-ignore regardless of the importer's mode.
    ///
    /// # Errors
    ///
    /// Returns `FileNotFound` if the file does not exist, and
    /// `MalformedFile` if it has no usable header.
    pub fn import_delimited(&mut self, path: &Path) -> SyncResult<ImportStats> {
        let text = read_source(path)?;
        let mut rows = parse_rows(&text).into_iter();

        let header = match rows.next() {
            Some(Ok(header)) => header,
            Some(Err(e)) => {
                return Err(SyncError::MalformedFile {
                    path: path.to_path_buf(),
                    message: format!("unreadable header at line {}: {}", e.line, e.message),
                });
            }
            None => {
                return Err(SyncError::MalformedFile {
                    path: path.to_path_buf(),
                    message: "file is empty, expected a header row".to_string(),
                });
            }
        };
        let columns = CsvColumns::from_header(path, &header)?;

        let mut stats = ImportStats::default();
        for row in rows {
            stats.seen += 1;

            let row = match row {
                Ok(row) => row,
                Err(e) => {
                    warn!(line = e.line, error = %e.message, "skipping unreadable CSV row");
                    stats.failed += 1;
                    continue;
                }
            };

            match record_from_row(&columns, &row) {
                Ok(record) => self.insert_or_ignore(&record, row.line, &mut stats),
                Err(e) => {
                    warn!(line = row.line, error = %e, "skipping malformed CSV row");
                    stats.failed += 1;
                }
            }
        }

        log_summary(SyncFormat::Delimited, path, &stats);
        Ok(stats)
    }

    /// Import users from a JSON array file.
    ///
    /// In `InsertOrReplace` mode, records carrying an `id` are written under
    /// that id; all other records are insert-or-ignore.
    ///
    /// # Errors
    ///
    /// Returns `FileNotFound` if the file does not exist, and
    /// `MalformedFile` if it is not a well-formed JSON array.
    pub fn import_structured(&mut self, path: &Path) -> SyncResult<ImportStats> {
        let text = read_source(path)?;

        let malformed = |message: String| SyncError::MalformedFile {
            path: path.to_path_buf(),
            message,
        };
        let value: serde_json::Value =
            serde_json::from_str(&text).map_err(|e| malformed(e.to_string()))?;
        let serde_json::Value::Array(items) = value else {
            return Err(malformed("expected a JSON array of users".to_string()));
        };

        let mut stats = ImportStats::default();
        for (index, item) in items.into_iter().enumerate() {
            let position = index + 1;
            stats.seen += 1;

            let record: UserRecord = match serde_json::from_value(item) {
                Ok(record) => record,
                Err(e) => {
                    warn!(position, error = %e, "skipping malformed JSON record");
                    stats.failed += 1;
                    continue;
                }
            };

            match (self.mode, record.id) {
                (ImportMode::InsertOrReplace, Some(id)) => {
                    self.insert_or_replace(id, &record, position, &mut stats);
                }
                _ => self.insert_or_ignore(&record, position, &mut stats),
            }
        }

        log_summary(SyncFormat::Structured, path, &stats);
        Ok(stats)
    }

    /// Create a row for the record; a taken `last_name` is a skip, not a failure.
    fn insert_or_ignore(&mut self, record: &UserRecord, position: usize, stats: &mut ImportStats) {
        match self
            .storage
            .create_user(&record.name, &record.last_name, record.age)
        {
            Ok(id) => {
                debug!(position, id, "imported user");
                stats.created += 1;
            }
            Err(Error::DuplicateKey { family_name }) => {
                debug!(position, family_name = %family_name, "last name taken, skipping");
                stats.skipped += 1;
            }
            Err(e) => {
                warn!(position, name = %record.name, error = %e, "failed to import user");
                stats.failed += 1;
            }
        }
    }

    /// Write the record under its explicit id, overwriting a stored row.
    fn insert_or_replace(
        &mut self,
        id: i64,
        record: &UserRecord,
        position: usize,
        stats: &mut ImportStats,
    ) {
        let stored_hash = match self.storage.get_user(id) {
            Ok(existing) => existing.as_ref().map(user_hash),
            Err(e) => {
                warn!(position, id, error = %e, "failed to read stored user");
                stats.failed += 1;
                return;
            }
        };

        if !has_changed(&record_hash(record), stored_hash.as_deref()) {
            debug!(position, id, "record unchanged");
            stats.unchanged += 1;
            return;
        }

        match self.storage.replace_user(
            id,
            &record.name,
            &record.last_name,
            record.age,
            record.created_at.as_deref(),
        ) {
            Ok(ReplaceOutcome::Inserted) => {
                debug!(position, id, "inserted under explicit id");
                stats.replaced += 1;
            }
            Ok(ReplaceOutcome::Replaced) => {
                debug!(position, id, "replaced user");
                stats.replaced += 1;
            }
            Err(Error::DuplicateKey { family_name }) => {
                debug!(position, id, %family_name, "last name taken by another row, skipping");
                stats.skipped += 1;
            }
            Err(e) => {
                warn!(position, id, error = %e, "failed to replace user");
                stats.failed += 1;
            }
        }
    }
}

/// Build a record from a CSV data row.
fn record_from_row(columns: &CsvColumns, row: &CsvRow) -> crate::error::Result<UserRecord> {
    if row.fields.len() != columns.width {
        return Err(Error::MalformedInput(format!(
            "expected {} fields, found {}",
            columns.width,
            row.fields.len()
        )));
    }

    let age = match columns.age {
        Some(i) => parse_age(&row.fields[i])?,
        None => None,
    };

    Ok(UserRecord {
        id: None,
        name: row.fields[columns.name].clone(),
        last_name: row.fields[columns.last_name].clone(),
        age,
        created_at: None,
    })
}

fn log_summary(format: SyncFormat, path: &Path, stats: &ImportStats) {
    info!(
        %format,
        path = %path.display(),
        seen = stats.seen,
        created = stats.created,
        replaced = stats.replaced,
        unchanged = stats.unchanged,
        skipped = stats.skipped,
        failed = stats.failed,
        "import complete"
    );
}
