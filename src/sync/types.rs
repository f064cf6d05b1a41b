//! Sync types for CSV/JSON export and import.
//!
//! `UserRecord` is the shape of one user inside a JSON file. The CSV format
//! uses the same column names, listed in [`DELIMITED_HEADER`].

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};

use crate::model::User;
use crate::validate::parse_age;

/// Header line of every exported CSV file, in column order.
pub const DELIMITED_HEADER: [&str; 5] = ["id", "name", "last_name", "age", "created_at"];

/// External file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SyncFormat {
    /// Comma-separated values with a header row.
    #[serde(rename = "csv")]
    Delimited,
    /// A pretty-printed JSON array of objects.
    #[serde(rename = "json")]
    Structured,
}

impl SyncFormat {
    /// File name used when no path is given.
    #[must_use]
    pub const fn default_file_name(self) -> &'static str {
        match self {
            Self::Delimited => "users_export.csv",
            Self::Structured => "users_export.json",
        }
    }

    /// Guess the format from a file extension (`.csv` / `.json`).
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(Self::Delimited),
            "json" => Some(Self::Structured),
            _ => None,
        }
    }
}

impl fmt::Display for SyncFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Delimited => write!(f, "csv"),
            Self::Structured => write!(f, "json"),
        }
    }
}

/// One user as it appears in a JSON file.
///
/// Exported files carry every field. Hand-written or collected files may
/// omit `id` and `created_at`, and may spell `age` as a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub last_name: String,
    #[serde(default, deserialize_with = "deserialize_age")]
    pub age: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl From<User> for UserRecord {
    fn from(user: User) -> Self {
        Self {
            id: Some(user.id),
            name: user.given_name,
            last_name: user.family_name,
            age: user.age,
            created_at: Some(user.created_at),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAge {
    Number(i64),
    Text(String),
}

/// Accept `29`, `"29"`, `""`, `null` or a missing key.
fn deserialize_age<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<RawAge>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawAge::Number(n)) => Ok(Some(n)),
        Some(RawAge::Text(s)) => parse_age(&s).map_err(serde::de::Error::custom),
    }
}

/// How imported records are reconciled with stored rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImportMode {
    /// Insert every record; records whose `last_name` is taken are skipped.
    #[default]
    InsertOrIgnore,
    /// Records carrying an `id` overwrite the row with that id (or are
    /// inserted under it). Records without an `id` behave as
    /// `InsertOrIgnore`. Only the JSON format carries ids for this.
    InsertOrReplace,
}

/// Statistics for an export operation.
#[derive(Debug, Default, Clone, Serialize)]
pub struct ExportStats {
    /// Number of users written.
    pub records: usize,
    /// Size of the written file in bytes.
    pub bytes: usize,
}

/// Statistics for an import operation.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ImportStats {
    /// Rows read from the file, valid or not.
    pub seen: usize,
    /// New rows inserted with a storage-assigned id.
    pub created: usize,
    /// Rows written under an explicit id (inserted or overwritten).
    pub replaced: usize,
    /// Explicit-id rows identical to what is stored.
    pub unchanged: usize,
    /// Rows skipped because their `last_name` is already taken.
    pub skipped: usize,
    /// Rows that were malformed or failed to store.
    pub failed: usize,
}

impl ImportStats {
    /// Rows that changed the table.
    #[must_use]
    pub fn written(&self) -> usize {
        self.created + self.replaced
    }
}

/// Information about an export file.
#[derive(Debug, Clone, Serialize)]
pub struct ExportFileInfo {
    /// File path as given.
    pub path: PathBuf,
    /// Detected format.
    pub format: SyncFormat,
    /// File size in bytes.
    pub size: u64,
    /// Number of user records, or `None` if the file could not be parsed.
    pub records: Option<usize>,
}

/// Sync status information.
#[derive(Debug, Clone, Serialize)]
pub struct SyncStatus {
    /// Rows currently stored.
    pub total_users: usize,
    /// Export files that exist on disk.
    pub export_files: Vec<ExportFileInfo>,
}

/// Sync-specific errors.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Storage failure, carried with its original category.
    #[error(transparent)]
    Storage(#[from] crate::error::Error),

    /// Source file does not exist.
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// The file as a whole cannot be read as the expected format.
    #[error("Malformed file {}: {message}", .path.display())]
    MalformedFile {
        /// File being imported.
        path: PathBuf,
        /// Parser message.
        message: String,
    },
}

impl From<SyncError> for crate::error::Error {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::Io(e) => Self::Io(e),
            SyncError::Json(e) => Self::Json(e),
            SyncError::FileNotFound(path) => Self::FileNotFound { path },
            SyncError::MalformedFile { path, message } => Self::MalformedFile { path, message },
            SyncError::Storage(e) => e,
        }
    }
}

/// Result type for sync operations.
pub type SyncResult<T> = std::result::Result<T, SyncError>;
