//! Error types for userbook.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (2=storage, 3=not_found, 4=validation, etc.)
//! - Context-aware recovery hints
//! - Structured JSON output for piped / non-TTY consumers

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for userbook operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Storage (exit 2)
    StorageUnavailable,
    NotInitialized,
    AlreadyInitialized,
    DatabaseError,

    // Not Found (exit 3)
    UserNotFound,
    FileNotFound,

    // Validation (exit 4)
    InvalidArgument,
    RequiredField,
    MalformedInput,

    // Conflict (exit 5)
    DuplicateKey,

    // Sync (exit 6)
    MalformedFile,

    // Config (exit 7)
    ConfigError,

    // I/O (exit 8)
    IoError,
    JsonError,

    // Internal (exit 1)
    InternalError,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::StorageUnavailable => "STORAGE_UNAVAILABLE",
            Self::NotInitialized => "NOT_INITIALIZED",
            Self::AlreadyInitialized => "ALREADY_INITIALIZED",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::FileNotFound => "FILE_NOT_FOUND",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::RequiredField => "REQUIRED_FIELD",
            Self::MalformedInput => "MALFORMED_INPUT",
            Self::DuplicateKey => "DUPLICATE_KEY",
            Self::MalformedFile => "MALFORMED_FILE",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Category-based exit code (1-8).
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::InternalError => 1,
            Self::StorageUnavailable
            | Self::NotInitialized
            | Self::AlreadyInitialized
            | Self::DatabaseError => 2,
            Self::UserNotFound | Self::FileNotFound => 3,
            Self::InvalidArgument | Self::RequiredField | Self::MalformedInput => 4,
            Self::DuplicateKey => 5,
            Self::MalformedFile => 6,
            Self::ConfigError => 7,
            Self::IoError | Self::JsonError => 8,
        }
    }

    /// Whether the caller should retry with corrected input.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument
                | Self::RequiredField
                | Self::MalformedInput
                | Self::DuplicateKey
                | Self::DatabaseError
        )
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur in userbook operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Storage unavailable at {}: {reason}", .path.display())]
    StorageUnavailable { path: PathBuf, reason: String },

    #[error("Not initialized: run `userbook init` first")]
    NotInitialized,

    #[error("Already initialized at {}", .path.display())]
    AlreadyInitialized { path: PathBuf },

    #[error("User not found: {key}")]
    UserNotFound { key: String },

    #[error("File not found: {}", .path.display())]
    FileNotFound { path: PathBuf },

    #[error("A user with last name '{family_name}' already exists")]
    DuplicateKey { family_name: String },

    #[error("Required field is empty: {0}")]
    RequiredField(&'static str),

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Malformed file {}: {message}", .path.display())]
    MalformedFile { path: PathBuf, message: String },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::StorageUnavailable { .. } => ErrorCode::StorageUnavailable,
            Self::NotInitialized => ErrorCode::NotInitialized,
            Self::AlreadyInitialized { .. } => ErrorCode::AlreadyInitialized,
            Self::Database(_) => ErrorCode::DatabaseError,
            Self::UserNotFound { .. } => ErrorCode::UserNotFound,
            Self::FileNotFound { .. } => ErrorCode::FileNotFound,
            Self::DuplicateKey { .. } => ErrorCode::DuplicateKey,
            Self::RequiredField(_) => ErrorCode::RequiredField,
            Self::MalformedInput(_) => ErrorCode::MalformedInput,
            Self::MalformedFile { .. } => ErrorCode::MalformedFile,
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::JsonError,
            Self::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Context-aware recovery hint.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::NotInitialized => Some("Run `userbook init` to create the database".to_string()),

            Self::AlreadyInitialized { path } => Some(format!(
                "Database already exists at {}. Use `--force` to reinitialize.",
                path.display()
            )),

            Self::StorageUnavailable { path, .. } => Some(format!(
                "Check that {} is a writable file path, or pass another one with --db.",
                path.display()
            )),

            Self::UserNotFound { .. } => {
                Some("Use `userbook list` to see stored users.".to_string())
            }

            Self::FileNotFound { path } => Some(format!(
                "Nothing was imported. Create {} first, e.g. with `userbook export` or `userbook collect`.",
                path.display()
            )),

            Self::DuplicateKey { family_name } => Some(format!(
                "Last names are unique. Use `userbook find {family_name}` to see the existing user."
            )),

            Self::MalformedInput(_) => {
                Some("Age must be a whole number of years, or left empty.".to_string())
            }

            Self::MalformedFile { .. } => Some(
                "JSON imports expect an array of objects with `name`, `last_name` and `age`; \
                 CSV imports expect a header with `name` and `last_name` columns."
                    .to_string(),
            ),

            Self::RequiredField(_)
            | Self::Database(_)
            | Self::Io(_)
            | Self::Json(_)
            | Self::InvalidArgument(_)
            | Self::Config(_)
            | Self::Other(_) => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    ///
    /// Includes error code, message, retryability, exit code, and
    /// optional recovery hint.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "retryable": code.is_retryable(),
                "exit_code": code.exit_code(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }
}
