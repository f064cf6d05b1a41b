//! CSV and JSON file synchronization.
//!
//! - **Export**: the whole `users` table → one CSV or JSON file
//! - **Import**: CSV or JSON file → `users`, merged row by row
//! - **Hashing**: SHA256 content hashing for unchanged-row detection
//! - **Status**: stored row count and export file statistics
//!
//! # File Formats
//!
//! CSV files start with the header `id,name,last_name,age,created_at`.
//! JSON files hold a single array of objects with the same keys:
//! ```json
//! [
//!   {"id": 1, "name": "Alex", "last_name": "Smith", "age": 29, "created_at": "2026-01-20 10:00:00"}
//! ]
//! ```
//!
//! # Example
//!
//! ```ignore
//! use userbook::sync::{Exporter, Importer, ImportMode, SyncFormat};
//!
//! Exporter::new(&storage).export(SyncFormat::Delimited, &path)?;
//!
//! let mut importer = Importer::new(&mut storage, ImportMode::InsertOrIgnore);
//! let stats = importer.import(SyncFormat::Delimited, &path)?;
//! ```

mod delimited;
mod export;
mod file;
mod hash;
mod import;
mod status;
mod types;

pub use delimited::{CsvRow, CsvRowError, escape_field, format_row, parse_rows};
pub use export::{Exporter, render_delimited, render_structured};
pub use file::{atomic_write, file_size, read_source};
pub use hash::{content_hash, has_changed, record_hash, user_hash};
pub use import::Importer;
pub use status::{get_sync_status, print_status};
pub use types::{
    DELIMITED_HEADER, ExportFileInfo, ExportStats, ImportMode, ImportStats, SyncError, SyncFormat,
    SyncResult, SyncStatus, UserRecord,
};
