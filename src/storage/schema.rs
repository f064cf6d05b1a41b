//! Database schema definitions.
//!
//! The store keeps a single `users` table. Column names match the external
//! file formats (`name`, `last_name`), so exports and imports need no
//! column mapping.

use rusqlite::{Connection, Result};

/// The complete SQL schema for the userbook database.
///
/// `last_name` carries a declared `UNIQUE` constraint: it is the
/// discriminant used to skip duplicates on import. `AUTOINCREMENT` keeps
/// ids from being reused after a delete.
pub const SCHEMA_SQL: &str = r"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    last_name TEXT NOT NULL UNIQUE,
    age INTEGER,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);
";

/// Apply the schema to a connection.
///
/// Safe to call on every open: every statement is `IF NOT EXISTS`.
///
/// # Errors
///
/// Returns an error if the schema cannot be applied.
pub fn apply_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
