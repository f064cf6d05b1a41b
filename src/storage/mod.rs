//! SQLite storage layer for userbook.
//!
//! # Submodules
//!
//! - [`schema`] - Table definition, applied on every open
//! - [`sqlite`] - The record repository (`SqliteStorage`)

pub mod schema;
pub mod sqlite;

pub use sqlite::SqliteStorage;
