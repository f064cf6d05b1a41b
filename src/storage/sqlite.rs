//! SQLite storage implementation.
//!
//! `SqliteStorage` owns the connection and is the only write path to the
//! `users` table. Every write runs inside an `IMMEDIATE` transaction via
//! [`SqliteStorage::mutate`]; uniqueness violations on `last_name` surface
//! as [`Error::DuplicateKey`].

use crate::error::{Error, Result};
use crate::model::{ReplaceOutcome, UpdateOutcome, User, UserPatch};
use crate::storage::schema::apply_schema;
use crate::validate::{check_age, require_name};
use chrono::NaiveDateTime;
use rusqlite::{Connection, OptionalExtension, Transaction};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Columns selected for every `User` read, in `map_user` order.
const USER_COLUMNS: &str = "id, name, last_name, age, created_at";

/// Layout of SQLite's `CURRENT_TIMESTAMP`.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// SQLite-based storage backend.
#[derive(Debug)]
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Open a database at the given path.
    ///
    /// Creates the database and applies schema if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `StorageUnavailable` if the connection cannot be established
    /// or the schema cannot be applied.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_timeout(path, None)
    }

    /// Open a database with an optional busy timeout.
    ///
    /// # Errors
    ///
    /// Returns `StorageUnavailable` if the connection cannot be established
    /// or the schema cannot be applied.
    pub fn open_with_timeout(path: &Path, timeout_ms: Option<u64>) -> Result<Self> {
        let unavailable = |e: rusqlite::Error| Error::StorageUnavailable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        };

        let conn = Connection::open(path).map_err(unavailable)?;

        // Default 5 second timeout
        let timeout = timeout_ms.map_or(Duration::from_secs(5), Duration::from_millis);
        conn.busy_timeout(timeout).map_err(unavailable)?;

        apply_schema(&conn).map_err(unavailable)?;
        debug!(path = %path.display(), "storage opened");
        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        apply_schema(&conn)?;
        Ok(Self { conn })
    }

    #[cfg(test)]
    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Execute a mutation inside an `IMMEDIATE` transaction.
    ///
    /// The transaction commits when the closure returns `Ok` and rolls back
    /// when it returns `Err` (the transaction is dropped uncommitted).
    ///
    /// # Errors
    ///
    /// Returns the closure's error, or an error if begin/commit fails.
    pub fn mutate<F, R>(&mut self, op: &str, f: F) -> Result<R>
    where
        F: FnOnce(&Transaction) -> Result<R>,
    {
        let tx = self
            .conn
            .transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;

        debug!(op, "mutation started");
        let result = f(&tx)?;

        tx.commit()?;
        debug!(op, "mutation committed");

        Ok(result)
    }

    // ==================
    // User Operations
    // ==================

    /// Create a new user and return the id storage assigned to it.
    ///
    /// # Errors
    ///
    /// - `RequiredField` if a name is blank
    /// - `MalformedInput` if the age is out of range
    /// - `DuplicateKey` if another user already has this family name
    pub fn create_user(
        &mut self,
        given_name: &str,
        family_name: &str,
        age: Option<i64>,
    ) -> Result<i64> {
        let given_name = require_name("name", given_name)?;
        let family_name = require_name("last_name", family_name)?;
        let age = age.map(check_age).transpose()?;

        let id = self.mutate("create_user", |tx| {
            tx.execute(
                "INSERT INTO users (name, last_name, age) VALUES (?1, ?2, ?3)",
                rusqlite::params![given_name, family_name, age],
            )
            .map_err(|e| unique_violation(e, &family_name))?;

            Ok(tx.last_insert_rowid())
        })?;

        debug!(id, family_name = %family_name, "user created");
        Ok(id)
    }

    /// Get a user by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_user(&self, id: i64) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1");
        let user = self.conn.query_row(&sql, [id], map_user).optional()?;
        Ok(user)
    }

    /// Get a user by family name.
    ///
    /// `last_name` is unique, so at most one row matches. Should a database
    /// created outside this tool hold duplicates, the lowest id wins.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_user_by_family_name(&self, family_name: &str) -> Result<Option<User>> {
        let sql =
            format!("SELECT {USER_COLUMNS} FROM users WHERE last_name = ?1 ORDER BY id LIMIT 1");
        let user = self
            .conn
            .query_row(&sql, [family_name.trim()], map_user)
            .optional()?;
        Ok(user)
    }

    /// Get all users ordered by id (for listing and full export).
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_all_users(&self) -> Result<Vec<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY id ASC");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], map_user)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    /// Count stored users.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn count_users(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// Apply a partial update.
    ///
    /// Only supplied fields are written; everything else keeps its stored
    /// value. An empty patch returns `NothingToUpdate` without touching the
    /// database, and an unknown id returns `NotFound`.
    ///
    /// # Errors
    ///
    /// - `RequiredField` if a supplied name is blank
    /// - `MalformedInput` if a supplied age is out of range
    /// - `DuplicateKey` if the new family name belongs to another user
    pub fn update_user(&mut self, id: i64, patch: &UserPatch) -> Result<UpdateOutcome> {
        // Build dynamic UPDATE query based on provided fields
        let mut set_clauses: Vec<&str> = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
        let mut family_name = String::new();

        if let Some(name) = &patch.given_name {
            set_clauses.push("name = ?");
            params.push(Box::new(require_name("name", name)?));
        }
        if let Some(last_name) = &patch.family_name {
            family_name = require_name("last_name", last_name)?;
            set_clauses.push("last_name = ?");
            params.push(Box::new(family_name.clone()));
        }
        if let Some(age) = patch.age {
            set_clauses.push("age = ?");
            params.push(Box::new(check_age(age)?));
        }

        if set_clauses.is_empty() {
            debug!(id, "nothing to update");
            return Ok(UpdateOutcome::NothingToUpdate);
        }

        self.mutate("update_user", |tx| {
            let sql = format!("UPDATE users SET {} WHERE id = ?", set_clauses.join(", "));
            params.push(Box::new(id));

            let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
            let rows = tx
                .execute(&sql, param_refs.as_slice())
                .map_err(|e| unique_violation(e, &family_name))?;

            if rows == 0 {
                Ok(UpdateOutcome::NotFound)
            } else {
                Ok(UpdateOutcome::Updated)
            }
        })
    }

    /// Delete a user. Returns `false` if no row had this id.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn delete_user(&mut self, id: i64) -> Result<bool> {
        let rows = self.mutate("delete_user", |tx| {
            Ok(tx.execute("DELETE FROM users WHERE id = ?1", [id])?)
        })?;
        Ok(rows > 0)
    }

    /// Insert a user under an explicit id, or overwrite the row that has it.
    ///
    /// An existing row gets all three data fields replaced; its
    /// `created_at` is kept. A new row takes `created_at` from the caller
    /// when it is a `YYYY-MM-DD HH:MM:SS` timestamp, otherwise from storage.
    ///
    /// This is the import-side counterpart of an exported row and is not a
    /// partial update: absent `age` clears the stored age.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if `id` is not positive
    /// - `RequiredField` / `MalformedInput` for invalid field values
    /// - `DuplicateKey` if the family name belongs to a different row
    pub fn replace_user(
        &mut self,
        id: i64,
        given_name: &str,
        family_name: &str,
        age: Option<i64>,
        created_at: Option<&str>,
    ) -> Result<ReplaceOutcome> {
        if id <= 0 {
            return Err(Error::InvalidArgument(format!(
                "user id must be positive, got {id}"
            )));
        }
        let given_name = require_name("name", given_name)?;
        let family_name = require_name("last_name", family_name)?;
        let age = age.map(check_age).transpose()?;
        let created_at = created_at.filter(|ts| {
            let valid = NaiveDateTime::parse_from_str(ts, TIMESTAMP_FORMAT).is_ok();
            if !valid {
                debug!(id, created_at = %ts, "ignoring unparseable created_at");
            }
            valid
        });

        self.mutate("replace_user", |tx| {
            let exists = tx
                .query_row("SELECT 1 FROM users WHERE id = ?1", [id], |_| Ok(()))
                .optional()?
                .is_some();

            let result = if exists {
                tx.execute(
                    "UPDATE users SET name = ?1, last_name = ?2, age = ?3 WHERE id = ?4",
                    rusqlite::params![given_name, family_name, age, id],
                )
                .map(|_| ReplaceOutcome::Replaced)
            } else if let Some(ts) = created_at {
                tx.execute(
                    "INSERT INTO users (id, name, last_name, age, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    rusqlite::params![id, given_name, family_name, age, ts],
                )
                .map(|_| ReplaceOutcome::Inserted)
            } else {
                tx.execute(
                    "INSERT INTO users (id, name, last_name, age) VALUES (?1, ?2, ?3, ?4)",
                    rusqlite::params![id, given_name, family_name, age],
                )
                .map(|_| ReplaceOutcome::Inserted)
            };

            result.map_err(|e| unique_violation(e, &family_name))
        })
    }
}

/// Map a `SELECT {USER_COLUMNS}` row to a `User`.
fn map_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        given_name: row.get(1)?,
        family_name: row.get(2)?,
        age: row.get(3)?,
        created_at: row.get(4)?,
    })
}

/// Turn a `UNIQUE` constraint failure into `DuplicateKey`.
///
/// `NOT NULL` and other constraint failures stay database errors.
fn unique_violation(err: rusqlite::Error, family_name: &str) -> Error {
    match &err {
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            Error::DuplicateKey {
                family_name: family_name.to_string(),
            }
        }
        _ => Error::Database(err),
    }
}
