//! User model.
//!
//! A user is the single record type kept by userbook. The `id` and
//! `created_at` fields are always assigned by storage.

use serde::{Deserialize, Serialize};

/// A stored user row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Surrogate key assigned on insert, never reused
    pub id: i64,

    /// Given name (`name` column)
    pub given_name: String,

    /// Family name (`last_name` column), unique across the table
    pub family_name: String,

    /// Age in years; `None` is stored as NULL, never as zero
    pub age: Option<i64>,

    /// Insert timestamp (`YYYY-MM-DD HH:MM:SS`, UTC)
    pub created_at: String,
}

impl User {
    /// Display name used in human-readable output.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.given_name, self.family_name)
    }
}

/// A partial update request.
///
/// Only the fields that are `Some` are written. `age: Some(0)` is a real
/// value and is written like any other.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub age: Option<i64>,
}

impl UserPatch {
    /// Returns true if no field was supplied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.given_name.is_none() && self.family_name.is_none() && self.age.is_none()
    }

    /// Set the given name.
    #[must_use]
    pub fn given_name(mut self, value: impl Into<String>) -> Self {
        self.given_name = Some(value.into());
        self
    }

    /// Set the family name.
    #[must_use]
    pub fn family_name(mut self, value: impl Into<String>) -> Self {
        self.family_name = Some(value.into());
        self
    }

    /// Set the age.
    #[must_use]
    pub fn age(mut self, value: i64) -> Self {
        self.age = Some(value);
        self
    }
}

/// Result of a partial update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateOutcome {
    /// The row existed and the supplied fields were written.
    Updated,
    /// The patch was empty; no statement was executed.
    NothingToUpdate,
    /// No row has the requested id.
    NotFound,
}

/// Result of an explicit-id insert-or-replace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplaceOutcome {
    /// No row had the id; a new row was inserted with it.
    Inserted,
    /// An existing row was overwritten.
    Replaced,
}
