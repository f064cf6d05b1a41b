//! Content hashing for sync operations.
//!
//! SHA256 over the serialized data fields of a user lets the importer tell
//! an identical explicit-id record from a changed one without comparing
//! every field by hand.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::model::User;
use crate::sync::types::UserRecord;

/// The fields that define a user's content. `id` and `created_at` are
/// identity and metadata, not content.
#[derive(Serialize)]
struct UserContent<'a> {
    name: &'a str,
    last_name: &'a str,
    age: Option<i64>,
}

/// Compute a SHA256 hash of a serializable value.
///
/// # Panics
///
/// Panics if the value cannot be serialized to JSON. This cannot happen
/// for the plain structs hashed here.
#[must_use]
pub fn content_hash<T: Serialize>(value: &T) -> String {
    let json = serde_json::to_string(value).expect("serialization should not fail");
    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Hash of a stored user's content.
#[must_use]
pub fn user_hash(user: &User) -> String {
    content_hash(&UserContent {
        name: &user.given_name,
        last_name: &user.family_name,
        age: user.age,
    })
}

/// Hash of an external record's content, comparable with [`user_hash`].
///
/// Names are trimmed first, the same way storage trims them on write.
#[must_use]
pub fn record_hash(record: &UserRecord) -> String {
    content_hash(&UserContent {
        name: record.name.trim(),
        last_name: record.last_name.trim(),
        age: record.age,
    })
}

/// Check if content differs from what is stored.
///
/// Returns `true` if there is no stored hash or the hashes differ.
#[must_use]
pub fn has_changed(current_hash: &str, stored_hash: Option<&str>) -> bool {
    stored_hash.is_none_or(|h| h != current_hash)
}
