//! Input validation at the edges of the store.
//!
//! Raw text from prompts, CLI arguments and CSV cells is checked here
//! before it reaches the repository. Names must be non-blank; ages must be
//! non-negative whole numbers or absent.

use std::collections::HashSet;
use std::sync::LazyLock;

use crate::error::{Error, Result};

/// Answers to the "continue?" prompt that end collection.
pub static STOP_ANSWERS: LazyLock<HashSet<&str>> = LazyLock::new(|| {
    ["", "n", "no", "stop", "q", "quit", "done"]
        .into_iter()
        .collect()
});

/// Upper bound accepted for an age. Anything above is a typo.
pub const MAX_AGE: i64 = 200;

/// Trim a name and reject it if nothing is left.
///
/// # Errors
///
/// Returns `RequiredField` with the field name when the value is blank.
pub fn require_name(field: &'static str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::RequiredField(field));
    }
    Ok(trimmed.to_string())
}

/// Parse an age typed by a person or read from a text cell.
///
/// Blank text means "no age". Otherwise the text must be a whole number in
/// `0..=MAX_AGE`.
///
/// # Errors
///
/// Returns `MalformedInput` for anything that is not a valid age.
pub fn parse_age(raw: &str) -> Result<Option<i64>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let age: i64 = trimmed
        .parse()
        .map_err(|_| Error::MalformedInput(format!("age '{trimmed}' is not a whole number")))?;

    check_age(age).map(Some)
}

/// Range-check a numeric age.
///
/// # Errors
///
/// Returns `MalformedInput` if the age is negative or above `MAX_AGE`.
pub fn check_age(age: i64) -> Result<i64> {
    if (0..=MAX_AGE).contains(&age) {
        Ok(age)
    } else {
        Err(Error::MalformedInput(format!("age {age} is outside 0-{MAX_AGE}")))
    }
}

/// Whether an answer to the "continue?" prompt means stop.
#[must_use]
pub fn is_stop_answer(answer: &str) -> bool {
    STOP_ANSWERS.contains(answer.trim().to_lowercase().as_str())
}
