//! Data models for userbook.
//!
//! - [`User`] - a stored row
//! - [`UserPatch`] - a partial update request
//! - [`UpdateOutcome`] / [`ReplaceOutcome`] - results of write operations

pub mod user;

pub use user::{ReplaceOutcome, UpdateOutcome, User, UserPatch};
