//! userbook - a single-table user directory on SQLite.
//!
//! This crate provides the core functionality for the `userbook` CLI tool.
//!
//! # Architecture
//!
//! - [`storage`] - SQLite schema and the user repository
//! - [`model`] - Data types (User, UserPatch, outcomes)
//! - [`sync`] - CSV/JSON export and import
//! - [`collect`] - Interactive record collection
//! - [`validate`] - Input validation shared by every entry point
//! - [`config`] - Database and file path resolution
//! - [`cli`] - Command-line interface using clap
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod collect;
pub mod config;
pub mod error;
pub mod model;
pub mod storage;
pub mod sync;
pub mod validate;

pub use error::{Error, Result};

/// Global silent mode flag for `--silent` output.
///
/// When set, commands print only the affected id (or path) instead of full
/// output.
pub static SILENT: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(false);

/// Check if silent mode is active.
#[inline]
pub fn is_silent() -> bool {
    SILENT.load(std::sync::atomic::Ordering::Relaxed)
}
