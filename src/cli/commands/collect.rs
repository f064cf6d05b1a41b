//! Collect command implementation.
//!
//! Reads users interactively from stdin and writes them to a JSON file.
//! The file is not imported automatically; run `userbook import --format
//! json --input <file>` afterwards.

use crate::collect::Collector;
use crate::config::default_collect_path;
use crate::error::Result;
use serde::Serialize;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};

#[derive(Serialize)]
struct CollectOutput<'a> {
    path: &'a Path,
    records: usize,
}

/// Execute the collect command.
///
/// Prompts go to stderr when stdout is not a terminal, so `--json` output
/// on stdout stays parseable.
///
/// # Errors
///
/// Returns an error if stdin/stdout fail or the file cannot be written.
pub fn execute(output: Option<&PathBuf>, json: bool) -> Result<()> {
    let path = output.cloned().unwrap_or_else(default_collect_path);
    let stdin = io::stdin().lock();

    let records = if io::stdout().is_terminal() && !json {
        Collector::new(stdin, io::stdout()).collect_to_file(&path)?
    } else {
        Collector::new(stdin, io::stderr()).collect_to_file(&path)?
    };

    if crate::is_silent() {
        println!("{}", path.display());
    } else if json {
        let output = CollectOutput {
            path: &path,
            records,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!();
        println!("Saved {records} users to {}", path.display());
        println!(
            "Import them with: userbook import --format json --input {}",
            path.display()
        );
    }
    Ok(())
}
