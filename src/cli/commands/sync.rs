//! Sync command implementations (CSV/JSON export, import and status).
//!
//! Files default to `users_export.csv` / `users_export.json` in the working
//! directory, so `export` followed by `import` round-trips without flags.

use crate::cli::FormatArg;
use crate::cli::commands::{open_existing, open_or_create};
use crate::config::default_sync_path;
use crate::error::{Error, Result};
use crate::sync::{
    ExportStats, Exporter, ImportMode, ImportStats, Importer, SyncFormat, get_sync_status,
    print_status,
};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Serialize)]
struct ExportOutput<'a> {
    format: SyncFormat,
    path: &'a Path,
    stats: ExportStats,
}

#[derive(Serialize)]
struct ImportOutput<'a> {
    format: SyncFormat,
    path: &'a Path,
    replace: bool,
    stats: ImportStats,
}

/// Execute the export command.
///
/// # Errors
///
/// Returns an error if the database cannot be read or the file cannot be
/// written.
pub fn export(
    format: FormatArg,
    output: Option<&PathBuf>,
    db_path: Option<&PathBuf>,
    json: bool,
) -> Result<()> {
    let format = SyncFormat::from(format);
    let path = output.cloned().unwrap_or_else(|| default_sync_path(format));

    let storage = open_existing(db_path)?;
    let stats = Exporter::new(&storage).export(format, &path)?;

    if crate::is_silent() {
        println!("{}", path.display());
    } else if json {
        let output = ExportOutput {
            format,
            path: &path,
            stats,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!(
            "Exported {} users to {} ({format})",
            stats.records,
            path.display()
        );
    }
    Ok(())
}

/// Execute the import command.
///
/// # Errors
///
/// Returns `InvalidArgument` for `--replace` with CSV, `FileNotFound` or
/// `MalformedFile` for an unusable file.
pub fn import(
    format: FormatArg,
    input: Option<&PathBuf>,
    replace: bool,
    db_path: Option<&PathBuf>,
    json: bool,
) -> Result<()> {
    let format = SyncFormat::from(format);
    if replace && format == SyncFormat::Delimited {
        return Err(Error::InvalidArgument(
            "--replace needs ids from a JSON export; use --format json".to_string(),
        ));
    }

    let path = input.cloned().unwrap_or_else(|| default_sync_path(format));
    let mode = if replace {
        ImportMode::InsertOrReplace
    } else {
        ImportMode::InsertOrIgnore
    };

    if !path.exists() {
        return Err(Error::FileNotFound { path });
    }

    let mut storage = open_or_create(db_path)?;
    let stats = Importer::new(&mut storage, mode).import(format, &path)?;

    if crate::is_silent() {
        println!("{}", stats.written());
    } else if json {
        let output = ImportOutput {
            format,
            path: &path,
            replace,
            stats,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("Imported {} ({format})", path.display());
        println!();
        println!("  Rows read:  {}", stats.seen);
        println!("  Created:    {}", stats.created);
        if replace {
            println!("  Replaced:   {}", stats.replaced);
            println!("  Unchanged:  {}", stats.unchanged);
        }
        println!("  Skipped:    {} (last name taken)", stats.skipped);
        if stats.failed > 0 {
            println!("  Failed:     {} (run with -v for details)", stats.failed);
        }
    }
    Ok(())
}

/// Execute the status command.
///
/// # Errors
///
/// Returns an error if the database cannot be read.
pub fn status(files: &[PathBuf], db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let files = if files.is_empty() {
        vec![
            default_sync_path(SyncFormat::Delimited),
            default_sync_path(SyncFormat::Structured),
        ]
    } else {
        files.to_vec()
    };

    let storage = open_existing(db_path)?;
    let sync_status = get_sync_status(&storage, &files)?;

    if json {
        println!("{}", serde_json::to_string(&sync_status)?);
    } else {
        print_status(&sync_status);
    }
    Ok(())
}
