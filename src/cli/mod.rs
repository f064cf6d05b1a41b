//! CLI definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::sync::SyncFormat;

pub mod commands;

/// userbook - a small user directory backed by SQLite
#[derive(Parser, Debug)]
#[command(name = "userbook", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Database path (default: ~/.userbook/data/userbook.db)
    #[arg(long, global = true, env = "USERBOOK_DB")]
    pub db: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Output only the id (for scripting)
    #[arg(long, global = true)]
    pub silent: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no log output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the database
    Init {
        /// Recreate the database if it already exists
        #[arg(long)]
        force: bool,
    },

    /// Add a user
    Add(AddArgs),

    /// Show a user by id
    Get {
        /// User id
        id: i64,
    },

    /// Find a user by last name
    Find {
        /// Exact last name
        last_name: String,
    },

    /// List all users
    List,

    /// Change fields of a user
    Update(UpdateArgs),

    /// Delete a user by id
    Delete {
        /// User id
        id: i64,
    },

    /// Write all users to a CSV or JSON file
    Export {
        /// File format
        #[arg(short, long, value_enum)]
        format: FormatArg,

        /// Output file (default: users_export.<format>)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Read users from a CSV or JSON file
    Import {
        /// File format
        #[arg(short, long, value_enum)]
        format: FormatArg,

        /// Input file (default: users_export.<format>)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Overwrite rows by `id` instead of skipping (JSON only)
        #[arg(long)]
        replace: bool,
    },

    /// Prompt for users and save them as an importable JSON file
    Collect {
        /// Output file (default: users_collected.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show stored user count and export files
    Status {
        /// Export files to inspect (default: users_export.csv and users_export.json)
        files: Vec<PathBuf>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Print version information
    Version,
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// First name
    pub name: String,

    /// Last name (must be unique)
    pub last_name: String,

    /// Age in years
    #[arg(long, allow_negative_numbers = true)]
    pub age: Option<i64>,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// User id
    pub id: i64,

    /// New first name
    #[arg(long)]
    pub name: Option<String>,

    /// New last name
    #[arg(long)]
    pub last_name: Option<String>,

    /// New age
    #[arg(long, allow_negative_numbers = true)]
    pub age: Option<i64>,
}

/// File formats accepted on the command line.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormatArg {
    /// Comma-separated values with a header row
    Csv,
    /// JSON array of objects
    Json,
}

impl From<FormatArg> for SyncFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Csv => Self::Delimited,
            FormatArg::Json => Self::Structured,
        }
    }
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}
