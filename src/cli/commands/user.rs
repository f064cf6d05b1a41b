//! User command implementations (add, get, find, list, update, delete).

use crate::cli::commands::{open_existing, open_or_create};
use crate::cli::{AddArgs, UpdateArgs};
use crate::error::{Error, Result};
use crate::model::{UpdateOutcome, User, UserPatch};
use chrono::{NaiveDateTime, TimeZone, Utc};
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Serialize)]
struct UserListOutput<'a> {
    users: &'a [User],
    count: usize,
}

#[derive(Serialize)]
struct UpdateOutput {
    id: i64,
    outcome: UpdateOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<User>,
}

#[derive(Serialize)]
struct DeleteOutput {
    id: i64,
    deleted: bool,
}

/// Execute the add command.
///
/// # Errors
///
/// Returns `DuplicateKey` if the last name is taken, or a validation error
/// for a blank name or bad age.
pub fn add(args: &AddArgs, db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let mut storage = open_or_create(db_path)?;
    let id = storage.create_user(&args.name, &args.last_name, args.age)?;

    if crate::is_silent() {
        println!("{id}");
        return Ok(());
    }

    let user = storage
        .get_user(id)?
        .ok_or_else(|| Error::Other(format!("user {id} vanished after insert")))?;

    if json {
        println!("{}", serde_json::to_string(&user)?);
    } else {
        println!("{} {}", "Added".green(), describe(&user));
    }
    Ok(())
}

/// Execute the get command.
///
/// # Errors
///
/// Returns `UserNotFound` if no user has this id.
pub fn get(id: i64, db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let storage = open_existing(db_path)?;
    let user = storage.get_user(id)?.ok_or_else(|| Error::UserNotFound {
        key: id.to_string(),
    })?;
    print_user(&user, json)
}

/// Execute the find command.
///
/// # Errors
///
/// Returns `UserNotFound` if no user has this last name.
pub fn find(last_name: &str, db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let storage = open_existing(db_path)?;
    let user = storage
        .get_user_by_family_name(last_name)?
        .ok_or_else(|| Error::UserNotFound {
            key: last_name.to_string(),
        })?;
    print_user(&user, json)
}

/// Execute the list command.
///
/// # Errors
///
/// Returns an error if the database cannot be read.
pub fn list(db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let storage = open_existing(db_path)?;
    let users = storage.get_all_users()?;

    if crate::is_silent() {
        for user in &users {
            println!("{}", user.id);
        }
        return Ok(());
    }

    if json {
        let output = UserListOutput {
            users: &users,
            count: users.len(),
        };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    if users.is_empty() {
        println!("{}", "No users stored.".dimmed());
        return Ok(());
    }

    println!("Users ({} found):", users.len());
    println!();
    for user in &users {
        println!("  {}", describe(user));
    }
    Ok(())
}

/// Execute the update command.
///
/// Giving no field is not an error: nothing is written and the outcome is
/// reported as `nothing_to_update`.
///
/// # Errors
///
/// Returns `UserNotFound` if no user has this id, or `DuplicateKey` if the
/// new last name is taken.
pub fn update(args: &UpdateArgs, db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let mut storage = open_existing(db_path)?;

    let mut patch = UserPatch::default();
    if let Some(name) = &args.name {
        patch = patch.given_name(name);
    }
    if let Some(last_name) = &args.last_name {
        patch = patch.family_name(last_name);
    }
    if let Some(age) = args.age {
        patch = patch.age(age);
    }

    let outcome = storage.update_user(args.id, &patch)?;
    if outcome == UpdateOutcome::NotFound {
        return Err(Error::UserNotFound {
            key: args.id.to_string(),
        });
    }

    if crate::is_silent() {
        println!("{}", args.id);
        return Ok(());
    }

    let user = storage.get_user(args.id)?;
    if json {
        let output = UpdateOutput {
            id: args.id,
            outcome,
            user,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else if outcome == UpdateOutcome::NothingToUpdate {
        println!("{}", "Nothing to update.".dimmed());
    } else if let Some(user) = user {
        println!("{} {}", "Updated".green(), describe(&user));
    }
    Ok(())
}

/// Execute the delete command.
///
/// # Errors
///
/// Returns `UserNotFound` if no user has this id.
pub fn delete(id: i64, db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let mut storage = open_existing(db_path)?;
    if !storage.delete_user(id)? {
        return Err(Error::UserNotFound {
            key: id.to_string(),
        });
    }

    if crate::is_silent() {
        println!("{id}");
    } else if json {
        let output = DeleteOutput { id, deleted: true };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("{} user {id}", "Deleted".red());
    }
    Ok(())
}

fn print_user(user: &User, json: bool) -> Result<()> {
    if crate::is_silent() {
        println!("{}", user.id);
    } else if json {
        println!("{}", serde_json::to_string(user)?);
    } else {
        println!("{}", user.full_name().bold());
        println!("  ID:       {}", user.id);
        println!(
            "  Age:      {}",
            user.age.map_or_else(|| "-".to_string(), |a| a.to_string())
        );
        println!("  Created:  {}", format_created(&user.created_at));
    }
    Ok(())
}

/// One-line summary: `[id] Given Family (age)`.
fn describe(user: &User) -> String {
    let age = user.age.map(|a| format!(" ({a})")).unwrap_or_default();
    format!("[{}] {}{}", user.id, user.full_name(), age)
}

/// Render a stored `CURRENT_TIMESTAMP` value as RFC 3339, or as-is if it
/// does not parse.
fn format_created(created_at: &str) -> String {
    NaiveDateTime::parse_from_str(created_at, "%Y-%m-%d %H:%M:%S")
        .map(|dt| Utc.from_utc_datetime(&dt).to_rfc3339())
        .unwrap_or_else(|_| created_at.to_string())
}
