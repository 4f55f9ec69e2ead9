use std::io::{self, Write};

use access_core::integrity::IntegrityReport;
use access_core::{Error, RoleStore, UserDirectory};
use regex::Regex;
use serde::Serialize;

/// Keeps the items whose key matches `term`, as a regex unless `fixed_string`
/// is set. No term keeps everything.
pub fn filter_by<T, F>(
    items: Vec<T>,
    term: Option<&str>,
    fixed_string: bool,
    key: F,
) -> Result<Vec<T>, Box<dyn std::error::Error>>
where
    F: Fn(&T) -> &str,
{
    let Some(term) = term else {
        return Ok(items);
    };

    if fixed_string {
        return Ok(items.into_iter().filter(|item| key(item).contains(term)).collect());
    }

    let regex = Regex::new(term).map_err(|e| format!("Invalid regex '{}': {}", term, e))?;
    Ok(items.into_iter().filter(|item| regex.is_match(key(item))).collect())
}

/// Asks a y/N question on stdin. Anything but an answer starting with `y`
/// means no.
pub fn confirm(prompt: &str) -> io::Result<bool> {
    print!("{} [y/N]: ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(input.trim().to_lowercase().starts_with('y'))
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Resolve a user identifier (either an ID or an email address) to a user ID.
pub fn resolve_user_id(
    users: &UserDirectory,
    identifier: &str,
) -> Result<i32, Box<dyn std::error::Error>> {
    if let Ok(id) = identifier.parse::<i32>() {
        return Ok(users.get_user(id)?.id);
    }
    Ok(users.find_by_email(identifier)?.id)
}

/// Resolve a role identifier (either an ID or a role name) to a role ID.
pub fn resolve_role_id(
    roles: &RoleStore,
    identifier: &str,
) -> Result<i32, Box<dyn std::error::Error>> {
    if let Ok(id) = identifier.parse::<i32>() {
        return Ok(roles.get_role(id)?.role_id);
    }
    Ok(roles.find_by_name(identifier)?.role_id)
}

pub fn print_cascades(report: &IntegrityReport) {
    for (dependent, rows) in &report.cascaded {
        if *rows > 0 {
            println!("  Cascaded to {}: {} row(s)", dependent.table(), rows);
        }
    }
}

/// One-line explanation for errors the operator can act on.
pub fn describe_error(err: &Error) -> String {
    match err {
        Error::ReferentialIntegrity { .. } => format!("{}; remove them first", err),
        other => other.to_string(),
    }
}
