//! Output formatting helpers.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use supplink_core::UserProfile;

/// Print a success message.
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning message.
pub fn warning(msg: &str) {
    eprintln!("{} {}", "!".yellow(), msg);
}

/// Print a labeled field.
pub fn field(label: &str, value: &str) {
    println!("{}: {}", label.dimmed(), value);
}

/// Print the fields of a user profile.
pub fn profile(profile: &UserProfile) {
    field("ID", &profile.id.to_string());
    if !profile.name.is_empty() {
        field("Name", &profile.name);
    }
    if !profile.email.is_empty() {
        field("Email", &profile.email);
    }
    field("Role", profile.role.as_str());
}

/// Print a value as pretty-printed JSON.
pub fn json_pretty<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}
