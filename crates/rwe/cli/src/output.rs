//! Output formatting utilities

use colored::*;
use serde::Serialize;

/// Print a value as pretty JSON
pub fn print_json<T: Serialize>(data: &T) -> serde_json::Result<()> {
    println!("{}", serde_json::to_string_pretty(data)?);
    Ok(())
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "!".yellow(), message);
}

/// Print a key/value line
pub fn print_field(key: &str, value: impl std::fmt::Display) {
    println!("  {:<18} {}", format!("{}:", key).dimmed(), value);
}
