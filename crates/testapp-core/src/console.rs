//! Severity-prefixed console reporting

use colored::Colorize;

/// Prints a warning to stderr with the standard `[!]` prefix.
pub fn warn(message: &str) {
    warn_tagged("[!]", message);
}

/// Prints a warning to stderr with a custom tag, e.g. for indented lists.
pub fn warn_tagged(tag: &str, message: &str) {
    eprintln!("{}", format!("{} {}", tag, message).yellow());
}

/// Prints an error to stderr with the standard `[!]` prefix.
pub fn error(message: &str) {
    eprintln!("{}", format!("[!] {}", message).red());
}
