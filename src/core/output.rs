//! Colored terminal output for recipe runs
//!
//! Uses owo-colors for terminal colors. Progress bars live in
//! `helpers::internal::progress`.

use owo_colors::OwoColorize;
use std::sync::atomic::{AtomicBool, Ordering};

static QUIET: AtomicBool = AtomicBool::new(false);

/// Suppress everything except warnings and errors.
///
/// Used when stdout carries machine-readable output.
pub fn set_quiet(quiet: bool) {
    QUIET.store(quiet, Ordering::Relaxed);
}

pub fn is_quiet() -> bool {
    QUIET.load(Ordering::Relaxed)
}

/// Print an action header (blue, bold)
/// Example: "==> Packaging rapidjson/1.1.0"
pub fn action(message: &str) {
    if is_quiet() {
        return;
    }
    println!("{} {}", "==>".blue().bold(), message.bold());
}

/// Print a sub-action (cyan arrow)
/// Example: "  -> acquire"
pub fn sub_action(phase: &str) {
    if is_quiet() {
        return;
    }
    println!("  {} {}", "->".cyan(), phase);
}

/// Print a detail line (dimmed)
/// Example: "     Downloading sources from '...'..."
pub fn detail(message: &str) {
    if is_quiet() {
        return;
    }
    println!("     {}", message.dimmed());
}

/// Print a success message (green)
pub fn success(message: &str) {
    if is_quiet() {
        return;
    }
    println!("{} {}", "==>".green().bold(), message.green());
}

/// Print a key/value line for metadata listings
pub fn field(key: &str, value: &str) {
    if is_quiet() {
        return;
    }
    println!("  {:<12} {}", format!("{}:", key).cyan(), value);
}

/// Print a warning message (yellow)
pub fn warning(message: &str) {
    eprintln!("{} {}", "warning:".yellow().bold(), message.yellow());
}

/// Print an error message (red)
pub fn error(message: &str) {
    eprintln!("{} {}", "error:".red().bold(), message.red());
}
