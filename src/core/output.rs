//! Unified output formatting utilities for consistent CLI presentation.
//!
//! # Design Principles
//! - **Consistent color scheme**: Red for errors, yellow for fallbacks, bright_black for
//!   secondary details
//! - **Standardized spacing**: Newline before and after section output

use colored::*;

/// Formats and prints an error message with consistent styling
///
/// # Format
/// ```text
///
/// ✕ Error: <message>
///
/// ```
pub fn print_error(message: &str) {
    println!("\n{} {}\n", "✕ Error:".red(), message.white());
}

/// Formats and prints a warning, used when a fallback result is shown
pub fn print_warning(message: &str) {
    println!("\n{} {}", "! Warning:".yellow(), message.white());
}

/// Formats and prints a success message with consistent styling
pub fn print_success(message: &str) {
    println!("\n{} {}", "✓".green(), message.white());
}

/// Formats and prints an informational message with consistent styling
pub fn print_info(message: &str) {
    println!("\n{}\n", message.white());
}

/// Formats and prints a section header with consistent styling
///
/// # Format
/// ```text
///
/// <header>:
///
/// ```
pub fn print_section_header(header: &str) {
    println!("\n{}:\n", header.white());
}

/// Formats an indexed list line: `[n] <text>`
pub fn format_indexed(index: usize, text: &str) -> String {
    format!("  {} {}", format!("[{index}]").bright_black(), text.white())
}

/// Formats a `label: value` detail line
pub fn format_detail(label: &str, value: &str) -> String {
    format!("  {} {}", format!("{label}:").bright_black(), value.white())
}
