//! Output formatting for CLI commands
//!
//! Provides utilities for formatting command output in human-readable
//! or JSON formats. Supports colored output (respects NO_COLOR env var).

use crate::cli::OutputFormat;
use crate::core::types::PackOutcome;
use serde_json::Value;

/// Color scheme for CLI output
pub mod colors {
    use colored::{ColoredString, Colorize};

    /// Style for labels/headers
    pub fn label(s: &str) -> ColoredString {
        s.bold()
    }

    /// Style for file paths
    pub fn file_path(s: &str) -> ColoredString {
        s.blue()
    }

    /// Style for numbers/counts
    pub fn number(s: &str) -> ColoredString {
        s.yellow()
    }

    /// Style for success messages
    pub fn success(s: &str) -> ColoredString {
        s.green()
    }

    /// Style for error messages
    pub fn error(s: &str) -> ColoredString {
        s.red().bold()
    }

    /// Style for dim/secondary text
    pub fn dim(s: &str) -> ColoredString {
        s.dimmed()
    }
}

/// Format bytes into human-readable size
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    let gb_val = bytes as f64 / GB as f64;
    let mb_val = bytes as f64 / MB as f64;
    let kb_val = bytes as f64 / KB as f64;

    if bytes >= GB {
        format!("{gb_val:.1} GB")
    } else if bytes >= MB {
        format!("{mb_val:.1} MB")
    } else if bytes >= KB {
        format!("{kb_val:.1} KB")
    } else {
        format!("{bytes} B")
    }
}

/// Print output based on format
pub fn print_output<T: serde::Serialize>(data: &T, format: OutputFormat) {
    match format {
        OutputFormat::Human => {
            // Human format should be handled by the caller
            // This is a fallback that just prints JSON
            if let Ok(json) = serde_json::to_string_pretty(data) {
                println!("{json}");
            }
        }
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string_pretty(data) {
                println!("{json}");
            }
        }
    }
}

/// Print a pack operation envelope
///
/// JSON prints the envelope as is. Human output shows the summary and
/// data fields of a success; failures are left to the caller's error
/// path so they are reported once.
pub fn print_outcome(outcome: &PackOutcome, format: OutputFormat) {
    if format == OutputFormat::Json {
        print_output(outcome, format);
        return;
    }
    if !outcome.ok {
        return;
    }

    print_success(&outcome.summary);
    if let Some(Value::Object(fields)) = &outcome.data {
        for (key, value) in fields {
            println!("  {}: {}", colors::label(key), format_field(key, value));
        }
    }
}

/// Render one data field; byte counts get a readable size alongside
pub fn format_field(key: &str, value: &Value) -> String {
    match value {
        Value::Number(n) if key.ends_with("bytes") => match n.as_u64() {
            Some(bytes) if bytes >= 1024 => format!(
                "{} {}",
                colors::number(&bytes.to_string()),
                colors::dim(&format!("({})", format_bytes(bytes)))
            ),
            _ => colors::number(&n.to_string()).to_string(),
        },
        Value::Number(n) => colors::number(&n.to_string()).to_string(),
        Value::String(s) if key == "pack" || key == "repo" || key == "out_file" => {
            colors::file_path(s).to_string()
        }
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{}", colors::success(message));
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{}: {}", colors::error("Error"), message);
}

/// Print a header/title
pub fn print_header(title: &str) {
    println!("{}", colors::label(title));
}
