//! Table and JSON output formatting for CLI commands.

use serde::Serialize;
use tabled::{Table, Tabled};

/// Output format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
}

/// Print a list of rows in the selected format.
pub fn print_list<T: Serialize + Tabled>(rows: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if rows.is_empty() {
                println!("No results found.");
            } else {
                println!("{}", Table::new(rows));
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(rows).unwrap_or_else(|_| "[]".to_string());
            println!("{json}");
        }
    }
}

/// Print a single value as JSON, or as key/value lines in table mode.
pub fn print_item<T: Serialize>(item: &T, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if let Ok(serde_json::Value::Object(fields)) = serde_json::to_value(item) {
                for (key, value) in fields {
                    let value = match value {
                        serde_json::Value::String(s) => s,
                        other => other.to_string(),
                    };
                    print_kv(&key, &value);
                }
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(item).unwrap_or_else(|_| "{}".to_string());
            println!("{json}");
        }
    }
}

/// Print a success message.
pub fn print_success(msg: &str) {
    println!("✓ {msg}");
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    println!("⚠ {msg}");
}

/// Print a key-value pair.
pub fn print_kv(key: &str, value: &str) {
    println!("  {:<24} {}", format!("{key}:"), value);
}
