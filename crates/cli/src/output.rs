//! Output formatting utilities

use clap::ValueEnum;
use colored::Colorize;
use headroom_lib::ResourceItem;
use serde::{Deserialize, Serialize};
use tabled::{settings::Style, Table, Tabled};

const KI: i64 = 1024;
const MI: i64 = KI * 1024;
const GI: i64 = MI * 1024;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Row shared by the usage and capacity tables
#[derive(Tabled)]
pub struct ItemRow {
    #[tabled(rename = "Slot")]
    pub slot: String,
    #[tabled(rename = "CPU")]
    pub cpu: String,
    #[tabled(rename = "Memory")]
    pub memory: String,
}

impl ItemRow {
    pub fn new(slot: &str, item: ResourceItem) -> Self {
        Self {
            slot: slot.to_string(),
            cpu: format_cpu(item.cpu().value()),
            memory: format_bytes(item.memory().value()),
        }
    }
}

/// Print rows as a rounded table
pub fn print_table<T: Tabled>(rows: Vec<T>) {
    if rows.is_empty() {
        println!("{}", "No items found".yellow());
        return;
    }
    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{}", table);
}

/// Print any serializable value as pretty JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a bold section header
pub fn print_header(title: &str) {
    println!("{}", title.bold());
    println!("{}", "=".repeat(50));
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Format bytes as human-readable string; negative values keep their sign
pub fn format_bytes(bytes: i64) -> String {
    let sign = if bytes < 0 { "-" } else { "" };
    let abs = bytes.unsigned_abs();

    if abs >= GI as u64 {
        format!("{}{:.2}Gi", sign, abs as f64 / GI as f64)
    } else if abs >= MI as u64 {
        format!("{}{:.2}Mi", sign, abs as f64 / MI as f64)
    } else if abs >= KI as u64 {
        format!("{}{:.2}Ki", sign, abs as f64 / KI as f64)
    } else {
        format!("{}{}B", sign, abs)
    }
}

/// Format millicores as human-readable string
pub fn format_cpu(millicores: i64) -> String {
    if millicores.unsigned_abs() >= 1000 {
        format!("{:.1}", millicores as f64 / 1000.0)
    } else {
        format!("{}m", millicores)
    }
}

/// Red for negative availability, plain otherwise
pub fn color_available(formatted: String, value: i64) -> String {
    if value < 0 {
        formatted.red().to_string()
    } else {
        formatted
    }
}
