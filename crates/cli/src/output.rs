//! Output formatting utilities

use clap::ValueEnum;
use colored::Colorize;
use provider_lib::{Diagnostics, PlanAction, Severity};
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print a table from a list of items
pub fn print_table<T: Tabled + Serialize>(items: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if items.is_empty() {
                println!("{}", "No items found".yellow());
                return;
            }
            let table = Table::new(items).with(Style::rounded()).to_string();
            println!("{}", table);
        }
        OutputFormat::Json => print_json(&items),
    }
}

/// Print a value as pretty JSON on stdout
pub fn print_json<T: Serialize + ?Sized>(value: &T) {
    if let Ok(json) = serde_json::to_string_pretty(value) {
        println!("{}", json);
    }
}

/// Print a success message
pub fn print_success(message: &str) {
    eprintln!("{} {}", "✓".green().bold(), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), message);
}

/// Print every diagnostic with its severity marker
pub fn print_diagnostics(diags: &Diagnostics) {
    for diag in diags.iter() {
        let line = match &diag.attribute {
            Some(attribute) => format!("{} ({}): {}", diag.summary.bold(), attribute, diag.detail),
            None => format!("{}: {}", diag.summary.bold(), diag.detail),
        };
        match diag.severity {
            Severity::Error => print_error(&line),
            Severity::Warning => print_warning(&line),
        }
    }
}

/// Color a plan action
pub fn color_action(action: PlanAction) -> String {
    let label = action.to_string();
    match action {
        PlanAction::Create => label.green().to_string(),
        PlanAction::Update => label.yellow().to_string(),
        PlanAction::NoOp => label.dimmed().to_string(),
    }
}

/// Render a schema default for a table cell
pub fn format_default(value: Option<&serde_json::Value>) -> String {
    match value {
        None => String::new(),
        Some(serde_json::Value::String(s)) => format!("\"{s}\""),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_default() {
        assert_eq!(format_default(None), "");
        assert_eq!(format_default(Some(&json!("15m"))), "\"15m\"");
        assert_eq!(format_default(Some(&json!(["dz-scheduler"]))), "[\"dz-scheduler\"]");
        assert_eq!(format_default(Some(&json!(true))), "true");
    }

    #[test]
    fn test_color_action_keeps_label() {
        colored::control::set_override(false);
        assert_eq!(color_action(PlanAction::Create), "create");
        assert_eq!(color_action(PlanAction::NoOp), "noop");
    }
}
