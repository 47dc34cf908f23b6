//! Command handlers for the wagon CLI

use colored::*;
use eyre::Result;
use serde::Serialize;

use crate::agent::GenerationResult;
use crate::cli::OutputFormat;

pub mod assembly;
pub mod completions;
pub mod compliance;
pub mod config;
pub mod doctor;
pub mod narrative;

/// Print an operation result. A failed result is printed, then returned as an error.
pub fn print_result<T: Serialize>(action: &str, result: &GenerationResult<T>, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(result)?),
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(result)?),
        OutputFormat::Text => print_text(action, result)?,
    }

    if let Some(error) = result.error() {
        eyre::bail!("{} failed: {}", action, error);
    }

    Ok(())
}

fn print_text<T: Serialize>(action: &str, result: &GenerationResult<T>) -> Result<()> {
    let marker = if result.is_failed() { "✗".red() } else { "✓".green() };
    println!("{} {} {}", marker, action.bold(), format!("({})", result.status()).dimmed());

    let value = serde_json::to_value(result)?;
    if let Some(fields) = value.as_object() {
        for (key, value) in fields.iter().filter(|(key, _)| key.as_str() != "status") {
            println!("  {}: {}", key.cyan(), render(value));
        }
    }

    Ok(())
}

fn render(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
