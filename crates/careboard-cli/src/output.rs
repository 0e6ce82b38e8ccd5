use colored::Colorize;
use serde_json::Value;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::cli::OutputFormat;

pub fn print_value(value: &Value, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(value).unwrap_or_default()
            );
        }
        OutputFormat::Table => print_as_table(value),
    }
}

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Renders the pages listing as a two-column table.
pub fn print_pages(pages: &[(String, String)]) {
    let mut builder = Builder::default();
    builder.push_record(["Page", "Resource"]);
    for (page, resource) in pages {
        builder.push_record([page.as_str(), resource.as_str()]);
    }
    let table = builder.build().with(Style::rounded()).to_string();
    println!("{table}");
}

fn print_as_table(value: &Value) {
    let Some(object) = value.as_object() else {
        println!("{value}");
        return;
    };
    let mut builder = Builder::default();
    builder.push_record(["Key", "Value"]);
    for (key, entry) in object {
        let rendered = match entry {
            Value::Array(items) => format!("[{} items]", items.len()),
            Value::Object(_) => serde_json::to_string(entry).unwrap_or_default(),
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        builder.push_record([key.as_str(), rendered.as_str()]);
    }
    let table = builder.build().with(Style::rounded()).to_string();
    println!("{table}");
}
