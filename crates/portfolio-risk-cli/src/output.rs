use serde_json::Value;
use std::io;
use tabled::{builder::Builder, Table};

use crate::OutputFormat;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => print_json(value),
        OutputFormat::Table => print_table(value),
        OutputFormat::Csv => print_csv(value),
        OutputFormat::Minimal => print_minimal(value),
    }
}

/// Pretty-print JSON to stdout.
fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("JSON serialization error: {}", e),
    }
}

/// Envelope-aware table: result fields, then warnings and methodology.
fn print_table(value: &Value) {
    let result = unwrap_result(value);

    if let Value::Object(fields) = result {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (key, val) in fields {
            builder.push_record([key.as_str(), &flatten(val)]);
        }
        println!("{}", Table::from(builder));
    } else {
        println!("{}", result);
    }

    if let Some(Value::Array(warnings)) = value.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(methodology)) = value.get("methodology") {
        println!("\nMethodology: {}", methodology);
    }
}

/// Two-column CSV of the result fields.
fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let _ = wtr.write_record(["field", "value"]);
    if let Value::Object(fields) = unwrap_result(value) {
        for (key, val) in fields {
            let _ = wtr.write_record([key.as_str(), &flatten(val)]);
        }
    }

    let _ = wtr.flush();
}

/// Print just the key answer value from the output.
fn print_minimal(value: &Value) {
    let result = unwrap_result(value);

    // Priority list of key output fields
    let priority_keys = ["var_1day", "risk_level", "pnl", "total_value"];

    if let Value::Object(fields) = result {
        for key in &priority_keys {
            if let Some(val) = fields.get(*key) {
                if !val.is_null() {
                    println!("{}", flatten(val));
                    return;
                }
            }
        }

        if let Some((key, val)) = fields.iter().next() {
            println!("{}: {}", key, flatten(val));
            return;
        }
    }

    println!("{}", flatten(result));
}

/// Extract the `result` section of the computation envelope, if present.
fn unwrap_result(value: &Value) -> &Value {
    value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value)
}

fn flatten(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(flatten).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
