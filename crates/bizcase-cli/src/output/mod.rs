pub mod csv_out;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Row-shaped collections, in lookup order, that tabular formats prefer over
/// a field/value dump of the result object.
const ROW_KEYS: [&str; 3] = ["results", "entries", "cases"];

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => match serde_json::to_string_pretty(value) {
            Ok(s) => println!("{}", s),
            Err(e) => eprintln!("JSON serialization error: {}", e),
        },
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// The array of row objects carried by an output, if any: either the value
/// itself or a well-known collection inside the `result` envelope.
pub fn primary_rows(value: &Value) -> Option<&[Value]> {
    match value {
        Value::Array(arr) => Some(arr.as_slice()),
        Value::Object(map) => {
            let result = map.get("result")?.as_object()?;
            ROW_KEYS
                .iter()
                .find_map(|k| result.get(*k).and_then(Value::as_array))
                .map(|arr| arr.as_slice())
        }
        _ => None,
    }
}
