use serde_json::Value;

/// Headline fields, in priority order, for the one-line answer.
const PRIORITY_KEYS: [&str; 7] = [
    "npv",
    "month",
    "probability_weighted_npv",
    "base_value",
    "base_npv",
    "delta",
    "irr",
];

/// Print just the key answer value from the output.
///
/// Looks for well-known result fields in priority order, then falls back to
/// the first field in the result object.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Value::Object(map) = result_obj {
        let hit = PRIORITY_KEYS
            .iter()
            .find_map(|k| map.get(*k).filter(|v| !v.is_null()));
        if let Some(val) = hit {
            println!("{}", format_minimal(val));
            return;
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    println!("{}", format_minimal(result_obj));
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
