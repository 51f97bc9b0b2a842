pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;
pub mod yaml;

use crate::OutputFormat;
use serde_json::{Map, Value};

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
        OutputFormat::Yaml => yaml::print_yaml(value),
    }
}

/// Split an object into its scalar fields and its row collections
/// (arrays of objects such as `schedule` or `rates`).
pub(crate) fn split_rows(
    map: &Map<String, Value>,
) -> (Vec<(&String, &Value)>, Vec<(&String, &Vec<Value>)>) {
    let mut fields = Vec::new();
    let mut collections = Vec::new();
    for (key, val) in map {
        match val {
            Value::Array(items) if items.first().map_or(false, Value::is_object) => {
                collections.push((key, items))
            }
            _ => fields.push((key, val)),
        }
    }
    (fields, collections)
}

/// Render a scalar for text output. Decimals arrive as strings.
pub(crate) fn format_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
