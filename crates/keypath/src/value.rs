//! Text rendering of bound values

use serde_json::Value;

/// Convert a bound value to the text substituted into a document
///
/// Strings are used verbatim, numbers keep JSON formatting (`5`, `1.5`),
/// booleans become `true`/`false`, null becomes empty text, and arrays or
/// objects are written as compact JSON.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => if *b { "true" } else { "false" }.to_string(),
        Value::Null => String::new(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Short name of the JSON type of `value`
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
