use serde_json::Value;

use super::parser::FieldMap;

/// Decoy field hidden from humans on the signup form.
pub const HONEYPOT_FIELD: &str = "_gotcha";

/// Check if the honeypot field is filled. Returns true if spam detected.
pub fn is_spam(data: &FieldMap) -> bool {
    data.get(HONEYPOT_FIELD).is_some_and(is_truthy)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
