use std::collections::HashMap;

use serde_json::{Map, Value};

pub type FieldMap = Map<String, Value>;

/// Normalize a request body into a flat field map based on Content-Type.
///
/// URL-encoded bodies are decoded here. Everything else is read as a JSON
/// object. Unparseable input yields an empty map; the validator then reports
/// the missing fields.
pub fn parse_body(content_type: Option<&str>, body: &[u8]) -> FieldMap {
    let ct = content_type.unwrap_or("application/json");

    if ct.contains("application/x-www-form-urlencoded") {
        parse_form_urlencoded(body)
    } else {
        parse_json_object(body)
    }
}

fn parse_json_object(body: &[u8]) -> FieldMap {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => map,
        Ok(_) => FieldMap::new(),
        Err(e) => {
            tracing::debug!("Discarding unparseable JSON body: {e}");
            FieldMap::new()
        }
    }
}

fn parse_form_urlencoded(body: &[u8]) -> FieldMap {
    // Collecting into a HashMap keeps the last value for a repeated key
    let pairs: HashMap<String, String> = form_urlencoded::parse(body)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    pairs
        .into_iter()
        .map(|(k, v)| (k, Value::String(v)))
        .collect()
}
