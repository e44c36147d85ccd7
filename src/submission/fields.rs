use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::LedgerError;
use crate::models::Submission;

use super::parser::FieldMap;

/// Static answer to the human-verification question on the form.
pub const SECURITY_ANSWER: &str = "8";

/// Validate the human check and required fields, producing a `Submission`.
///
/// Only `securityCheck` is trimmed; accepted fields are stored as sent.
pub fn validate(data: &FieldMap, now: DateTime<Utc>) -> Result<Submission, LedgerError> {
    let answer = text(data, "securityCheck");
    if answer.as_deref().map(str::trim) != Some(SECURITY_ANSWER) {
        return Err(LedgerError::VerificationFailed);
    }

    let (Some(name), Some(email), Some(censorship)) = (
        text(data, "name"),
        text(data, "email"),
        text(data, "censorship"),
    ) else {
        return Err(LedgerError::MissingFields);
    };

    Ok(Submission {
        name,
        email,
        censorship,
        address: text(data, "address").unwrap_or_default(),
        phone: text(data, "phone").unwrap_or_default(),
        submitted_at: now,
    })
}

/// Read a field as non-empty text. `null`, `false`, `0` and `""` count as absent.
fn text(data: &FieldMap, key: &str) -> Option<String> {
    let s = match data.get(key)? {
        Value::String(s) => s.clone(),
        Value::Number(n) if n.as_f64() == Some(0.0) => return None,
        Value::Number(n) => n.to_string(),
        Value::Bool(true) => "true".to_string(),
        Value::Null | Value::Bool(false) => return None,
        other => other.to_string(),
    };
    (!s.is_empty()).then_some(s)
}
