use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};

use crate::ledger::StoreError;

pub const READ_FAILED: &str = "Unable to read CSV file from GitHub.";
pub const WRITE_FAILED: &str = "Failed to update CSV on GitHub.";
pub const UNKNOWN_ERROR: &str = "Unknown server error.";

#[derive(Debug)]
pub enum LedgerError {
    MethodNotAllowed,
    VerificationFailed,
    MissingFields,
    UpstreamRead(Value),
    UpstreamWrite(String),
    WriteConflict(String),
    Unexpected(String),
}

impl std::fmt::Display for LedgerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LedgerError::MethodNotAllowed => write!(f, "Method Not Allowed"),
            LedgerError::VerificationFailed => write!(f, "Failed human verification."),
            LedgerError::MissingFields => write!(f, "Missing required fields."),
            LedgerError::UpstreamRead(_) => write!(f, "{READ_FAILED}"),
            LedgerError::UpstreamWrite(_) | LedgerError::WriteConflict(_) => {
                write!(f, "{WRITE_FAILED}")
            }
            LedgerError::Unexpected(msg) if msg.is_empty() => write!(f, "{UNKNOWN_ERROR}"),
            LedgerError::Unexpected(msg) => write!(f, "{msg}"),
        }
    }
}

impl IntoResponse for LedgerError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let (status, body) = match self {
            LedgerError::MethodNotAllowed => {
                (StatusCode::METHOD_NOT_ALLOWED, json!({ "error": message }))
            }
            LedgerError::VerificationFailed | LedgerError::MissingFields => {
                (StatusCode::BAD_REQUEST, json!({ "error": message }))
            }
            LedgerError::UpstreamRead(details) => {
                tracing::error!("GitHub file read error: {details}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": message, "details": details }),
                )
            }
            LedgerError::UpstreamWrite(details) => {
                tracing::error!("GitHub write error: {details}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": message, "details": details }),
                )
            }
            LedgerError::WriteConflict(details) => {
                tracing::error!("GitHub write rejected, ledger changed since read: {details}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": message, "details": details }),
                )
            }
            LedgerError::Unexpected(_) => {
                tracing::error!("Unexpected server error: {message}");
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": message }))
            }
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<StoreError> for LedgerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Read { details } => LedgerError::UpstreamRead(details),
            StoreError::Write { details } => LedgerError::UpstreamWrite(details),
            StoreError::Conflict { details } => LedgerError::WriteConflict(details),
            other @ (StoreError::Decode(_) | StoreError::Transport(_)) => {
                LedgerError::Unexpected(other.to_string())
            }
        }
    }
}
