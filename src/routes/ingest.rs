use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderMap;
use axum::Json;
use serde_json::{json, Value};

use crate::error::LedgerError;
use crate::state::SharedState;
use crate::submission::pipeline::{self, Outcome};

pub async fn ingest(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, LedgerError> {
    let content_type = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok());

    match pipeline::run(state.store.as_ref(), content_type, &body).await? {
        Outcome::Stored(submission) => {
            tracing::info!("Appended signup submitted at {}", submission.submitted_at_iso());
        }
        // Silent 200 for spam
        Outcome::Spam => {}
    }

    Ok(Json(json!({ "success": true })))
}

pub async fn method_not_allowed() -> LedgerError {
    LedgerError::MethodNotAllowed
}
