//! Append-only CSV ledger kept in a remote versioned file.
//!
//! Every append is a read-modify-write against the store: read the current
//! content and its `sha`, add one row, and write back presenting the same
//! `sha`. The store refuses the write if the file moved in between.

pub mod csv;
pub mod github;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use serde_json::Value;

use crate::models::Submission;

/// Current state of the ledger file as returned by a read.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteFile {
    /// Base64 file content, possibly line-wrapped.
    pub content: String,
    /// Version token to present on the next write.
    pub sha: String,
}

/// A conditional write: applied only if `sha` is still current.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WriteRequest {
    pub message: String,
    pub content: String,
    pub sha: String,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("unable to read remote file")]
    Read { details: Value },
    #[error("unable to write remote file")]
    Write { details: String },
    #[error("remote file changed since it was read")]
    Conflict { details: String },
    #[error("remote file content is not valid: {0}")]
    Decode(String),
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

/// Versioned blob store holding the ledger, with compare-and-swap writes.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn read(&self) -> Result<RemoteFile, StoreError>;

    /// Fails with `StoreError::Conflict` when `req.sha` is stale.
    async fn write(&self, req: WriteRequest) -> Result<(), StoreError>;
}

/// Append one submission row to the ledger. One read, one write, no retry.
pub async fn append(store: &dyn ContentStore, submission: &Submission) -> Result<(), StoreError> {
    let file = store.read().await?;
    tracing::info!("Read ledger at sha {}", file.sha);

    let mut text = decode_content(&file.content)?;
    text.push_str(&csv::render_row(submission));

    store
        .write(WriteRequest {
            message: format!("New signup from {}", submission.email),
            content: STANDARD.encode(text.as_bytes()),
            sha: file.sha,
        })
        .await
}

/// Decode base64 file content into UTF-8 text, ignoring line wrapping.
pub fn decode_content(content: &str) -> Result<String, StoreError> {
    let compact: String = content
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let bytes = STANDARD
        .decode(compact)
        .map_err(|e| StoreError::Decode(format!("invalid base64: {e}")))?;
    String::from_utf8(bytes).map_err(|e| StoreError::Decode(format!("invalid UTF-8: {e}")))
}
