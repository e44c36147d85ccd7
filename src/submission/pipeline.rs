use chrono::Utc;

use crate::error::LedgerError;
use crate::ledger::{self, ContentStore};
use crate::models::Submission;

use super::fields;
use super::honeypot;
use super::parser;

pub enum Outcome {
    /// Row appended to the ledger.
    Stored(Submission),
    /// Honeypot tripped; nothing written.
    Spam,
}

/// Normalize, validate and append one submission.
pub async fn run(
    store: &dyn ContentStore,
    content_type: Option<&str>,
    body: &[u8],
) -> Result<Outcome, LedgerError> {
    let data = parser::parse_body(content_type, body);

    if honeypot::is_spam(&data) {
        tracing::debug!("Honeypot field filled, dropping submission");
        return Ok(Outcome::Spam);
    }

    let submission = fields::validate(&data, Utc::now())?;

    ledger::append(store, &submission).await?;

    Ok(Outcome::Stored(submission))
}
