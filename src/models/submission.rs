use chrono::{DateTime, SecondsFormat, Utc};

/// A validated form submission, ready to be appended to the ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub name: String,
    pub email: String,
    pub censorship: String,
    pub address: String,
    pub phone: String,
    pub submitted_at: DateTime<Utc>,
}

impl Submission {
    /// ISO-8601 with millisecond precision, e.g. `2024-05-01T12:00:00.000Z`.
    pub fn submitted_at_iso(&self) -> String {
        self.submitted_at.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}
