use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::{RequestBuilder, StatusCode};
use serde_json::Value;

use crate::config::RepoConfig;

use super::{ContentStore, RemoteFile, StoreError, WriteRequest};

const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";

/// Ledger file stored in a GitHub repository, accessed via the contents API.
pub struct GitHubContents {
    client: reqwest::Client,
    config: RepoConfig,
    url: String,
}

impl GitHubContents {
    pub fn new(config: RepoConfig, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let url = config.contents_url();
        Ok(Self {
            client,
            config,
            url,
        })
    }

    fn authed(&self, req: RequestBuilder) -> RequestBuilder {
        req.bearer_auth(&self.config.token)
            .header(USER_AGENT, &self.config.user_agent)
            .header(ACCEPT, GITHUB_ACCEPT)
    }
}

/// Pull content and sha out of a contents API response.
///
/// Files over 1 MB come back with `"encoding": "none"` and empty content, so
/// both an empty `content` and a non-base64 encoding are refused; appending
/// to them would replace the whole file.
fn parse_file(details: &Value) -> Option<RemoteFile> {
    let encoding = details.get("encoding").and_then(Value::as_str);
    if encoding.is_some_and(|e| e != "base64") {
        return None;
    }

    let content = details
        .get("content")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())?;
    let sha = details
        .get("sha")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())?;

    Some(RemoteFile {
        content: content.to_string(),
        sha: sha.to_string(),
    })
}

#[async_trait]
impl ContentStore for GitHubContents {
    async fn read(&self) -> Result<RemoteFile, StoreError> {
        let resp = self.authed(self.client.get(&self.url)).send().await?;
        let ok = resp.status().is_success();
        let body = resp.text().await?;

        let details = serde_json::from_str::<Value>(&body).unwrap_or(Value::String(body));

        if !ok {
            return Err(StoreError::Read { details });
        }

        let file = parse_file(&details);
        file.ok_or(StoreError::Read { details })
    }

    async fn write(&self, req: WriteRequest) -> Result<(), StoreError> {
        let resp = self
            .authed(self.client.put(&self.url))
            .json(&req)
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            let sha = resp
                .json::<Value>()
                .await
                .ok()
                .and_then(|v| v["content"]["sha"].as_str().map(str::to_string))
                .unwrap_or_default();
            tracing::info!("Committed ledger update, new sha {sha}");
            return Ok(());
        }

        let details = resp.text().await?;
        if status == StatusCode::CONFLICT {
            Err(StoreError::Conflict { details })
        } else {
            Err(StoreError::Write { details })
        }
    }
}
