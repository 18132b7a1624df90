//! Client for the hosting provider's repository contents API
//!
//! Writes are overwrite-if-current-revision-matches: each file's current blob
//! SHA is fetched first and sent back with the new content. A stale SHA makes
//! the provider reject the write, which surfaces as a generic API error.

use base64::Engine;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::config::RepositorySettings;
use crate::domain::{PublishError, PublishResult};

pub struct RepoClient {
    client: reqwest::Client,
    base_url: String,
    owner: String,
    repo: String,
    token: String,
    branch: String,
}

#[derive(Debug, Deserialize)]
struct ContentsEntry {
    sha: String,
}

impl RepoClient {
    /// Builds a client from validated repository settings; fails when the
    /// settings are incomplete, before any remote call
    pub fn new(settings: &RepositorySettings) -> PublishResult<Self> {
        let owner = require(&settings.owner, "repository.owner")?;
        let repo = require(&settings.name, "repository.name")?;
        let token = settings
            .resolve_token()
            .ok_or_else(|| PublishError::Misconfigured("repository token not set".into()))?;

        Ok(Self {
            client: reqwest::Client::new(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            owner,
            repo,
            token,
            branch: settings.branch.clone(),
        })
    }

    fn contents_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.base_url,
            self.owner,
            self.repo,
            path.trim_start_matches('/')
        )
    }

    /// Current blob SHA of a file on the target branch; `None` when absent
    pub async fn current_sha(&self, path: &str) -> PublishResult<Option<String>> {
        let response = self
            .client
            .get(self.contents_url(path))
            .query(&[("ref", self.branch.as_str())])
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", "copydesk")
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 404 {
            return Ok(None);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PublishError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let entry: ContentsEntry = response
            .json()
            .await
            .map_err(|e| PublishError::Encoding(format!("Failed to parse contents response: {e}")))?;
        Ok(Some(entry.sha))
    }

    /// Writes raw bytes to a path on the target branch, keyed to the file's
    /// current SHA (creates the file when absent)
    pub async fn put_file(&self, path: &str, bytes: &[u8], message: &str) -> PublishResult<()> {
        let sha = self.current_sha(path).await?;
        debug!(path, existing = sha.is_some(), "Writing repository file");

        let mut body = json!({
            "message": message,
            "content": base64::engine::general_purpose::STANDARD.encode(bytes),
            "branch": self.branch,
        });
        if let Some(sha) = sha {
            body["sha"] = json!(sha);
        }

        let response = self
            .client
            .put(self.contents_url(path))
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", "copydesk")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PublishError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(())
    }
}

fn require(value: &Option<String>, name: &str) -> PublishResult<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| PublishError::Misconfigured(format!("{name} not set")))
}
