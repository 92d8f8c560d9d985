//! GitHub contents API snapshot store.
//!
//! Snapshots live as a single JSON array in one file of a repository, read
//! and written through the contents endpoint. Every save is a
//! read-modify-write: fetch the current file and its blob sha, drop any entry
//! for the same date, append the new one, re-sort, and write back supplying
//! the previous sha so a concurrent writer surfaces as a conflict rather than
//! a silent overwrite. No retries; HTTP failures are fatal to the operation.

use anyhow::{anyhow, Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::snapshot::Snapshot;

use super::SnapshotStore;

const GITHUB_API_BASE: &str = "https://api.github.com";
const USER_AGENT: &str = "networth/0.1 (https://github.com/networth/networth)";
const COMMIT_MESSAGE: &str = "Update snapshots";

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    content: String,
    sha: String,
}

#[derive(Debug, Serialize)]
struct UpdateRequest<'a> {
    message: &'a str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

/// Snapshot store backed by a JSON file in a GitHub repository.
pub struct GithubSnapshotStore {
    client: reqwest::Client,
    api_base: String,
    /// Repository in "owner/name" form.
    repo: String,
    /// Path of the snapshot file within the repository.
    file_path: String,
    token: SecretString,
}

impl GithubSnapshotStore {
    pub fn new(
        repo: impl Into<String>,
        file_path: impl Into<String>,
        token: SecretString,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: GITHUB_API_BASE.to_string(),
            repo: repo.into(),
            file_path: file_path.into(),
            token,
        }
    }

    /// Overrides the API base URL (used by tests against a mock server).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Uses a custom reqwest client.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    fn contents_url(&self) -> String {
        format!(
            "{}/repos/{}/contents/{}",
            self.api_base, self.repo, self.file_path
        )
    }

    fn auth_header(&self) -> String {
        format!("token {}", self.token.expose_secret())
    }

    /// Fetch the snapshot file. A 404 reads as an empty store with no
    /// version token (the file has never been written).
    async fn fetch_file(&self) -> Result<(Vec<Snapshot>, Option<String>)> {
        let response = self
            .client
            .get(self.contents_url())
            .header("Authorization", self.auth_header())
            .header("Accept", "application/vnd.github.v3+json")
            .header("User-Agent", USER_AGENT)
            .send()
            .await
            .context("Failed to fetch snapshot file from GitHub")?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok((Vec::new(), None));
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("GitHub contents API error: {} - {}", status, body));
        }

        let data: ContentsResponse = response
            .json()
            .await
            .context("Failed to parse GitHub contents response")?;

        // GitHub wraps the base64 payload across lines.
        let encoded: String = data.content.split_whitespace().collect();
        let raw = STANDARD
            .decode(encoded)
            .context("Failed to decode snapshot file content")?;
        let snapshots: Vec<Snapshot> =
            serde_json::from_slice(&raw).context("Failed to parse snapshot file")?;

        Ok((snapshots, Some(data.sha)))
    }

    async fn write_file(&self, snapshots: &[Snapshot], sha: Option<&str>) -> Result<()> {
        let raw =
            serde_json::to_vec_pretty(snapshots).context("Failed to serialize snapshots")?;
        let body = UpdateRequest {
            message: COMMIT_MESSAGE,
            content: STANDARD.encode(raw),
            sha,
        };

        let response = self
            .client
            .put(self.contents_url())
            .header("Authorization", self.auth_header())
            .header("Accept", "application/vnd.github.v3+json")
            .header("User-Agent", USER_AGENT)
            .json(&body)
            .send()
            .await
            .context("Failed to write snapshot file to GitHub")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("GitHub contents API error: {} - {}", status, body));
        }

        Ok(())
    }
}

#[async_trait::async_trait]
impl SnapshotStore for GithubSnapshotStore {
    async fn save(&self, snapshot: &Snapshot) -> Result<()> {
        let (mut snapshots, sha) = self.fetch_file().await?;

        snapshots.retain(|s| s.date != snapshot.date);
        snapshots.push(snapshot.clone());
        snapshots.sort_by_key(|s| s.date);

        self.write_file(&snapshots, sha.as_deref()).await
    }

    async fn all(&self) -> Result<Vec<Snapshot>> {
        let (mut snapshots, _) = self.fetch_file().await?;
        // The file is kept sorted on write; re-sort anyway in case it was
        // edited out of band.
        snapshots.sort_by_key(|s| s.date);
        Ok(snapshots)
    }

    async fn latest(&self) -> Result<Option<Snapshot>> {
        let mut snapshots = self.all().await?;
        Ok(snapshots.pop())
    }
}
