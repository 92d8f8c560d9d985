//! Snapshot persistence backends.
//!
//! Both durable backends implement the same contract: `save` is an idempotent
//! upsert keyed by calendar date, `all` returns history in ascending date
//! order, and `latest` is the last element of that history.

mod github;
mod memory;
mod sqlite;

pub use github::GithubSnapshotStore;
pub use memory::MemorySnapshotStore;
pub use sqlite::SqliteSnapshotStore;

use std::str::FromStr;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::config::ResolvedConfig;
use crate::snapshot::Snapshot;

/// Storage trait for persisting dated net worth snapshots.
#[async_trait::async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Insert or replace the snapshot stored for its date.
    async fn save(&self, snapshot: &Snapshot) -> Result<()>;

    /// Every snapshot, ordered ascending by date.
    async fn all(&self) -> Result<Vec<Snapshot>>;

    /// The most recent snapshot, or `None` if the store is empty.
    async fn latest(&self) -> Result<Option<Snapshot>>;
}

/// Which persistence backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Sqlite,
    Github,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown storage backend: {0} (expected \"sqlite\" or \"github\")")]
pub struct ParseBackendError(String);

impl FromStr for Backend {
    type Err = ParseBackendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sqlite" => Ok(Backend::Sqlite),
            "github" => Ok(Backend::Github),
            other => Err(ParseBackendError(other.to_string())),
        }
    }
}

/// Build the snapshot store the configuration selects.
pub fn build_store(config: &ResolvedConfig) -> Result<Box<dyn SnapshotStore>> {
    match config.storage.backend {
        Backend::Sqlite => Ok(Box::new(SqliteSnapshotStore::open(&config.sqlite_path)?)),
        Backend::Github => {
            let github = &config.storage.github;
            if github.repo.is_empty() {
                bail!("GitHub backend selected but [storage.github] repo is not set");
            }
            let token = config.github_token()?;
            Ok(Box::new(
                GithubSnapshotStore::new(github.repo.clone(), github.file.clone(), token)
                    .with_api_base(github.api_base.clone()),
            ))
        }
    }
}
