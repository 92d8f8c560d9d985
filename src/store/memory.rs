//! In-memory snapshot store for testing.

use std::collections::BTreeMap;

use anyhow::Result;
use chrono::NaiveDate;
use tokio::sync::Mutex;

use crate::snapshot::Snapshot;

use super::SnapshotStore;

/// In-memory store for testing purposes. Keyed by date, so the upsert
/// semantics fall out of the map directly.
pub struct MemorySnapshotStore {
    snapshots: Mutex<BTreeMap<NaiveDate, Snapshot>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self {
            snapshots: Mutex::new(BTreeMap::new()),
        }
    }
}

impl Default for MemorySnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn save(&self, snapshot: &Snapshot) -> Result<()> {
        let mut snapshots = self.snapshots.lock().await;
        snapshots.insert(snapshot.date, snapshot.clone());
        Ok(())
    }

    async fn all(&self) -> Result<Vec<Snapshot>> {
        let snapshots = self.snapshots.lock().await;
        Ok(snapshots.values().cloned().collect())
    }

    async fn latest(&self) -> Result<Option<Snapshot>> {
        let snapshots = self.snapshots.lock().await;
        Ok(snapshots.values().next_back().cloned())
    }
}
