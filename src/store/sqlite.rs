//! Embedded SQLite snapshot store.
//!
//! One row per calendar date with the breakdown serialized as a JSON text
//! column. Totals are stored as decimal strings so values round-trip exactly.

use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use tokio::sync::Mutex;

use crate::snapshot::{Breakdown, Snapshot};

use super::SnapshotStore;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS snapshots (
    date TEXT PRIMARY KEY,
    total_value TEXT NOT NULL,
    breakdown TEXT NOT NULL
)";

/// SQLite-backed snapshot store.
pub struct SqliteSnapshotStore {
    conn: Mutex<Connection>,
}

impl SqliteSnapshotStore {
    /// Open (creating if necessary) the snapshot database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open snapshot database: {}", path.display()))?;
        Self::init(conn)
    }

    /// Open a transient in-memory database, mainly for tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn =
            Connection::open_in_memory().context("Failed to open in-memory snapshot database")?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute(SCHEMA, [])
            .context("Failed to create snapshots table")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn row_to_snapshot(date: String, total_value: String, breakdown: String) -> Result<Snapshot> {
        Ok(Snapshot {
            date: date
                .parse()
                .with_context(|| format!("Invalid snapshot date: {date}"))?,
            total_value: total_value
                .parse()
                .with_context(|| format!("Invalid snapshot total: {total_value}"))?,
            breakdown: serde_json::from_str::<Breakdown>(&breakdown)
                .context("Failed to parse snapshot breakdown")?,
        })
    }
}

#[async_trait::async_trait]
impl SnapshotStore for SqliteSnapshotStore {
    async fn save(&self, snapshot: &Snapshot) -> Result<()> {
        let breakdown = serde_json::to_string(&snapshot.breakdown)
            .context("Failed to serialize snapshot breakdown")?;

        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO snapshots (date, total_value, breakdown) VALUES (?1, ?2, ?3)
             ON CONFLICT(date) DO UPDATE SET
                 total_value = excluded.total_value,
                 breakdown = excluded.breakdown",
            params![
                snapshot.date.to_string(),
                snapshot.total_value.to_string(),
                breakdown
            ],
        )
        .context("Failed to save snapshot")?;
        Ok(())
    }

    async fn all(&self) -> Result<Vec<Snapshot>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare("SELECT date, total_value, breakdown FROM snapshots ORDER BY date ASC")
            .context("Failed to prepare snapshot query")?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })
            .context("Failed to query snapshots")?;

        let mut snapshots = Vec::new();
        for row in rows {
            let (date, total_value, breakdown) = row.context("Failed to read snapshot row")?;
            snapshots.push(Self::row_to_snapshot(date, total_value, breakdown)?);
        }
        Ok(snapshots)
    }

    async fn latest(&self) -> Result<Option<Snapshot>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare(
                "SELECT date, total_value, breakdown FROM snapshots ORDER BY date DESC LIMIT 1",
            )
            .context("Failed to prepare snapshot query")?;

        let mut rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })
            .context("Failed to query snapshots")?;

        match rows.next() {
            Some(row) => {
                let (date, total_value, breakdown) =
                    row.context("Failed to read snapshot row")?;
                Ok(Some(Self::row_to_snapshot(date, total_value, breakdown)?))
            }
            None => Ok(None),
        }
    }
}
