use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, Transaction};
use serde_json::Value;
use tracing::{debug, error, info};

use crate::error::{StoreError, StoreResult};
use crate::watchlist::{ShowId, WatchlistAction, WatchlistStore};
use crate::worker::sync::{PendingAction, PendingActionStore};

/// Database file name inside the data directory.
pub const DB_FILE: &str = "episode-alert.db";

/// Current schema version, tracked in `PRAGMA user_version`.
const SCHEMA_VERSION: i32 = 1;

/// Offline database: a mirror of the watchlist and the queue of pending
/// actions waiting for the next sync.
///
/// Thread-safe via internal mutex on the connection.
#[derive(Clone)]
pub struct OfflineDb {
    conn: Arc<Mutex<Connection>>,
}

impl OfflineDb {
    /// Open (creating if needed) the database at `path`.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        debug!(path = %path.display(), "Opened offline database");
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> StoreResult<Self> {
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.upgrade_schema()?;
        Ok(db)
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }

    fn upgrade_schema(&self) -> StoreResult<()> {
        let conn = self.lock()?;
        let version: i32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
        if version >= SCHEMA_VERSION {
            return Ok(());
        }

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS watchlist (
                id INTEGER PRIMARY KEY,
                position INTEGER NOT NULL,
                added_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS pending_actions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                payload TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            "#,
        )?;
        conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
        info!(from = version, to = SCHEMA_VERSION, "Upgraded offline database schema");
        Ok(())
    }

    /// Queue a write for the next sync. Returns the assigned id.
    pub fn enqueue_action(&self, payload: &Value) -> StoreResult<i64> {
        let conn = self.lock()?;
        let id = insert_pending_action(&conn, payload)?;
        debug!(id = id, "Queued pending action");
        Ok(id)
    }

    /// Pending actions in insertion order.
    pub fn list_pending_actions(&self) -> StoreResult<Vec<PendingAction>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT id, payload FROM pending_actions ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut actions = Vec::new();
        for row in rows {
            let (id, payload) = row?;
            actions.push(PendingAction {
                id,
                payload: serde_json::from_str(&payload)?,
            });
        }
        Ok(actions)
    }

    pub fn remove_pending_action(&self, id: i64) -> StoreResult<()> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM pending_actions WHERE id = ?1", params![id])?;
        Ok(())
    }

    /// Replace the watchlist mirror with `ids`, keeping their order.
    pub fn save_watchlist_snapshot(&self, ids: &[ShowId]) -> StoreResult<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        write_snapshot(&tx, ids)?;
        tx.commit()?;
        Ok(())
    }

    pub fn watchlist_snapshot(&self) -> StoreResult<Vec<ShowId>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT id FROM watchlist ORDER BY position")?;
        let ids = stmt
            .query_map([], |row| row.get::<_, i64>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        ids.into_iter()
            .map(|id| ShowId::try_from(id).map_err(|_| StoreError::IdOutOfRange(id.to_string())))
            .collect()
    }

    /// Apply `action` to the watchlist, then mirror the result and queue the
    /// action for sync in one transaction.
    ///
    /// If the database write fails the watchlist is restored to its previous
    /// contents, so a change is never kept without its pending action.
    /// Returns whether the watchlist changed; a no-op queues nothing.
    pub fn record_watchlist_change(
        &self,
        store: &mut WatchlistStore,
        action: WatchlistAction,
    ) -> StoreResult<bool> {
        let previous = store.watchlist().to_vec();
        if !store.apply(action)? {
            return Ok(false);
        }

        if let Err(e) = self.mirror_and_enqueue(store.watchlist(), action) {
            error!(error = %e, "Failed to queue watchlist change, rolling back");
            if let Err(restore_err) = store.restore(previous) {
                error!(error = %restore_err, "Failed to roll back watchlist change");
            }
            return Err(e);
        }
        Ok(true)
    }

    fn mirror_and_enqueue(&self, ids: &[ShowId], action: WatchlistAction) -> StoreResult<()> {
        let payload = serde_json::to_value(action)?;
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        write_snapshot(&tx, ids)?;
        let id = insert_pending_action(&tx, &payload)?;
        tx.commit()?;
        debug!(id = id, "Queued watchlist change for sync");
        Ok(())
    }
}

fn insert_pending_action(conn: &Connection, payload: &Value) -> StoreResult<i64> {
    conn.execute(
        "INSERT INTO pending_actions (payload, created_at) VALUES (?1, ?2)",
        params![serde_json::to_string(payload)?, Utc::now().to_rfc3339()],
    )?;
    Ok(conn.last_insert_rowid())
}

fn write_snapshot(tx: &Transaction<'_>, ids: &[ShowId]) -> StoreResult<()> {
    tx.execute("DELETE FROM watchlist", [])?;
    let now = Utc::now().to_rfc3339();
    for (position, &id) in ids.iter().enumerate() {
        let stored = i64::try_from(id).map_err(|_| StoreError::IdOutOfRange(id.to_string()))?;
        tx.execute(
            "INSERT OR REPLACE INTO watchlist (id, position, added_at) VALUES (?1, ?2, ?3)",
            params![stored, position as i64, now],
        )?;
    }
    Ok(())
}

#[async_trait]
impl PendingActionStore for OfflineDb {
    async fn pending_actions(&self) -> Result<Vec<PendingAction>, StoreError> {
        self.list_pending_actions()
    }

    async fn delete_pending_action(&self, id: i64) -> Result<(), StoreError> {
        self.remove_pending_action(id)
    }
}
