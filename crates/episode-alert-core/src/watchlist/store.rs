use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::StoreResult;
use crate::utils::write_atomic;

/// Key of the durable slot holding the watchlist.
pub const WATCHLIST_SLOT: &str = "watchlist-storage";

/// Persisted state envelope version.
const SLOT_VERSION: u32 = 0;

/// Metadata API show identifier.
pub type ShowId = u64;

/// A watchlist mutation, queued for replay against the server while offline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WatchlistAction {
    #[serde(rename_all = "camelCase")]
    Add { show_id: ShowId },
    #[serde(rename_all = "camelCase")]
    Remove { show_id: ShowId },
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct WatchlistState {
    #[serde(default)]
    watchlist: Vec<ShowId>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedSlot {
    state: WatchlistState,
    #[serde(default)]
    version: u32,
}

pub struct WatchlistStore {
    path: PathBuf,
    watchlist: Vec<ShowId>,
}

impl WatchlistStore {
    /// Load the watchlist from `data_dir`, starting empty if no slot exists.
    pub fn load(data_dir: &Path) -> StoreResult<Self> {
        let path = data_dir.join(format!("{}.json", WATCHLIST_SLOT));
        let watchlist = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            let slot: PersistedSlot = serde_json::from_str(&contents)?;
            slot.state.watchlist
        } else {
            Vec::new()
        };

        debug!(path = %path.display(), count = watchlist.len(), "Loaded watchlist");
        Ok(Self { path, watchlist })
    }

    /// Current watchlist in insertion order.
    pub fn watchlist(&self) -> &[ShowId] {
        &self.watchlist
    }

    pub fn is_in_watchlist(&self, id: ShowId) -> bool {
        self.watchlist.contains(&id)
    }

    /// Append `id` unless already present. Returns whether it was added.
    ///
    /// The new list is persisted before it replaces the in-memory one, so a
    /// storage failure leaves the store unchanged.
    pub fn add_to_watchlist(&mut self, id: ShowId) -> StoreResult<bool> {
        if self.is_in_watchlist(id) {
            return Ok(false);
        }
        let mut next = self.watchlist.clone();
        next.push(id);
        self.commit(next)?;
        info!(show_id = id, "Added show to watchlist");
        Ok(true)
    }

    /// Remove every occurrence of `id`. Returns whether anything was removed.
    pub fn remove_from_watchlist(&mut self, id: ShowId) -> StoreResult<bool> {
        if !self.is_in_watchlist(id) {
            return Ok(false);
        }
        let next: Vec<ShowId> = self.watchlist.iter().copied().filter(|&w| w != id).collect();
        self.commit(next)?;
        info!(show_id = id, "Removed show from watchlist");
        Ok(true)
    }

    /// Apply a watchlist action. Returns whether the watchlist changed.
    pub fn apply(&mut self, action: WatchlistAction) -> StoreResult<bool> {
        match action {
            WatchlistAction::Add { show_id } => self.add_to_watchlist(show_id),
            WatchlistAction::Remove { show_id } => self.remove_from_watchlist(show_id),
        }
    }

    /// Replace the whole watchlist with a previously observed state.
    pub fn restore(&mut self, ids: Vec<ShowId>) -> StoreResult<()> {
        self.commit(ids)?;
        debug!(count = self.watchlist.len(), "Restored watchlist");
        Ok(())
    }

    fn commit(&mut self, next: Vec<ShowId>) -> StoreResult<()> {
        let slot = PersistedSlot {
            state: WatchlistState { watchlist: next },
            version: SLOT_VERSION,
        };
        let contents = serde_json::to_vec(&slot)?;
        write_atomic(&self.path, &contents)?;
        self.watchlist = slot.state.watchlist;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_when_no_slot() {
        let dir = TempDir::new().unwrap();
        let store = WatchlistStore::load(dir.path()).unwrap();
        assert!(store.watchlist().is_empty());
        assert!(!store.is_in_watchlist(1399));
    }

    #[test]
    fn test_add_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let mut store = WatchlistStore::load(dir.path()).unwrap();
        assert!(store.add_to_watchlist(1399).unwrap());
        assert!(!store.add_to_watchlist(1399).unwrap());
        assert_eq!(store.watchlist(), &[1399]);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let dir = TempDir::new().unwrap();
        let mut store = WatchlistStore::load(dir.path()).unwrap();
        store.add_to_watchlist(1).unwrap();
        store.add_to_watchlist(2).unwrap();
        assert!(!store.remove_from_watchlist(3).unwrap());
        assert_eq!(store.watchlist(), &[1, 2]);
    }

    #[test]
    fn test_remove_keeps_order() {
        let dir = TempDir::new().unwrap();
        let mut store = WatchlistStore::load(dir.path()).unwrap();
        for id in [5, 3, 9] {
            store.add_to_watchlist(id).unwrap();
        }
        assert!(store.remove_from_watchlist(3).unwrap());
        assert_eq!(store.watchlist(), &[5, 9]);
    }

    #[test]
    fn test_reload_round_trip() {
        let dir = TempDir::new().unwrap();
        {
            let mut store = WatchlistStore::load(dir.path()).unwrap();
            for id in [42, 7, 1399, 3] {
                store.add_to_watchlist(id).unwrap();
            }
            store.remove_from_watchlist(7).unwrap();
        }
        let reloaded = WatchlistStore::load(dir.path()).unwrap();
        assert_eq!(reloaded.watchlist(), &[42, 1399, 3]);
    }

    #[test]
    fn test_apply_and_restore() {
        let dir = TempDir::new().unwrap();
        let mut store = WatchlistStore::load(dir.path()).unwrap();
        for id in [5, 3, 9] {
            store.add_to_watchlist(id).unwrap();
        }
        let before = store.watchlist().to_vec();

        assert!(store.apply(WatchlistAction::Remove { show_id: 3 }).unwrap());
        assert!(!store.apply(WatchlistAction::Remove { show_id: 3 }).unwrap());
        store.restore(before).unwrap();

        let reloaded = WatchlistStore::load(dir.path()).unwrap();
        assert_eq!(reloaded.watchlist(), &[5, 3, 9]);
    }

    #[test]
    fn test_slot_format() {
        let dir = TempDir::new().unwrap();
        let mut store = WatchlistStore::load(dir.path()).unwrap();
        store.add_to_watchlist(10).unwrap();

        let raw = std::fs::read_to_string(dir.path().join("watchlist-storage.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["state"]["watchlist"], serde_json::json!([10]));
        assert_eq!(value["version"], 0);
    }

    #[test]
    fn test_corrupt_slot_is_an_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("watchlist-storage.json"), "{not json").unwrap();
        assert!(WatchlistStore::load(dir.path()).is_err());
    }

    #[test]
    fn test_failed_persist_leaves_state_unchanged() {
        let dir = TempDir::new().unwrap();
        let mut store = WatchlistStore::load(dir.path()).unwrap();
        store.add_to_watchlist(1).unwrap();

        // A directory squatting on the slot path makes the rename fail
        let slot = dir.path().join("watchlist-storage.json");
        std::fs::remove_file(&slot).unwrap();
        std::fs::create_dir(&slot).unwrap();
        std::fs::write(slot.join("blocker"), "x").unwrap();

        assert!(store.add_to_watchlist(2).is_err());
        assert_eq!(store.watchlist(), &[1]);
    }

    #[test]
    fn test_action_serialization() {
        let action = WatchlistAction::Add { show_id: 1399 };
        let json = serde_json::to_value(action).unwrap();
        assert_eq!(json, serde_json::json!({"type": "add", "showId": 1399}));
    }
}
