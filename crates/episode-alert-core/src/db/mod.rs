//! SQLite offline database.
//!
//! Holds a mirror of the watchlist and the queue of writes made while
//! offline. The worker drains the queue through `PendingActionStore`.

pub mod offline;

pub use offline::{OfflineDb, DB_FILE};
