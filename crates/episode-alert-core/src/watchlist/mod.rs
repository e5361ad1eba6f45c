//! Persisted watchlist.
//!
//! This module provides `WatchlistStore`, an ordered, duplicate-free list of
//! show identifiers that is loaded once at startup and flushed to a durable
//! slot on every mutation.

pub mod store;

pub use store::{ShowId, WatchlistAction, WatchlistStore, WATCHLIST_SLOT};
