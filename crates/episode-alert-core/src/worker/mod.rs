//! Offline cache and request router.
//!
//! `OfflineWorker` precaches the app shell at install time, drops stores left
//! by older versions at activation, and then routes every intercepted request
//! by category:
//!
//! - API calls (`/api/` on the app origin): network first, cached copy on failure
//! - Page navigations: network first, offline document on failure
//! - Other same-origin assets: cache first
//! - Cross-origin requests: never intercepted
//!
//! It also replays queued watchlist writes on the sync signal and turns push
//! messages into notifications. Host services (cache storage, network,
//! pending-action queue, notifications, open pages) are traits so that the
//! worker can run against disk and reqwest or against in-memory fakes.

pub mod cache;
pub mod classify;
pub mod disk;
pub mod error;
pub mod network;
pub mod notify;
pub mod offline;
pub mod request;
pub mod sync;

pub use cache::{CacheStorage, MemoryCacheStorage};
pub use classify::{classify, RequestCategory};
pub use disk::DiskCacheStorage;
pub use error::{CacheError, NetworkError, WorkerError};
pub use network::{HttpNetwork, Network};
pub use notify::{ClickOutcome, Clients, Notification, Notifier, PushPayload, WindowClient};
pub use offline::{
    FetchOutcome, OfflineWorker, WorkerConfig, WorkerHost, WorkerState, OFFLINE_DOCUMENT,
    PRECACHE_MANIFEST,
};
pub use request::{Request, RequestMode, Response, ResponseKind};
pub use sync::{drain_pending_actions, PendingAction, PendingActionStore, SyncReport, SYNC_TAG};
