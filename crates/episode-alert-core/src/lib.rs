//! Episode Alert core - offline support and state for a TV-show tracker.
//!
//! This crate holds everything the tracker needs below its UI: the offline
//! request router with its cache stores and sync queue, the persisted
//! watchlist, air-date countdowns, install-prompt capture, and a client for
//! the TMDB show-metadata API.

pub mod api;
pub mod config;
pub mod countdown;
pub mod db;
pub mod error;
pub mod install;
pub mod models;
pub mod utils;
pub mod watchlist;
pub mod worker;

pub use api::{ApiError, TmdbClient};
pub use config::Config;
pub use countdown::{calculate_time_left, Countdown, TimeLeft};
pub use db::OfflineDb;
pub use error::{StoreError, StoreResult};
pub use install::{InstallPromptService, UserChoice};
pub use models::{Episode, Season, TvShow};
pub use watchlist::{ShowId, WatchlistAction, WatchlistStore};
pub use worker::{OfflineWorker, WorkerConfig, WorkerError, WorkerHost};
