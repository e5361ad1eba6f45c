//! REST API client module for TMDB show metadata.
//!
//! This module provides the `TmdbClient` for fetching show details, search
//! results, curated lists and seasons. Requests authenticate with a bearer
//! token read from the environment and time out after 8 seconds.

pub mod client;
pub mod error;

pub use client::{filter_shows, image_url, TmdbClient, DEFAULT_IMAGE_SIZE, PLACEHOLDER_IMAGE};
pub use error::ApiError;
