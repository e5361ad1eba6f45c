//! Data models for show metadata.
//!
//! Payloads from the metadata API are deserialized straight into these
//! types. Missing or `null` fields fall back to empty values so a sparse
//! list item and a full details payload share one shape.

pub mod show;

pub use show::{Creator, Episode, Genre, Network, Season, ShowListResponse, TvShow, FILTERED_GENRE_IDS};
