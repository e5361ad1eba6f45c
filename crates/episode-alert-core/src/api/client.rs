//! API client for the TMDB v3 show-metadata API.
//!
//! This module provides the `TmdbClient` struct for fetching show details,
//! search results, curated lists and season listings. Every list result is
//! passed through the genre filter before it is returned.

use std::time::Duration;

use futures::stream::{self, StreamExt};
use reqwest::{header, Client};
use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};
use url::Url;

use crate::config::Config;
use crate::models::{Season, ShowListResponse, TvShow};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 8;

/// Maximum number of detail requests in flight when enriching a list.
const MAX_CONCURRENT_REQUESTS: usize = 8;

const LANGUAGE: &str = "en-US";

/// Extra objects requested with show details.
const DETAIL_APPENDS: &str = "next_episode_to_air,last_episode_to_air";

/// Image shown when a show or episode has no artwork.
pub const PLACEHOLDER_IMAGE: &str = "/placeholder.svg";

pub const DEFAULT_IMAGE_SIZE: &str = "original";

/// Build an artwork URL, or the placeholder when there is no path.
pub fn image_url(image_base_url: &str, path: Option<&str>, size: &str) -> String {
    match path.filter(|p| !p.is_empty()) {
        Some(path) => format!("{}/{}{}", image_base_url.trim_end_matches('/'), size, path),
        None => PLACEHOLDER_IMAGE.to_string(),
    }
}

/// Drop shows in hidden genres.
pub fn filter_shows(shows: Vec<TvShow>) -> Vec<TvShow> {
    shows
        .into_iter()
        .filter(|show| !show.is_filtered_genre())
        .collect()
}

/// Client for the metadata API.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct TmdbClient {
    client: Client,
    token: String,
    base_url: String,
    image_base_url: String,
}

impl TmdbClient {
    pub fn new(
        token: impl Into<String>,
        base_url: impl Into<String>,
        image_base_url: impl Into<String>,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            token: token.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            image_base_url: image_base_url.into(),
        })
    }

    /// Create a client from the loaded config. Fails if no API key is set.
    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        let token = config.api_key().ok_or(ApiError::MissingApiKey)?;
        Self::new(token, &config.tmdb_base_url, &config.tmdb_image_base_url)
    }

    pub fn image_url(&self, path: Option<&str>, size: Option<&str>) -> String {
        image_url(&self.image_base_url, path, size.unwrap_or(DEFAULT_IMAGE_SIZE))
    }

    fn build_url(&self, path: &str, params: &[(&str, &str)]) -> Result<Url, ApiError> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, path))?;
        url.query_pairs_mut().extend_pairs(params);
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        debug!(path = url.path(), "TMDB request");
        let response = self
            .client
            .get(url.clone())
            .bearer_auth(&self.token)
            .header(header::CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(ApiError::from_transport)?;

        let status = response.status();
        let body = response.text().await.map_err(ApiError::from_transport)?;
        if !status.is_success() {
            let err = ApiError::from_status(status, &body);
            error!(path = url.path(), error = %err, "TMDB request failed");
            return Err(err);
        }

        serde_json::from_str(&body).map_err(|e| {
            warn!(path = url.path(), error = %e, "Malformed TMDB response");
            ApiError::InvalidResponse(e.to_string())
        })
    }

    async fn get_list(&self, path: &str) -> Result<Vec<TvShow>, ApiError> {
        let url = self.build_url(path, &[("language", LANGUAGE), ("page", "1")])?;
        let list: ShowListResponse = self.get(url).await?;
        Ok(list.results)
    }

    /// Full details for one show, including its next and last episodes.
    pub async fn get_tv_show_details(&self, id: u64) -> Result<TvShow, ApiError> {
        let url = self.build_url(
            &format!("/tv/{}", id),
            &[("language", LANGUAGE), ("append_to_response", DETAIL_APPENDS)],
        )?;
        self.get(url).await
    }

    /// Search by name. A blank query returns nothing without a request.
    pub async fn search_tv_shows(&self, query: &str) -> Result<Vec<TvShow>, ApiError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let url = self.build_url(
            "/search/tv",
            &[("language", LANGUAGE), ("page", "1"), ("query", query)],
        )?;
        let list: ShowListResponse = self.get(url).await?;
        Ok(filter_shows(list.results))
    }

    /// Popular shows, each enriched with its details so next-episode data is
    /// available. A show whose details fail keeps its list entry.
    pub async fn get_popular_tv_shows(&self) -> Result<Vec<TvShow>, ApiError> {
        let listed = self.get_list("/tv/popular").await?;

        let shows: Vec<TvShow> = stream::iter(listed)
            .map(|show| async move {
                match self.get_tv_show_details(show.id).await {
                    Ok(details) => details,
                    Err(e) => {
                        warn!(show_id = show.id, error = %e, "Failed to get show details");
                        show
                    }
                }
            })
            .buffered(MAX_CONCURRENT_REQUESTS)
            .collect()
            .await;

        Ok(filter_shows(shows))
    }

    pub async fn get_top_rated_tv_shows(&self) -> Result<Vec<TvShow>, ApiError> {
        Ok(filter_shows(self.get_list("/tv/top_rated").await?))
    }

    pub async fn get_tv_shows_airing_today(&self) -> Result<Vec<TvShow>, ApiError> {
        Ok(filter_shows(self.get_list("/tv/airing_today").await?))
    }

    pub async fn get_season_details(
        &self,
        tv_id: u64,
        season_number: u32,
    ) -> Result<Season, ApiError> {
        let url = self.build_url(
            &format!("/tv/{}/season/{}", tv_id, season_number),
            &[("language", LANGUAGE)],
        )?;
        let season: Season = self.get(url).await?;
        Ok(season.with_episode_count())
    }
}
