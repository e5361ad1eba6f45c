//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which includes the app origin, the deployed cache version and the
//! metadata API endpoints.
//!
//! Configuration is stored at `~/.config/episode-alert/config.json`.
//! The TMDB API key is never written to disk; it is read from the
//! `TMDB_API_KEY` environment variable.

use std::fmt;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

/// Application name used for config/data directory paths
const APP_NAME: &str = "episode-alert";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Name of the cache store for the currently deployed version.
/// Bumping the suffix invalidates every previously cached entry.
pub const CACHE_NAME: &str = "episode-alert-v1";

const DEFAULT_ORIGIN: &str = "http://localhost:8080";
const DEFAULT_TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";
const DEFAULT_TMDB_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p";

pub const API_KEY_ENV: &str = "TMDB_API_KEY";
const BASE_URL_ENV: &str = "TMDB_BASE_URL";
const IMAGE_BASE_URL_ENV: &str = "TMDB_IMAGE_BASE_URL";

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Origin the app is served from; requests elsewhere bypass the worker.
    pub origin: String,
    pub cache_name: String,
    pub tmdb_base_url: String,
    pub tmdb_image_base_url: String,
    pub data_dir: Option<PathBuf>,
    /// TMDB bearer token, taken from the environment on load.
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("origin", &self.origin)
            .field("cache_name", &self.cache_name)
            .field("tmdb_base_url", &self.tmdb_base_url)
            .field("tmdb_image_base_url", &self.tmdb_image_base_url)
            .field("data_dir", &self.data_dir)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            origin: DEFAULT_ORIGIN.to_string(),
            cache_name: CACHE_NAME.to_string(),
            tmdb_base_url: DEFAULT_TMDB_BASE_URL.to_string(),
            tmdb_image_base_url: DEFAULT_TMDB_IMAGE_BASE_URL.to_string(),
            data_dir: None,
            api_key: None,
        }
    }
}

impl Config {
    /// Load the config file (or defaults), then apply environment overrides.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents).context("Failed to parse config file")?
        } else {
            Self::default()
        };
        config.apply_env();
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn apply_env(&mut self) {
        self.api_key = std::env::var(API_KEY_ENV).ok();
        if let Ok(base) = std::env::var(BASE_URL_ENV) {
            self.tmdb_base_url = base;
        }
        if let Ok(base) = std::env::var(IMAGE_BASE_URL_ENV) {
            self.tmdb_image_base_url = base;
        }
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// The TMDB bearer token, if configured.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| !key.trim().is_empty())
    }

    pub fn origin_url(&self) -> Result<Url> {
        Url::parse(&self.origin).with_context(|| format!("Invalid app origin: {}", self.origin))
    }

    /// Directory holding the watchlist slot and the offline database.
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.data_dir {
            return Ok(dir.clone());
        }
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    /// Directory holding the worker's cache stores.
    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }
}
