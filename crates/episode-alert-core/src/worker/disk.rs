use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use super::cache::CacheStorage;
use super::error::CacheError;
use super::request::{Request, Response};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData<T> {
    pub data: T,
    pub cached_at: DateTime<Utc>,
}

impl<T> CachedData<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    pub fn age_minutes(&self) -> i64 {
        (Utc::now() - self.cached_at).num_minutes()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedEntry {
    identity: String,
    response: Response,
}

/// Cache storage on disk: one directory per store, one JSON file per entry.
pub struct DiskCacheStorage {
    root: PathBuf,
}

impl DiskCacheStorage {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn store_path(&self, name: &str) -> Result<PathBuf, CacheError> {
        let valid = !name.is_empty()
            && name != "."
            && name != ".."
            && !name.contains(['/', '\\']);
        if !valid {
            return Err(CacheError::InvalidName(name.to_string()));
        }
        Ok(self.root.join(name))
    }

    fn entry_path(&self, name: &str, request: &Request) -> Result<PathBuf, CacheError> {
        let digest = Sha256::digest(request.identity().as_bytes());
        Ok(self
            .store_path(name)?
            .join(format!("{}.json", hex::encode(digest))))
    }
}

#[async_trait]
impl CacheStorage for DiskCacheStorage {
    async fn open(&self, name: &str) -> Result<(), CacheError> {
        tokio::fs::create_dir_all(self.store_path(name)?).await?;
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, CacheError> {
        let mut names = Vec::new();
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(names),
            Err(e) => return Err(e.into()),
        };
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_dir() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    async fn delete(&self, name: &str) -> Result<bool, CacheError> {
        let path = self.store_path(name)?;
        match tokio::fs::remove_dir_all(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn match_request(
        &self,
        name: &str,
        request: &Request,
    ) -> Result<Option<Response>, CacheError> {
        let path = self.entry_path(name, request)?;
        let contents = match tokio::fs::read(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let cached: CachedData<CachedEntry> = serde_json::from_slice(&contents)?;
        if cached.data.identity != request.identity() {
            return Ok(None);
        }
        debug!(
            store = name,
            request = %cached.data.identity,
            age_minutes = cached.age_minutes(),
            "Cache hit"
        );
        Ok(Some(cached.data.response))
    }

    async fn put(
        &self,
        name: &str,
        request: &Request,
        response: &Response,
    ) -> Result<(), CacheError> {
        let path = self.entry_path(name, request)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let cached = CachedData::new(CachedEntry {
            identity: request.identity(),
            response: response.clone(),
        });
        let contents = serde_json::to_vec(&cached)?;

        let temp_path = path.with_extension("json.tmp");
        tokio::fs::write(&temp_path, contents).await?;
        tokio::fs::rename(&temp_path, &path).await?;
        Ok(())
    }
}
