use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::error::CacheError;
use super::request::{Request, Response};

/// Named request/response stores.
///
/// Each operation is atomic on its own; callers racing on the same request
/// key get last-write-wins.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Create the store if it does not exist yet.
    async fn open(&self, name: &str) -> Result<(), CacheError>;

    /// Names of every existing store, sorted.
    async fn keys(&self) -> Result<Vec<String>, CacheError>;

    /// Delete a store. Returns whether it existed.
    async fn delete(&self, name: &str) -> Result<bool, CacheError>;

    async fn match_request(
        &self,
        name: &str,
        request: &Request,
    ) -> Result<Option<Response>, CacheError>;

    async fn put(&self, name: &str, request: &Request, response: &Response)
        -> Result<(), CacheError>;

    async fn put_all(&self, name: &str, entries: &[(Request, Response)]) -> Result<(), CacheError> {
        for (request, response) in entries {
            self.put(name, request, response).await?;
        }
        Ok(())
    }
}

/// Process-local cache storage.
#[derive(Default)]
pub struct MemoryCacheStorage {
    stores: RwLock<BTreeMap<String, HashMap<String, Response>>>,
}

impl MemoryCacheStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries in a store, if it exists.
    pub async fn len(&self, name: &str) -> Option<usize> {
        self.stores.read().await.get(name).map(HashMap::len)
    }
}

#[async_trait]
impl CacheStorage for MemoryCacheStorage {
    async fn open(&self, name: &str) -> Result<(), CacheError> {
        self.stores.write().await.entry(name.to_string()).or_default();
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, CacheError> {
        Ok(self.stores.read().await.keys().cloned().collect())
    }

    async fn delete(&self, name: &str) -> Result<bool, CacheError> {
        Ok(self.stores.write().await.remove(name).is_some())
    }

    async fn match_request(
        &self,
        name: &str,
        request: &Request,
    ) -> Result<Option<Response>, CacheError> {
        Ok(self
            .stores
            .read()
            .await
            .get(name)
            .and_then(|store| store.get(&request.identity()))
            .cloned())
    }

    async fn put(
        &self,
        name: &str,
        request: &Request,
        response: &Response,
    ) -> Result<(), CacheError> {
        self.stores
            .write()
            .await
            .entry(name.to_string())
            .or_default()
            .insert(request.identity(), response.clone());
        Ok(())
    }

    async fn put_all(&self, name: &str, entries: &[(Request, Response)]) -> Result<(), CacheError> {
        let mut stores = self.stores.write().await;
        let store = stores.entry(name.to_string()).or_default();
        for (request, response) in entries {
            store.insert(request.identity(), response.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn request(path: &str) -> Request {
        Request::get(Url::parse("https://tv.example").unwrap().join(path).unwrap())
    }

    #[tokio::test]
    async fn test_put_and_match() {
        let caches = MemoryCacheStorage::new();
        caches.put("v1", &request("/a"), &Response::new(200, "a")).await.unwrap();

        let hit = caches.match_request("v1", &request("/a")).await.unwrap();
        assert_eq!(hit.unwrap().text(), "a");
        assert!(caches.match_request("v1", &request("/b")).await.unwrap().is_none());
        assert!(caches.match_request("v2", &request("/a")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_identity_distinguishes_method() {
        let caches = MemoryCacheStorage::new();
        let url = Url::parse("https://tv.example/api/watchlist").unwrap();
        caches.put("v1", &Request::get(url.clone()), &Response::new(200, "get")).await.unwrap();

        let post = Request::new("POST", url);
        assert!(caches.match_request("v1", &post).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_keys_and_delete() {
        let caches = MemoryCacheStorage::new();
        caches.open("b").await.unwrap();
        caches.open("a").await.unwrap();
        assert_eq!(caches.keys().await.unwrap(), vec!["a", "b"]);

        assert!(caches.delete("a").await.unwrap());
        assert!(!caches.delete("a").await.unwrap());
        assert_eq!(caches.keys().await.unwrap(), vec!["b"]);
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let caches = MemoryCacheStorage::new();
        caches.put("v1", &request("/a"), &Response::new(200, "old")).await.unwrap();
        caches.put("v1", &request("/a"), &Response::new(200, "new")).await.unwrap();
        let hit = caches.match_request("v1", &request("/a")).await.unwrap().unwrap();
        assert_eq!(hit.text(), "new");
        assert_eq!(caches.len("v1").await, Some(1));
    }
}
