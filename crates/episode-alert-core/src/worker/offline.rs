use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};
use url::{Origin, Url};

use super::cache::CacheStorage;
use super::classify::{classify, RequestCategory};
use super::error::WorkerError;
use super::network::Network;
use super::notify::{ClickOutcome, Clients, Notification, Notifier, PushPayload};
use super::request::{Request, Response, ResponseKind};
use super::sync::{drain_pending_actions, PendingActionStore, SyncReport, SYNC_ENDPOINT, SYNC_TAG};
use crate::config::{Config, CACHE_NAME};

/// Static assets stored at install time.
pub const PRECACHE_MANIFEST: &[&str] = &[
    "/",
    "/index.html",
    "/offline.html",
    "/manifest.json",
    "/icons/icon-192x192.png",
    "/icons/icon-512x512.png",
];

/// Document served when a navigation cannot reach the network.
pub const OFFLINE_DOCUMENT: &str = "/offline.html";

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub origin: Url,
    pub cache_name: String,
    pub precache: Vec<String>,
    pub offline_document: String,
    pub sync_tag: String,
    pub sync_endpoint: String,
}

impl WorkerConfig {
    pub fn new(origin: Url) -> Self {
        Self {
            origin,
            cache_name: CACHE_NAME.to_string(),
            precache: PRECACHE_MANIFEST.iter().map(|p| p.to_string()).collect(),
            offline_document: OFFLINE_DOCUMENT.to_string(),
            sync_tag: SYNC_TAG.to_string(),
            sync_endpoint: SYNC_ENDPOINT.to_string(),
        }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let mut worker_config = Self::new(config.origin_url()?);
        worker_config.cache_name = config.cache_name.clone();
        Ok(worker_config)
    }

    /// Resolve a path against the origin; absolute URLs pass through.
    pub fn resolve(&self, path: &str) -> Result<Url, WorkerError> {
        Ok(self.origin.join(path)?)
    }
}

/// Lifecycle of one deployed worker version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Parsed,
    Installing,
    Installed,
    Activating,
    Activated,
    /// Replaced by a newer version.
    Redundant,
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerState::Parsed => write!(f, "parsed"),
            WorkerState::Installing => write!(f, "installing"),
            WorkerState::Installed => write!(f, "installed"),
            WorkerState::Activating => write!(f, "activating"),
            WorkerState::Activated => write!(f, "activated"),
            WorkerState::Redundant => write!(f, "redundant"),
        }
    }
}

/// Result of handling an intercepted request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Not intercepted; the request goes to the network untouched.
    Bypass,
    Respond(Response),
}

/// Host services the worker talks to.
#[derive(Clone)]
pub struct WorkerHost {
    pub caches: Arc<dyn CacheStorage>,
    pub network: Arc<dyn Network>,
    pub pending: Arc<dyn PendingActionStore>,
    pub notifier: Arc<dyn Notifier>,
    pub clients: Arc<dyn Clients>,
}

/// Offline request router.
///
/// Lifecycle changes take `&mut self`, so install always finishes before
/// activation starts. Once activated the worker can be shared and requests
/// are served concurrently through `&self`.
pub struct OfflineWorker {
    config: WorkerConfig,
    origin: Origin,
    host: WorkerHost,
    state: WorkerState,
}

impl OfflineWorker {
    pub fn new(config: WorkerConfig, host: WorkerHost) -> Self {
        let origin = config.origin.origin();
        Self {
            config,
            origin,
            host,
            state: WorkerState::Parsed,
        }
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    fn expect_state(&self, expected: WorkerState) -> Result<(), WorkerError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(WorkerError::InvalidState {
                expected,
                actual: self.state,
            })
        }
    }

    /// Install then activate.
    pub async fn start(&mut self) -> Result<Vec<String>, WorkerError> {
        self.install().await?;
        self.activate().await
    }

    /// Precache the manifest. All-or-nothing: if any entry fails nothing is
    /// stored and the worker stays `Parsed`.
    pub async fn install(&mut self) -> Result<(), WorkerError> {
        self.expect_state(WorkerState::Parsed)?;
        self.state = WorkerState::Installing;

        match self.precache().await {
            Ok(count) => {
                info!(cache = %self.config.cache_name, entries = count, "Precached app shell");
                // Skip waiting: eligible to activate without waiting for old clients
                self.state = WorkerState::Installed;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Install failed");
                self.state = WorkerState::Parsed;
                Err(e)
            }
        }
    }

    async fn precache(&self) -> Result<usize, WorkerError> {
        let mut entries = Vec::with_capacity(self.config.precache.len());
        for path in &self.config.precache {
            let request = Request::get(self.config.resolve(path)?);
            let response = self
                .host
                .network
                .fetch(&request)
                .await
                .map_err(|e| WorkerError::Precache {
                    path: path.clone(),
                    reason: e.to_string(),
                })?;
            if !response.is_ok() {
                return Err(WorkerError::Precache {
                    path: path.clone(),
                    reason: format!("status {}", response.status),
                });
            }
            entries.push((request, response));
        }

        let caches = &self.host.caches;
        caches.open(&self.config.cache_name).await?;
        caches.put_all(&self.config.cache_name, &entries).await?;
        Ok(entries.len())
    }

    /// Delete every store but the current one, then claim open pages.
    /// Returns the names of the deleted stores.
    pub async fn activate(&mut self) -> Result<Vec<String>, WorkerError> {
        self.expect_state(WorkerState::Installed)?;
        self.state = WorkerState::Activating;

        match self.purge_and_claim().await {
            Ok(deleted) => {
                self.state = WorkerState::Activated;
                info!(cache = %self.config.cache_name, deleted = deleted.len(), "Worker activated");
                Ok(deleted)
            }
            Err(e) => {
                warn!(error = %e, "Activation failed");
                self.state = WorkerState::Installed;
                Err(e)
            }
        }
    }

    async fn purge_and_claim(&self) -> Result<Vec<String>, WorkerError> {
        let deleted = self.purge_old_caches().await?;
        self.host.clients.claim().await?;
        Ok(deleted)
    }

    async fn purge_old_caches(&self) -> Result<Vec<String>, WorkerError> {
        let mut deleted = Vec::new();
        for name in self.host.caches.keys().await? {
            if name != self.config.cache_name {
                self.host.caches.delete(&name).await?;
                debug!(cache = %name, "Deleted outdated cache");
                deleted.push(name);
            }
        }
        Ok(deleted)
    }

    /// Take over from an earlier session: if this version's store already
    /// exists the worker goes straight to `Activated`. Returns whether it did;
    /// otherwise the worker stays `Parsed` and must be installed.
    pub async fn resume(&mut self) -> Result<bool, WorkerError> {
        self.expect_state(WorkerState::Parsed)?;
        let keys = self.host.caches.keys().await?;
        if !keys.contains(&self.config.cache_name) {
            debug!(cache = %self.config.cache_name, "No installed cache to resume");
            return Ok(false);
        }
        self.state = WorkerState::Activated;
        info!(cache = %self.config.cache_name, "Resumed installed worker");
        Ok(true)
    }

    /// Mark this version as replaced.
    pub fn retire(&mut self) {
        self.state = WorkerState::Redundant;
    }

    /// Route one request.
    pub async fn handle_fetch(&self, request: &Request) -> Result<FetchOutcome, WorkerError> {
        if self.state != WorkerState::Activated {
            return Ok(FetchOutcome::Bypass);
        }

        let response = match classify(request, &self.origin) {
            RequestCategory::CrossOrigin => return Ok(FetchOutcome::Bypass),
            RequestCategory::Api => self.network_first_api(request).await?,
            RequestCategory::Navigation => self.network_first_navigation(request).await?,
            RequestCategory::StaticAsset => self.cache_first(request).await?,
        };
        Ok(FetchOutcome::Respond(response))
    }

    async fn network_first_api(&self, request: &Request) -> Result<Response, WorkerError> {
        match self.host.network.fetch(request).await {
            Ok(response) => {
                self.store_copy(request, &response).await;
                Ok(response)
            }
            // Only GET responses are stored, so a failed write has no copy to fall back on
            Err(e) if !request.is_get() => Err(e.into()),
            Err(e) => {
                debug!(url = %request.url, error = %e, "API request failed, trying cache");
                match self
                    .host
                    .caches
                    .match_request(&self.config.cache_name, request)
                    .await?
                {
                    Some(cached) => Ok(cached),
                    None => Err(e.into()),
                }
            }
        }
    }

    async fn network_first_navigation(&self, request: &Request) -> Result<Response, WorkerError> {
        match self.host.network.fetch(request).await {
            Ok(response) => {
                self.store_copy(request, &response).await;
                Ok(response)
            }
            Err(e) => {
                debug!(url = %request.url, error = %e, "Navigation failed, serving offline page");
                let offline = Request::get(self.config.resolve(&self.config.offline_document)?);
                self.host
                    .caches
                    .match_request(&self.config.cache_name, &offline)
                    .await?
                    .ok_or_else(|| {
                        WorkerError::OfflineDocumentMissing(self.config.offline_document.clone())
                    })
            }
        }
    }

    async fn cache_first(&self, request: &Request) -> Result<Response, WorkerError> {
        if let Some(cached) = self
            .host
            .caches
            .match_request(&self.config.cache_name, request)
            .await?
        {
            return Ok(cached);
        }

        let response = self.host.network.fetch(request).await?;
        if response.status == 200 && response.kind == ResponseKind::Basic {
            self.store_copy(request, &response).await;
        }
        Ok(response)
    }

    /// Best-effort cache write; the response is served either way.
    /// Only GET requests are stored.
    async fn store_copy(&self, request: &Request, response: &Response) {
        if !request.is_get() {
            return;
        }
        if let Err(e) = self
            .host
            .caches
            .put(&self.config.cache_name, request, response)
            .await
        {
            warn!(url = %request.url, error = %e, "Failed to cache response");
        }
    }

    /// Handle a connectivity-restore signal. Unknown tags are ignored.
    pub async fn handle_sync(&self, tag: &str) -> Result<Option<SyncReport>, WorkerError> {
        if tag != self.config.sync_tag {
            debug!(tag = tag, "Ignoring unknown sync tag");
            return Ok(None);
        }
        let endpoint = self.config.resolve(&self.config.sync_endpoint)?;
        let report = drain_pending_actions(
            self.host.pending.as_ref(),
            self.host.network.as_ref(),
            &endpoint,
        )
        .await?;
        Ok(Some(report))
    }

    /// Show a notification for a push message. Returns `None` when the
    /// payload is empty or malformed.
    pub async fn handle_push(&self, data: Option<&[u8]>) -> Result<Option<Notification>, WorkerError> {
        let Some(payload) = data.and_then(PushPayload::parse) else {
            return Ok(None);
        };
        let notification = Notification::from_push(&payload);
        self.host.notifier.show_notification(&notification).await?;
        Ok(Some(notification))
    }

    /// Close the notification, then focus a page already showing its target
    /// or open a new one.
    pub async fn handle_notification_click(
        &self,
        notification: &Notification,
    ) -> Result<ClickOutcome, WorkerError> {
        self.host.notifier.close_notification(notification).await?;

        let target = notification.target_url();
        let absolute = self.config.resolve(target)?;
        let windows = self.host.clients.match_all_windows().await?;
        if let Some(client) = windows
            .into_iter()
            .find(|client| client.url == target || client.url == absolute.as_str())
        {
            self.host.clients.focus(&client).await?;
            return Ok(ClickOutcome::Focused(client));
        }

        self.host.clients.open_window(absolute.as_str()).await?;
        Ok(ClickOutcome::Opened(absolute.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::worker::cache::MemoryCacheStorage;
    use crate::worker::disk::DiskCacheStorage;
    use crate::worker::error::NetworkError;
    use crate::worker::notify::WindowClient;
    use crate::worker::sync::PendingAction;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    const ORIGIN: &str = "https://tv.example";

    /// Serves canned responses by URL; everything fails while offline.
    #[derive(Default)]
    struct FakeNetwork {
        routes: Mutex<HashMap<String, Response>>,
        offline: AtomicBool,
        fetched: Mutex<Vec<String>>,
    }

    impl FakeNetwork {
        fn route(&self, path: &str, response: Response) {
            let url = Url::parse(ORIGIN).unwrap().join(path).unwrap();
            self.routes.lock().unwrap().insert(url.to_string(), response);
        }

        fn route_url(&self, url: &str, response: Response) {
            self.routes.lock().unwrap().insert(url.to_string(), response);
        }

        fn set_offline(&self, offline: bool) {
            self.offline.store(offline, Ordering::SeqCst);
        }

        fn fetch_count(&self) -> usize {
            self.fetched.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Network for FakeNetwork {
        async fn fetch(&self, request: &Request) -> Result<Response, NetworkError> {
            self.fetched.lock().unwrap().push(request.url.to_string());
            if self.offline.load(Ordering::SeqCst) {
                return Err(NetworkError::Unreachable("offline".to_string()));
            }
            Ok(self
                .routes
                .lock()
                .unwrap()
                .get(request.url.as_str())
                .cloned()
                .unwrap_or_else(|| Response::new(404, "not found")))
        }
    }

    #[derive(Default)]
    struct FakePending {
        actions: Mutex<Vec<PendingAction>>,
    }

    #[async_trait]
    impl PendingActionStore for FakePending {
        async fn pending_actions(&self) -> Result<Vec<PendingAction>, StoreError> {
            Ok(self.actions.lock().unwrap().clone())
        }

        async fn delete_pending_action(&self, id: i64) -> Result<(), StoreError> {
            self.actions.lock().unwrap().retain(|a| a.id != id);
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeHost {
        shown: Mutex<Vec<Notification>>,
        closed: Mutex<Vec<Notification>>,
        windows: Mutex<Vec<WindowClient>>,
        focused: Mutex<Vec<String>>,
        opened: Mutex<Vec<String>>,
        claimed: AtomicBool,
        fail_claim: AtomicBool,
    }

    #[async_trait]
    impl Notifier for FakeHost {
        async fn show_notification(&self, notification: &Notification) -> Result<(), WorkerError> {
            self.shown.lock().unwrap().push(notification.clone());
            Ok(())
        }

        async fn close_notification(&self, notification: &Notification) -> Result<(), WorkerError> {
            self.closed.lock().unwrap().push(notification.clone());
            Ok(())
        }
    }

    #[async_trait]
    impl Clients for FakeHost {
        async fn claim(&self) -> Result<(), WorkerError> {
            if self.fail_claim.load(Ordering::SeqCst) {
                return Err(WorkerError::Host("claim rejected".to_string()));
            }
            self.claimed.store(true, Ordering::SeqCst);
            Ok(())
        }

        async fn match_all_windows(&self) -> Result<Vec<WindowClient>, WorkerError> {
            Ok(self.windows.lock().unwrap().clone())
        }

        async fn focus(&self, client: &WindowClient) -> Result<(), WorkerError> {
            self.focused.lock().unwrap().push(client.id.clone());
            Ok(())
        }

        async fn open_window(&self, url: &str) -> Result<(), WorkerError> {
            self.opened.lock().unwrap().push(url.to_string());
            Ok(())
        }
    }

    struct Harness {
        worker: OfflineWorker,
        caches: Arc<MemoryCacheStorage>,
        network: Arc<FakeNetwork>,
        pending: Arc<FakePending>,
        host: Arc<FakeHost>,
    }

    fn harness() -> Harness {
        let caches = Arc::new(MemoryCacheStorage::new());
        let network = Arc::new(FakeNetwork::default());
        let pending = Arc::new(FakePending::default());
        let host = Arc::new(FakeHost::default());
        for path in PRECACHE_MANIFEST {
            network.route(path, Response::new(200, format!("asset {}", path)));
        }
        network.route(OFFLINE_DOCUMENT, Response::new(200, "<h1>You are offline</h1>"));

        let worker = OfflineWorker::new(
            WorkerConfig::new(Url::parse(ORIGIN).unwrap()),
            WorkerHost {
                caches: caches.clone(),
                network: network.clone(),
                pending: pending.clone(),
                notifier: host.clone(),
                clients: host.clone(),
            },
        );
        Harness { worker, caches, network, pending, host }
    }

    fn url(path: &str) -> Url {
        Url::parse(ORIGIN).unwrap().join(path).unwrap()
    }

    async fn started() -> Harness {
        let mut h = harness();
        h.worker.start().await.unwrap();
        h
    }

    fn body(outcome: FetchOutcome) -> String {
        match outcome {
            FetchOutcome::Respond(response) => response.text(),
            FetchOutcome::Bypass => panic!("expected a response"),
        }
    }

    #[tokio::test]
    async fn test_install_precaches_manifest() {
        let mut h = harness();
        h.worker.install().await.unwrap();

        assert_eq!(h.worker.state(), WorkerState::Installed);
        assert_eq!(h.caches.len(CACHE_NAME).await, Some(PRECACHE_MANIFEST.len()));
    }

    #[tokio::test]
    async fn test_install_is_all_or_nothing() {
        let mut h = harness();
        h.network.route("/icons/icon-512x512.png", Response::new(404, ""));

        let err = h.worker.install().await.unwrap_err();
        assert!(matches!(err, WorkerError::Precache { ref path, .. } if path == "/icons/icon-512x512.png"));
        assert_eq!(h.worker.state(), WorkerState::Parsed);
        assert!(h.caches.len(CACHE_NAME).await.is_none());
    }

    #[tokio::test]
    async fn test_activate_requires_install() {
        let mut h = harness();
        let err = h.worker.activate().await.unwrap_err();
        assert!(matches!(err, WorkerError::InvalidState { .. }));
    }

    #[tokio::test]
    async fn test_activate_purges_old_caches_and_claims() {
        let mut h = harness();
        h.caches.open("episode-alert-v0").await.unwrap();
        h.caches.open("some-other-cache").await.unwrap();

        let deleted = h.worker.start().await.unwrap();

        assert_eq!(deleted, vec!["episode-alert-v0", "some-other-cache"]);
        assert_eq!(h.caches.keys().await.unwrap(), vec![CACHE_NAME]);
        assert!(h.host.claimed.load(Ordering::SeqCst));
        assert_eq!(h.worker.state(), WorkerState::Activated);
    }

    #[tokio::test]
    async fn test_failed_claim_reverts_to_installed() {
        let mut h = harness();
        h.worker.install().await.unwrap();
        h.host.fail_claim.store(true, Ordering::SeqCst);

        let err = h.worker.activate().await.unwrap_err();
        assert!(matches!(err, WorkerError::Host(_)));
        assert_eq!(h.worker.state(), WorkerState::Installed);

        // Activation can be retried once the host recovers
        h.host.fail_claim.store(false, Ordering::SeqCst);
        h.worker.activate().await.unwrap();
        assert_eq!(h.worker.state(), WorkerState::Activated);
    }

    #[tokio::test]
    async fn test_resume_requires_installed_cache() {
        let mut fresh = harness();
        assert!(!fresh.worker.resume().await.unwrap());
        assert_eq!(fresh.worker.state(), WorkerState::Parsed);

        let installed = started().await;
        let mut next = OfflineWorker::new(
            WorkerConfig::new(Url::parse(ORIGIN).unwrap()),
            WorkerHost {
                caches: installed.caches.clone(),
                network: installed.network.clone(),
                pending: installed.pending.clone(),
                notifier: installed.host.clone(),
                clients: installed.host.clone(),
            },
        );
        assert!(next.resume().await.unwrap());
        assert_eq!(next.state(), WorkerState::Activated);

        installed.network.set_offline(true);
        let outcome = next.handle_fetch(&Request::get(url("/index.html"))).await.unwrap();
        assert_eq!(body(outcome), "asset /index.html");
    }

    #[tokio::test]
    async fn test_disk_cache_survives_restart() {
        let dir = tempfile::TempDir::new().unwrap();
        let h = harness();
        let host_with_disk = || WorkerHost {
            caches: Arc::new(DiskCacheStorage::new(dir.path().to_path_buf())),
            network: h.network.clone(),
            pending: h.pending.clone(),
            notifier: h.host.clone(),
            clients: h.host.clone(),
        };

        let mut first = OfflineWorker::new(WorkerConfig::new(Url::parse(ORIGIN).unwrap()), host_with_disk());
        first.start().await.unwrap();
        drop(first);

        h.network.set_offline(true);
        let mut second = OfflineWorker::new(WorkerConfig::new(Url::parse(ORIGIN).unwrap()), host_with_disk());
        assert!(second.resume().await.unwrap());

        let outcome = second.handle_fetch(&Request::get(url("/manifest.json"))).await.unwrap();
        assert_eq!(body(outcome), "asset /manifest.json");
        let outcome = second.handle_fetch(&Request::navigate(url("/shows/1"))).await.unwrap();
        assert_eq!(body(outcome), "<h1>You are offline</h1>");
    }

    #[tokio::test]
    async fn test_requests_bypass_until_activated() {
        let h = harness();
        let outcome = h.worker.handle_fetch(&Request::get(url("/app.js"))).await.unwrap();
        assert_eq!(outcome, FetchOutcome::Bypass);
    }

    #[tokio::test]
    async fn test_cross_origin_bypasses() {
        let h = started().await;
        let before = h.network.fetch_count();
        let request = Request::get(Url::parse("https://image.tmdb.org/t/p/w500/x.jpg").unwrap());

        assert_eq!(h.worker.handle_fetch(&request).await.unwrap(), FetchOutcome::Bypass);
        assert_eq!(h.network.fetch_count(), before);
    }

    #[tokio::test]
    async fn test_api_network_first_then_cached_copy() {
        let h = started().await;
        h.network.route("/api/shows/1399", Response::new(200, "fresh"));
        let request = Request::get(url("/api/shows/1399"));

        assert_eq!(body(h.worker.handle_fetch(&request).await.unwrap()), "fresh");

        h.network.set_offline(true);
        assert_eq!(body(h.worker.handle_fetch(&request).await.unwrap()), "fresh");
    }

    #[tokio::test]
    async fn test_api_failure_without_copy_propagates() {
        let h = started().await;
        h.network.set_offline(true);
        let err = h
            .worker
            .handle_fetch(&Request::get(url("/api/shows/42")))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkerError::Network(_)));
    }

    #[tokio::test]
    async fn test_api_writes_are_never_cached() {
        let h = started().await;
        h.network.route("/api/watchlist", Response::new(201, "created"));
        let first = Request::post_json(url("/api/watchlist"), &serde_json::json!({"showId": 1})).unwrap();
        assert_eq!(body(h.worker.handle_fetch(&first).await.unwrap()), "created");
        assert!(h.caches.match_request(CACHE_NAME, &first).await.unwrap().is_none());

        h.network.set_offline(true);
        let second = Request::post_json(url("/api/watchlist"), &serde_json::json!({"showId": 2})).unwrap();
        let err = h.worker.handle_fetch(&second).await.unwrap_err();
        assert!(matches!(err, WorkerError::Network(_)));
    }

    #[tokio::test]
    async fn test_navigation_falls_back_to_offline_document() {
        let h = started().await;
        h.network.set_offline(true);
        let outcome = h.worker.handle_fetch(&Request::navigate(url("/show/1399"))).await.unwrap();
        assert_eq!(body(outcome), "<h1>You are offline</h1>");
    }

    #[tokio::test]
    async fn test_navigation_caches_latest_copy() {
        let h = started().await;
        h.network.route("/watchlist", Response::new(200, "<h1>Watchlist</h1>"));
        let request = Request::navigate(url("/watchlist"));
        h.worker.handle_fetch(&request).await.unwrap();

        let cached = h.caches.match_request(CACHE_NAME, &request).await.unwrap();
        assert_eq!(cached.unwrap().text(), "<h1>Watchlist</h1>");
    }

    #[tokio::test]
    async fn test_static_asset_cache_first() {
        let h = started().await;
        h.network.route("/assets/app.js", Response::new(200, "v1"));
        let request = Request::get(url("/assets/app.js"));

        assert_eq!(body(h.worker.handle_fetch(&request).await.unwrap()), "v1");
        h.network.route("/assets/app.js", Response::new(200, "v2"));
        // Served from cache, network not consulted
        let before = h.network.fetch_count();
        assert_eq!(body(h.worker.handle_fetch(&request).await.unwrap()), "v1");
        assert_eq!(h.network.fetch_count(), before);
    }

    #[tokio::test]
    async fn test_static_asset_skips_caching_bad_responses() {
        let h = started().await;
        h.network.route("/assets/missing.js", Response::new(404, "nope"));
        h.network.route(
            "/assets/opaque.js",
            Response::new(200, "x").with_kind(ResponseKind::Opaque),
        );

        for path in ["/assets/missing.js", "/assets/opaque.js"] {
            let request = Request::get(url(path));
            h.worker.handle_fetch(&request).await.unwrap();
            assert!(h.caches.match_request(CACHE_NAME, &request).await.unwrap().is_none());
        }
    }

    #[tokio::test]
    async fn test_precached_shell_served_offline() {
        let h = started().await;
        h.network.set_offline(true);
        let outcome = h.worker.handle_fetch(&Request::get(url("/manifest.json"))).await.unwrap();
        assert_eq!(body(outcome), "asset /manifest.json");
    }

    #[tokio::test]
    async fn test_sync_drains_only_on_known_tag() {
        let h = started().await;
        h.pending.actions.lock().unwrap().extend([
            PendingAction { id: 1, payload: serde_json::json!({"type": "add", "showId": 1}) },
            PendingAction { id: 2, payload: serde_json::json!({"type": "add", "showId": 2}) },
        ]);
        h.network.route_url(&format!("{}/api/watchlist", ORIGIN), Response::new(201, "{}"));

        assert!(h.worker.handle_sync("something-else").await.unwrap().is_none());
        assert_eq!(h.pending.actions.lock().unwrap().len(), 2);

        let report = h.worker.handle_sync(SYNC_TAG).await.unwrap().unwrap();
        assert_eq!(report.synced, vec![1, 2]);
        assert!(h.pending.actions.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_push_shows_notification() {
        let h = started().await;
        let shown = h
            .worker
            .handle_push(Some(br#"{"title":"New episode","body":"Tonight","url":"/show/7"}"#))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(shown.target_url(), "/show/7");
        assert_eq!(h.host.shown.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_push_ignores_empty_and_malformed() {
        let h = started().await;
        assert!(h.worker.handle_push(None).await.unwrap().is_none());
        assert!(h.worker.handle_push(Some(b"")).await.unwrap().is_none());
        assert!(h.worker.handle_push(Some(b"{oops")).await.unwrap().is_none());
        assert!(h.host.shown.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_click_focuses_existing_window() {
        let h = started().await;
        h.host.windows.lock().unwrap().extend([
            WindowClient { id: "a".to_string(), url: format!("{}/", ORIGIN) },
            WindowClient { id: "b".to_string(), url: format!("{}/show/7", ORIGIN) },
        ]);
        let notification = h
            .worker
            .handle_push(Some(br#"{"title":"t","body":"b","url":"/show/7"}"#))
            .await
            .unwrap()
            .unwrap();

        let outcome = h.worker.handle_notification_click(&notification).await.unwrap();

        assert!(matches!(outcome, ClickOutcome::Focused(ref c) if c.id == "b"));
        assert_eq!(h.host.closed.lock().unwrap().len(), 1);
        assert_eq!(*h.host.focused.lock().unwrap(), vec!["b".to_string()]);
        assert!(h.host.opened.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_click_opens_window_when_none_match() {
        let h = started().await;
        let notification = Notification::from_push(&PushPayload {
            title: "t".to_string(),
            body: String::new(),
            url: None,
        });

        let outcome = h.worker.handle_notification_click(&notification).await.unwrap();

        assert_eq!(outcome, ClickOutcome::Opened(format!("{}/", ORIGIN)));
        assert_eq!(*h.host.opened.lock().unwrap(), vec![format!("{}/", ORIGIN)]);
    }
}
