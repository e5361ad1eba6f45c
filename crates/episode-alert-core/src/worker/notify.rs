use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::error::WorkerError;

pub const NOTIFICATION_ICON: &str = "/icons/icon-192x192.png";
pub const NOTIFICATION_BADGE: &str = "/icons/badge-96x96.png";
const VIBRATE_PATTERN: [u32; 3] = [100, 50, 100];

/// Target used when a push payload carries no URL.
pub const DEFAULT_TARGET_URL: &str = "/";

/// Push message body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct PushPayload {
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub url: Option<String>,
}

impl PushPayload {
    /// Parse raw push data. Empty or malformed payloads yield `None`.
    pub fn parse(data: &[u8]) -> Option<Self> {
        if data.iter().all(u8::is_ascii_whitespace) {
            debug!("Ignoring empty push payload");
            return None;
        }
        match serde_json::from_slice::<Self>(data) {
            Ok(payload) => Some(payload),
            Err(e) => {
                warn!(error = %e, "Ignoring malformed push payload");
                None
            }
        }
    }

    pub fn target_url(&self) -> &str {
        self.url
            .as_deref()
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_TARGET_URL)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationData {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationOptions {
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub vibrate: Vec<u32>,
    pub data: NotificationData,
}

/// A notification shown by the worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub options: NotificationOptions,
}

impl Notification {
    pub fn from_push(payload: &PushPayload) -> Self {
        Self {
            title: payload.title.clone(),
            options: NotificationOptions {
                body: payload.body.clone(),
                icon: NOTIFICATION_ICON.to_string(),
                badge: NOTIFICATION_BADGE.to_string(),
                vibrate: VIBRATE_PATTERN.to_vec(),
                data: NotificationData {
                    url: payload.target_url().to_string(),
                },
            },
        }
    }

    pub fn target_url(&self) -> &str {
        &self.options.data.url
    }
}

/// System notification surface.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn show_notification(&self, notification: &Notification) -> Result<(), WorkerError>;

    async fn close_notification(&self, notification: &Notification) -> Result<(), WorkerError>;
}

/// An open page controlled by the worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowClient {
    pub id: String,
    pub url: String,
}

/// Open pages of the app.
#[async_trait]
pub trait Clients: Send + Sync {
    /// Take control of already-open pages.
    async fn claim(&self) -> Result<(), WorkerError>;

    async fn match_all_windows(&self) -> Result<Vec<WindowClient>, WorkerError>;

    async fn focus(&self, client: &WindowClient) -> Result<(), WorkerError>;

    async fn open_window(&self, url: &str) -> Result<(), WorkerError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    Focused(WindowClient),
    Opened(String),
}
