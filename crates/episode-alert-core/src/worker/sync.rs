use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info, warn};
use url::Url;

use super::error::WorkerError;
use super::network::Network;
use super::request::Request;
use crate::error::StoreError;

/// Background-sync tag that triggers a watchlist drain.
pub const SYNC_TAG: &str = "watchlist-sync";

/// Server endpoint pending actions are replayed against.
pub const SYNC_ENDPOINT: &str = "/api/watchlist";

/// A write deferred while offline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingAction {
    pub id: i64,
    pub payload: Value,
}

impl PendingAction {
    /// Request body: the payload with its record id merged in.
    pub fn body(&self) -> Value {
        match &self.payload {
            Value::Object(fields) => {
                let mut fields = fields.clone();
                fields.insert("id".to_string(), Value::from(self.id));
                Value::Object(fields)
            }
            other => serde_json::json!({ "id": self.id, "payload": other }),
        }
    }
}

/// Durable queue of pending actions, oldest first.
#[async_trait]
pub trait PendingActionStore: Send + Sync {
    async fn pending_actions(&self) -> Result<Vec<PendingAction>, StoreError>;

    async fn delete_pending_action(&self, id: i64) -> Result<(), StoreError>;
}

/// Outcome of one drain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub synced: Vec<i64>,
    pub failed: Vec<i64>,
}

/// Replay every pending action in storage order.
///
/// Each item is independent: a failed replay is left queued for the next
/// sync and the drain moves on. There is no attempt limit.
pub async fn drain_pending_actions(
    store: &dyn PendingActionStore,
    network: &dyn Network,
    endpoint: &Url,
) -> Result<SyncReport, WorkerError> {
    let actions = store.pending_actions().await?;
    debug!(count = actions.len(), "Draining pending actions");

    let mut report = SyncReport::default();
    for action in actions {
        let request = match Request::post_json(endpoint.clone(), &action.body()) {
            Ok(request) => request,
            Err(e) => {
                error!(id = action.id, error = %e, "Failed to encode pending action");
                report.failed.push(action.id);
                continue;
            }
        };

        match network.fetch(&request).await {
            Ok(response) if response.is_ok() => {
                match store.delete_pending_action(action.id).await {
                    Ok(()) => report.synced.push(action.id),
                    Err(e) => {
                        error!(id = action.id, error = %e, "Failed to remove synced action");
                        report.failed.push(action.id);
                    }
                }
            }
            Ok(response) => {
                warn!(id = action.id, status = response.status, "Server rejected pending action");
                report.failed.push(action.id);
            }
            Err(e) => {
                warn!(id = action.id, error = %e, "Failed to sync action");
                report.failed.push(action.id);
            }
        }
    }

    info!(
        synced = report.synced.len(),
        failed = report.failed.len(),
        "Watchlist sync finished"
    );
    Ok(report)
}
