//! Worker host services for a terminal session.
//!
//! There are no browser pages here: notifications are printed, the window
//! list is always empty, and "opening" a window prints its URL.

use async_trait::async_trait;
use tracing::debug;

use episode_alert_core::worker::{Clients, Notification, Notifier, WindowClient, WorkerError};

pub struct TerminalHost;

#[async_trait]
impl Notifier for TerminalHost {
    async fn show_notification(&self, notification: &Notification) -> Result<(), WorkerError> {
        println!("[{}] {}", notification.title, notification.options.body);
        Ok(())
    }

    async fn close_notification(&self, notification: &Notification) -> Result<(), WorkerError> {
        debug!(title = %notification.title, "Notification closed");
        Ok(())
    }
}

#[async_trait]
impl Clients for TerminalHost {
    async fn claim(&self) -> Result<(), WorkerError> {
        Ok(())
    }

    async fn match_all_windows(&self) -> Result<Vec<WindowClient>, WorkerError> {
        Ok(Vec::new())
    }

    async fn focus(&self, client: &WindowClient) -> Result<(), WorkerError> {
        println!("Focus: {}", client.url);
        Ok(())
    }

    async fn open_window(&self, url: &str) -> Result<(), WorkerError> {
        println!("Open: {}", url);
        Ok(())
    }
}
