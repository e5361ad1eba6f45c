use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use super::platform::{classify_platform, InstallInstructions};

/// The user's answer to the install prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserChoice {
    Accepted,
    Dismissed,
}

#[derive(Error, Debug)]
pub enum InstallError {
    #[error("Install prompt failed: {0}")]
    PromptFailed(String),
}

/// A captured installability event.
#[async_trait]
pub trait InstallPromptEvent: Send {
    /// Stop the environment from showing its own install UI.
    fn prevent_default(&mut self);

    /// Show the native prompt and wait for the user's decision.
    /// Called at most once per event.
    async fn prompt(&mut self) -> Result<UserChoice, InstallError>;
}

/// Facts about the hosting runtime used by the install heuristic.
pub trait InstallEnvironment: Send + Sync {
    fn user_agent(&self) -> String;

    /// Whether the app is already running in standalone (installed) mode.
    fn is_standalone(&self) -> bool;

    fn supports_service_worker(&self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InstallState {
    NoPrompt,
    PromptCaptured,
    Consumed,
    Installed,
}

/// Holds at most one deferred install event and replays it on demand.
pub struct InstallPromptService<E: InstallEnvironment> {
    env: E,
    deferred: Option<Box<dyn InstallPromptEvent>>,
    state: InstallState,
}

impl<E: InstallEnvironment> InstallPromptService<E> {
    pub fn new(env: E) -> Self {
        Self {
            env,
            deferred: None,
            state: InstallState::NoPrompt,
        }
    }

    pub fn state(&self) -> InstallState {
        self.state
    }

    pub fn has_deferred_prompt(&self) -> bool {
        self.deferred.is_some()
    }

    /// Handle the installability signal. A later capture replaces an
    /// unconsumed one.
    pub fn capture(&mut self, mut event: Box<dyn InstallPromptEvent>) {
        event.prevent_default();
        if self.deferred.replace(event).is_some() {
            debug!("Replacing previously captured install prompt");
        }
        self.state = InstallState::PromptCaptured;
        info!("Captured install prompt");
    }

    /// Handle the environment reporting a completed installation.
    pub fn on_app_installed(&mut self) {
        self.deferred = None;
        self.state = InstallState::Installed;
        info!("App was installed");
    }

    /// Whether installation can be offered, either through a captured
    /// prompt or because the runtime looks capable of installing.
    pub fn can_install(&self) -> bool {
        if self.deferred.is_some() {
            return true;
        }
        if !self.env.supports_service_worker() {
            debug!("Service workers not supported");
            return false;
        }
        if self.env.is_standalone() {
            debug!("App is already running standalone");
            return false;
        }
        classify_platform(&self.env.user_agent()).is_installable()
    }

    /// Show the captured prompt. Returns `Ok(true)` if the user accepted.
    ///
    /// The event is discarded whatever the outcome. With no captured event
    /// this returns `Ok(false)` and callers should fall back to
    /// `manual_instructions`.
    pub async fn show_install_prompt(&mut self) -> Result<bool, InstallError> {
        let Some(mut event) = self.deferred.take() else {
            debug!("No deferred prompt available");
            return Ok(false);
        };
        self.state = InstallState::Consumed;

        let choice = event.prompt().await?;
        match choice {
            UserChoice::Accepted => info!("User accepted the install prompt"),
            UserChoice::Dismissed => info!("User dismissed the install prompt"),
        }
        Ok(choice == UserChoice::Accepted)
    }

    pub fn manual_instructions(&self) -> InstallInstructions {
        InstallInstructions::for_user_agent(&self.env.user_agent())
    }
}
