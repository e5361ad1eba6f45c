//! Install-prompt capture.
//!
//! The hosting environment fires a one-shot installability event. This
//! module keeps at most one such event, suppresses its default UI, and
//! replays it on demand through `InstallPromptService`.
//!
//! - `platform`: user-agent classification and manual install instructions
//! - `prompt`: the capture/consume state machine

pub mod platform;
pub mod prompt;

pub use platform::{classify_platform, BrowserFamily, InstallInstructions, InstallPlatform};
pub use prompt::{
    InstallEnvironment, InstallError, InstallPromptEvent, InstallPromptService, InstallState,
    UserChoice,
};
