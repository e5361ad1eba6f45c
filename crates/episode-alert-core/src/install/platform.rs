use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static COMPATIBLE_BROWSER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Chrome|Edge|Opera|Samsung|Android").expect("browser regex must compile")
});
static APPLE_MOBILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"iPad|iPhone|iPod").expect("apple regex must compile"));
static APPLE_MOBILE_CI: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)iPhone|iPod|iPad").expect("apple regex must compile"));
static SAFARI_CI: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Safari").expect("safari regex must compile"));
static NON_SAFARI_IOS_CI: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Chrome|CriOS|FxiOS").expect("ios browser regex must compile")
});
static CHROMIUM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Chrome|Chromium|Edge").expect("chromium regex must compile"));

/// How a runtime can install the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InstallPlatform {
    /// Chromium-family or Android browsers that fire the installability event.
    Compatible,
    /// Safari on iOS; installs through "Add to Home Screen" only.
    IosSafari,
    Unsupported,
}

impl InstallPlatform {
    pub fn is_installable(&self) -> bool {
        !matches!(self, InstallPlatform::Unsupported)
    }
}

/// Classify a user agent string for the install heuristic.
pub fn classify_platform(user_agent: &str) -> InstallPlatform {
    if COMPATIBLE_BROWSER.is_match(user_agent) && !APPLE_MOBILE.is_match(user_agent) {
        InstallPlatform::Compatible
    } else if APPLE_MOBILE_CI.is_match(user_agent)
        && SAFARI_CI.is_match(user_agent)
        && !NON_SAFARI_IOS_CI.is_match(user_agent)
    {
        InstallPlatform::IosSafari
    } else {
        InstallPlatform::Unsupported
    }
}

/// Browser family used to pick manual install instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BrowserFamily {
    Chromium,
    Firefox,
    Ios,
    Other,
}

impl BrowserFamily {
    pub fn detect(user_agent: &str) -> Self {
        if CHROMIUM.is_match(user_agent) {
            BrowserFamily::Chromium
        } else if user_agent.contains("Firefox") {
            BrowserFamily::Firefox
        } else if APPLE_MOBILE_CI.is_match(user_agent) {
            BrowserFamily::Ios
        } else {
            BrowserFamily::Other
        }
    }
}

/// Step-by-step instructions for installing without a captured prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallInstructions {
    pub title: &'static str,
    pub steps: &'static [&'static str],
    pub note: &'static str,
}

impl InstallInstructions {
    pub fn for_family(family: BrowserFamily) -> Self {
        match family {
            BrowserFamily::Chromium => Self {
                title: "Chrome / Edge Installation",
                steps: &[
                    "Look for the install icon in the address bar, or",
                    "Click the menu button (three dots) in the upper right corner",
                    "Select \"Install Episode Alert\" or \"Install App\"",
                    "Follow the on-screen instructions to complete installation",
                ],
                note: "If you don't see the install option, make sure you're not in incognito \
                       mode and that the app isn't already installed.",
            },
            BrowserFamily::Firefox => Self {
                title: "Firefox Installation",
                steps: &[
                    "Click the menu button (three lines) in the upper right",
                    "Select \"Add to Home Screen\" on mobile or \"Add to Desktop\" on desktop",
                    "Confirm by clicking \"Add\"",
                ],
                note: "Firefox has limited support for installed apps. Chrome, Edge, or Safari \
                       (iOS) give the best experience.",
            },
            BrowserFamily::Ios => Self {
                title: "iOS Installation",
                steps: &[
                    "Make sure you're using Safari (not Chrome or another browser on iOS)",
                    "Tap the Share button",
                    "Scroll down and tap \"Add to Home Screen\"",
                    "Tap \"Add\" in the top right corner",
                ],
                note: "On iOS only Safari can install apps to the home screen.",
            },
            BrowserFamily::Other => Self {
                title: "Other Browsers",
                steps: &[
                    "Samsung Internet: tap the menu button and select \"Add to home screen\"",
                    "Opera: tap the + icon in the address bar or use menu > \"Add to home screen\"",
                    "UC Browser: tap the menu button and select \"Add to Home Screen\"",
                ],
                note: "Not all browsers support installation. Chrome, Edge, or Safari (iOS) give \
                       the best experience.",
            },
        }
    }

    pub fn for_user_agent(user_agent: &str) -> Self {
        Self::for_family(BrowserFamily::detect(user_agent))
    }
}
