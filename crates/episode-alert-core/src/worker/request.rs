use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use url::Url;

/// Header map with lowercase names.
pub type Headers = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestMode {
    Navigate,
    SameOrigin,
    NoCors,
    Cors,
}

/// An outgoing request seen by the worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: String,
    pub url: Url,
    pub mode: RequestMode,
    pub headers: Headers,
    pub body: Option<Vec<u8>>,
}

impl Request {
    pub fn new(method: &str, url: Url) -> Self {
        Self {
            method: method.to_ascii_uppercase(),
            url,
            mode: RequestMode::Cors,
            headers: Headers::new(),
            body: None,
        }
    }

    pub fn get(url: Url) -> Self {
        Self::new("GET", url)
    }

    /// A top-level document load.
    pub fn navigate(url: Url) -> Self {
        Self::get(url)
            .with_mode(RequestMode::Navigate)
            .with_header("Accept", "text/html,application/xhtml+xml")
    }

    pub fn post_json<T: Serialize>(url: Url, body: &T) -> Result<Self, serde_json::Error> {
        let mut request = Self::new("POST", url).with_header("Content-Type", "application/json");
        request.body = Some(serde_json::to_vec(body)?);
        Ok(request)
    }

    pub fn with_mode(mut self, mode: RequestMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.to_string());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn is_get(&self) -> bool {
        self.method == "GET"
    }

    /// Cache key: method plus full URL.
    pub fn identity(&self) -> String {
        format!("{} {}", self.method, self.url)
    }
}

/// How a response relates to the requesting origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseKind {
    /// Same-origin response.
    Basic,
    /// Cross-origin response readable via CORS.
    Cors,
    /// Cross-origin response with no readable status or body.
    Opaque,
}

/// A response snapshot, as returned by the network or stored in a cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub status: u16,
    #[serde(default)]
    pub headers: Headers,
    #[serde(default)]
    pub body: Vec<u8>,
    pub kind: ResponseKind,
}

impl Response {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: body.into(),
            kind: ResponseKind::Basic,
        }
    }

    pub fn with_kind(mut self, kind: ResponseKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.to_string());
        self
    }

    /// Status in the 2xx range.
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}
