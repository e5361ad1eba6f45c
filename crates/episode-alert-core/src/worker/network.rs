use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, Method};
use tracing::debug;
use url::Origin;

use super::classify::same_origin;
use super::error::NetworkError;
use super::request::{Headers, Request, RequestMode, Response, ResponseKind};

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Where the worker sends requests it decides to fetch.
#[async_trait]
pub trait Network: Send + Sync {
    /// Fetch a request. HTTP error statuses are responses, not errors;
    /// only transport failures are `Err`.
    async fn fetch(&self, request: &Request) -> Result<Response, NetworkError>;
}

/// `Network` over reqwest.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct HttpNetwork {
    client: Client,
    origin: Origin,
}

impl HttpNetwork {
    pub fn new(origin: Origin) -> Result<Self, NetworkError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self { client, origin })
    }

    fn response_kind(&self, request: &Request) -> ResponseKind {
        if same_origin(&request.url, &self.origin) {
            ResponseKind::Basic
        } else if request.mode == RequestMode::NoCors {
            ResponseKind::Opaque
        } else {
            ResponseKind::Cors
        }
    }
}

#[async_trait]
impl Network for HttpNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, NetworkError> {
        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|_| NetworkError::InvalidMethod(request.method.clone()))?;

        let mut builder = self.client.request(method, request.url.clone());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(ref body) = request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers: Headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        debug!(
            url = %request.url,
            status = status,
            content_type = ?headers.get(header::CONTENT_TYPE.as_str()),
            "Fetched from network"
        );
        let body = response.bytes().await?.to_vec();

        let kind = self.response_kind(request);
        if kind == ResponseKind::Opaque {
            // Opaque responses expose neither status nor body
            return Ok(Response::new(0, Vec::new()).with_kind(kind));
        }

        Ok(Response {
            status,
            headers,
            body,
            kind,
        })
    }
}
