use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("TMDB API key is not configured. Set TMDB_API_KEY in your environment or .env file")]
    MissingApiKey,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Request timeout: the TMDB API took too long to respond")]
    Timeout,

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Error body shape returned by TMDB.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    status_message: Option<String>,
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    /// Detail for an error response: the upstream `status_message` when the
    /// body carries one, otherwise the (truncated) raw body.
    fn detail(status: reqwest::StatusCode, body: &str) -> String {
        let reason = status.canonical_reason().unwrap_or("");
        match serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|parsed| parsed.status_message)
        {
            Some(message) => format!("{} {} - {}", status.as_u16(), reason, message),
            None if body.trim().is_empty() => format!("{} {}", status.as_u16(), reason),
            None => format!("{} {} - {}", status.as_u16(), reason, Self::truncate_body(body)),
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let detail = Self::detail(status, body);
        match status.as_u16() {
            401 | 403 => ApiError::Unauthorized(detail),
            404 => ApiError::NotFound(detail),
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError(detail),
            _ => ApiError::InvalidResponse(detail),
        }
    }

    /// Map a transport error, separating timeouts from other failures.
    pub fn from_transport(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            ApiError::Timeout
        } else {
            ApiError::NetworkError(error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_status_message_is_included() {
        let body = r#"{"success":false,"status_code":34,"status_message":"The resource you requested could not be found."}"#;
        let err = ApiError::from_status(StatusCode::NOT_FOUND, body);
        assert!(matches!(err, ApiError::NotFound(_)));
        assert_eq!(
            err.to_string(),
            "Resource not found: 404 Not Found - The resource you requested could not be found."
        );
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            ApiError::from_status(StatusCode::UNAUTHORIZED, "{}"),
            ApiError::Unauthorized(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::TOO_MANY_REQUESTS, ""),
            ApiError::RateLimited
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_GATEWAY, "upstream down"),
            ApiError::ServerError(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::UNPROCESSABLE_ENTITY, ""),
            ApiError::InvalidResponse(_)
        ));
    }

    #[test]
    fn test_long_bodies_are_truncated() {
        let body = "é".repeat(400);
        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, &body);
        let message = err.to_string();
        assert!(message.contains("truncated, 800 total bytes"));
        assert!(message.len() < 600);
    }
}
