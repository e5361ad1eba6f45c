use url::{Origin, Url};

use super::request::{Request, RequestMode};

/// URL substring marking API traffic.
pub const API_PATH_MARKER: &str = "/api/";

/// Routing category of an intercepted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestCategory {
    /// Different origin than the app; not intercepted.
    CrossOrigin,
    /// API traffic; network-first with cached fallback.
    Api,
    /// Document load; network-first with the offline page as fallback.
    Navigation,
    /// Everything else; cache-first.
    StaticAsset,
}

pub fn same_origin(url: &Url, origin: &Origin) -> bool {
    url.origin() == *origin
}

pub fn classify(request: &Request, origin: &Origin) -> RequestCategory {
    if !same_origin(&request.url, origin) {
        RequestCategory::CrossOrigin
    } else if request.url.as_str().contains(API_PATH_MARKER) {
        RequestCategory::Api
    } else if is_navigation(request) {
        RequestCategory::Navigation
    } else {
        RequestCategory::StaticAsset
    }
}

fn is_navigation(request: &Request) -> bool {
    request.mode == RequestMode::Navigate
        || (request.method == "GET"
            && request
                .header("accept")
                .is_some_and(|accept| accept.contains("text/html")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> Origin {
        Url::parse("https://tv.example").unwrap().origin()
    }

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_cross_origin() {
        let request = Request::get(url("https://image.tmdb.org/t/p/w500/poster.jpg"));
        assert_eq!(classify(&request, &origin()), RequestCategory::CrossOrigin);

        // Same host, different scheme or port is still another origin
        let request = Request::get(url("http://tv.example/index.html"));
        assert_eq!(classify(&request, &origin()), RequestCategory::CrossOrigin);
        let request = Request::get(url("https://tv.example:8443/index.html"));
        assert_eq!(classify(&request, &origin()), RequestCategory::CrossOrigin);
    }

    #[test]
    fn test_api() {
        let request = Request::get(url("https://tv.example/api/shows/1399"));
        assert_eq!(classify(&request, &origin()), RequestCategory::Api);

        // API wins over navigation
        let request = Request::navigate(url("https://tv.example/api/watchlist"));
        assert_eq!(classify(&request, &origin()), RequestCategory::Api);
    }

    #[test]
    fn test_navigation_by_mode() {
        let request = Request::get(url("https://tv.example/show/1399"))
            .with_mode(RequestMode::Navigate);
        assert_eq!(classify(&request, &origin()), RequestCategory::Navigation);
    }

    #[test]
    fn test_navigation_by_accept_header() {
        let request = Request::get(url("https://tv.example/watchlist"))
            .with_header("Accept", "text/html,*/*");
        assert_eq!(classify(&request, &origin()), RequestCategory::Navigation);

        // Only GET counts
        let request = Request::new("POST", url("https://tv.example/watchlist"))
            .with_header("Accept", "text/html");
        assert_eq!(classify(&request, &origin()), RequestCategory::StaticAsset);
    }

    #[test]
    fn test_static_asset() {
        let request = Request::get(url("https://tv.example/assets/index.js"));
        assert_eq!(classify(&request, &origin()), RequestCategory::StaticAsset);

        // An Accept header without text/html is not a navigation
        let request = Request::get(url("https://tv.example/icons/icon-192x192.png"))
            .with_header("Accept", "image/png");
        assert_eq!(classify(&request, &origin()), RequestCategory::StaticAsset);

        // Neither is a page-like path with no Accept header at all
        let request = Request::get(url("https://tv.example/shows/1399"));
        assert!(request.header("accept").is_none());
        assert_eq!(classify(&request, &origin()), RequestCategory::StaticAsset);
    }
}
