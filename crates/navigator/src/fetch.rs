use async_trait::async_trait;
use phebe_core::{JsonPage, NavigatorConfig};
use reqwest::header::{ACCEPT, CACHE_CONTROL};
use std::fmt;

/// Request options shared by every page fetch of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    /// Ask intermediate caches to revalidate
    pub no_cache: bool,
}

impl From<&NavigatorConfig> for FetchOptions {
    fn from(config: &NavigatorConfig) -> Self {
        Self {
            no_cache: config.no_cache,
        }
    }
}

/// Why a page could not be loaded in place
///
/// Every variant is handled the same way (full page load), they only differ
/// in what gets logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    Transport(String),
    Status(u16),
    Decode(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Transport(msg) => write!(f, "Request failed: {}", msg),
            FetchError::Status(code) => write!(f, "Unexpected HTTP status {}", code),
            FetchError::Decode(msg) => write!(f, "Malformed page response: {}", msg),
        }
    }
}

impl std::error::Error for FetchError {}

/// Source of JSON page representations
#[async_trait(?Send)]
pub trait PageFetcher {
    async fn fetch_page(&self, path: &str, options: FetchOptions) -> Result<JsonPage, FetchError>;
}

/// Fetches pages over HTTP from a running site
pub struct HttpFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl HttpFetcher {
    /// Create a fetcher for the site at `base_url` (e.g. `http://localhost:3000`)
    pub fn new(base_url: impl Into<String>) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("phebe-navigator/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait(?Send)]
impl PageFetcher for HttpFetcher {
    async fn fetch_page(&self, path: &str, options: FetchOptions) -> Result<JsonPage, FetchError> {
        let mut request = self
            .client
            .get(self.url_for(path))
            .header(ACCEPT, "application/json");
        if options.no_cache {
            request = request.header(CACHE_CONTROL, "no-cache");
        }

        let response = request
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        response
            .json::<JsonPage>()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, http::HeaderMap, routing::get};

    fn header(headers: &HeaderMap, name: &str) -> String {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-")
            .to_string()
    }

    async fn echo_headers(headers: HeaderMap) -> Json<serde_json::Value> {
        Json(serde_json::json!({
            "content": format!(
                "accept={} cache-control={}",
                header(&headers, "accept"),
                header(&headers, "cache-control")
            )
        }))
    }

    async fn spawn_site() -> String {
        let app = Router::new()
            .route("/about", get(echo_headers))
            .route("/broken", get(|| async { "<html>not json</html>" }));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_fetch_sends_json_accept_header() {
        let base = spawn_site().await;
        let fetcher = HttpFetcher::new(base).unwrap();

        let page = fetcher
            .fetch_page("/about", FetchOptions { no_cache: false })
            .await
            .unwrap();
        assert_eq!(page.content, "accept=application/json cache-control=-");

        let page = fetcher
            .fetch_page("/about", FetchOptions { no_cache: true })
            .await
            .unwrap();
        assert_eq!(page.content, "accept=application/json cache-control=no-cache");
    }

    #[tokio::test]
    async fn test_fetch_reports_status_and_decode_errors() {
        let base = spawn_site().await;
        let fetcher = HttpFetcher::new(format!("{}/", base)).unwrap();
        let options = FetchOptions { no_cache: true };

        let missing = fetcher.fetch_page("/missing", options).await;
        assert_eq!(missing, Err(FetchError::Status(404)));

        let broken = fetcher.fetch_page("/broken", options).await;
        assert!(matches!(broken, Err(FetchError::Decode(_))));
    }

    #[tokio::test]
    async fn test_fetch_reports_transport_errors() {
        // Bind and drop to get a port nobody listens on
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let fetcher = HttpFetcher::new(format!("http://{}", addr)).unwrap();
        let result = fetcher
            .fetch_page("/about", FetchOptions { no_cache: false })
            .await;
        assert!(matches!(result, Err(FetchError::Transport(_))));
    }

    #[test]
    fn test_options_from_config() {
        let config = NavigatorConfig::default();
        assert_eq!(FetchOptions::from(&config), FetchOptions { no_cache: true });
    }
}
