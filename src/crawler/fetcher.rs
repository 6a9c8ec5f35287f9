//! HTTP fetch capability
//!
//! The crawl core depends on the [`Fetcher`] trait rather than a concrete
//! HTTP client, so tests can substitute mock transports. The real
//! implementation wraps reqwest with bounded timeouts and automatic
//! redirect following; TLS, compression, and connection pooling are the
//! client's concern.

use crate::config::Config;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// Errors reported by a fetch attempt
///
/// Fetch failures are values, never panics: the orchestrator maps them to
/// a terminal `Failed` state for the URL and moves on.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout")]
    Timeout,

    #[error("Connection failed")]
    Connect,

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("Transport error: {0}")]
    Other(String),
}

/// Capability for fetching the body of a URL
///
/// Implementations must honor a bounded timeout and follow redirects.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches the URL, returning the response body on success
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Reqwest-backed fetcher
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Builds a fetcher from the crawler configuration
    ///
    /// The user agent is formatted as `name/version (+contact-url)` so site
    /// operators can identify and reach the crawler.
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let user_agent = format!(
            "{}/{} (+{})",
            config.user_agent.crawler_name,
            config.user_agent.crawler_version,
            config.user_agent.contact_url
        );

        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(config.crawler.fetch_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self.client.get(url).send().await.map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(classify)?;
        Ok(body.to_vec())
    }
}

fn classify(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else if e.is_connect() {
        FetchError::Connect
    } else {
        FetchError::Other(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_build_http_fetcher() {
        let config = Config::default();
        assert!(HttpFetcher::new(&config).is_ok());
    }

    #[tokio::test]
    async fn test_fetch_success() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(&Config::default()).unwrap();
        let body = fetcher.fetch(&format!("{}/page", server.uri())).await.unwrap();
        assert_eq!(body, b"hello");
    }

    #[tokio::test]
    async fn test_fetch_non_success_status() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(&Config::default()).unwrap();
        let result = fetcher.fetch(&format!("{}/missing", server.uri())).await;
        assert!(matches!(result, Err(FetchError::Status(404))));
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        let fetcher = HttpFetcher::new(&Config::default()).unwrap();
        // Port 1 is essentially never listening.
        let result = fetcher.fetch("http://127.0.0.1:1/").await;
        assert!(result.is_err());
    }
}
