//! Shared HTTP fetching for extractors.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::ExtractionError;
use crate::core::ExtractionLimits;

/// Headroom left between the client timeout and the per-URL limit
const LIMIT_HEADROOM: Duration = Duration::from_secs(1);

/// Settings for the shared HTTP client
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(10),
            user_agent: format!("rhythm/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpSettings {
    /// Size the request timeout to outlast `limits`' per-URL timeout.
    ///
    /// Slow responses then surface as [`ExtractionError::Timeout`] from the
    /// extraction limits instead of a transport error from the client.
    pub fn for_limits(mut self, limits: &ExtractionLimits) -> Self {
        self.request_timeout = limits.timeout() + LIMIT_HEADROOM;
        self
    }
}

/// Thin wrapper around `reqwest::Client` that maps failures to
/// [`ExtractionError`]s carrying the source URL.
///
/// Cloning is cheap; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(settings: &HttpSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .user_agent(settings.user_agent.clone())
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client })
    }

    /// GET `url` and return the body as text
    pub async fn get_text(&self, url: &str) -> Result<String, ExtractionError> {
        let response = self
            .send(self.client.get(url), url)
            .await?;

        response.text().await.map_err(|source| ExtractionError::Fetch {
            url: url.to_string(),
            source,
        })
    }

    /// GET `endpoint?query` and decode the JSON body.
    ///
    /// Errors are reported against `source_url`, the URL being extracted,
    /// rather than the API endpoint.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
        source_url: &str,
    ) -> Result<T, ExtractionError> {
        let response = self
            .send(self.client.get(endpoint).query(query), source_url)
            .await?;

        response
            .json::<T>()
            .await
            .map_err(|e| ExtractionError::Malformed {
                url: source_url.to_string(),
                reason: format!("invalid JSON from {}: {}", endpoint, e),
            })
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        source_url: &str,
    ) -> Result<reqwest::Response, ExtractionError> {
        let response = request.send().await.map_err(|source| ExtractionError::Fetch {
            url: source_url.to_string(),
            source,
        })?;

        let status = response.status();
        debug!(url = %source_url, status = status.as_u16(), "HTTP response");

        if !status.is_success() {
            return Err(ExtractionError::Status {
                url: source_url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, serde::Deserialize)]
    struct Payload {
        title: String,
    }

    fn fetcher() -> HttpFetcher {
        HttpFetcher::new(&HttpSettings::default()).unwrap()
    }

    #[test]
    fn test_request_timeout_follows_limits() {
        let limits = ExtractionLimits {
            timeout_seconds: 15,
            ..ExtractionLimits::default()
        };
        let settings = HttpSettings::default().for_limits(&limits);

        assert!(settings.request_timeout > Duration::from_secs(15));
        assert_eq!(settings.connect_timeout, Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_get_text() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
            .mount(&server)
            .await;

        let body = fetcher()
            .get_text(&format!("{}/page", server.uri()))
            .await
            .unwrap();
        assert_eq!(body, "hello");
    }

    #[tokio::test]
    async fn test_status_error_reports_source_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/oembed"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = fetcher()
            .get_json::<Payload>(
                &format!("{}/oembed", server.uri()),
                &[("url", "https://example.com/x")],
                "https://example.com/x",
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ExtractionError::Status { status: 404, .. }));
        assert_eq!(err.url(), "https://example.com/x");
    }

    #[tokio::test]
    async fn test_get_json_with_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/oembed"))
            .and(query_param("url", "https://example.com/x"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"title": "T"})),
            )
            .mount(&server)
            .await;

        let payload: Payload = fetcher()
            .get_json(
                &format!("{}/oembed", server.uri()),
                &[("url", "https://example.com/x")],
                "https://example.com/x",
            )
            .await
            .unwrap();
        assert_eq!(payload.title, "T");
    }

    #[tokio::test]
    async fn test_invalid_json_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = fetcher()
            .get_json::<Payload>(&server.uri(), &[], "https://example.com/x")
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractionError::Malformed { .. }));
    }
}
