//! oEmbed lookups (https://oembed.com) shared by the social extractors.

use serde::Deserialize;

use super::http::HttpFetcher;
use super::ExtractionError;

/// The subset of an oEmbed response the extractors use
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OEmbedResponse {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub author_url: Option<String>,
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub provider_name: Option<String>,
}

/// Query an oEmbed endpoint for `url`
pub async fn lookup(
    fetcher: &HttpFetcher,
    endpoint: &str,
    url: &str,
    extra_query: &[(&str, &str)],
) -> Result<OEmbedResponse, ExtractionError> {
    let mut query = vec![("url", url), ("format", "json")];
    query.extend_from_slice(extra_query);

    fetcher.get_json(endpoint, &query, url).await
}
