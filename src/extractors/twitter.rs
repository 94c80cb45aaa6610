//! Tweets via the public oEmbed endpoint.

use async_trait::async_trait;
use chrono::NaiveDate;
use scraper::{Html, Selector};
use serde_json::Value;

use super::http::HttpFetcher;
use super::{bare_host, oembed, parse_http_url, ExtractionError, Extractor};
use super::{MAX_DESCRIPTION_CHARS, MAX_TITLE_CHARS};
use crate::domain::{ContentItem, ContentType};
use crate::text::{clean_text, truncate_text};

pub const NAME: &str = "twitter";

const DEFAULT_OEMBED_ENDPOINT: &str = "https://publish.twitter.com/oembed";

const HOSTS: &[&str] = &["twitter.com", "x.com"];

/// Extractor for twitter.com / x.com status URLs
pub struct TwitterExtractor {
    fetcher: HttpFetcher,
    oembed_endpoint: String,
}

impl TwitterExtractor {
    pub fn new(fetcher: HttpFetcher) -> Self {
        Self {
            fetcher,
            oembed_endpoint: DEFAULT_OEMBED_ENDPOINT.to_string(),
        }
    }

    /// Use a different oEmbed endpoint (mirrors, tests)
    pub fn with_oembed_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.oembed_endpoint = endpoint.into();
        self
    }
}

/// `(handle, status id)` of a tweet URL
fn tweet_parts(url: &str) -> Option<(String, String)> {
    let parsed = parse_http_url(url)?;
    let host = bare_host(&parsed)?;
    if !HOSTS.contains(&host.as_str()) {
        return None;
    }

    let segments: Vec<&str> = parsed.path_segments()?.filter(|s| !s.is_empty()).collect();
    match segments.as_slice() {
        [handle, "status", id, ..] if id.chars().all(|c| c.is_ascii_digit()) => {
            Some((handle.to_string(), id.to_string()))
        }
        _ => None,
    }
}

/// Tweet body and publication date from the oEmbed blockquote
fn parse_embed_html(html: &str) -> (String, Option<String>) {
    let doc = Html::parse_fragment(html);

    let text = Selector::parse("blockquote p")
        .ok()
        .and_then(|sel| doc.select(&sel).next())
        .map(|p| clean_text(&p.text().collect::<Vec<_>>().join(" ")))
        .unwrap_or_default();

    // The last link of the blockquote is the date, e.g. "June 1, 2020"
    let date = Selector::parse("blockquote > a")
        .ok()
        .and_then(|sel| doc.select(&sel).last())
        .map(|a| a.text().collect::<String>())
        .and_then(|s| NaiveDate::parse_from_str(s.trim(), "%B %d, %Y").ok())
        .map(|d| d.format("%Y-%m-%d").to_string());

    (text, date)
}

#[async_trait]
impl Extractor for TwitterExtractor {
    fn name(&self) -> &str {
        NAME
    }

    fn can_extract(&self, url: &str) -> bool {
        tweet_parts(url).is_some()
    }

    async fn extract_content(&self, url: &str) -> Result<Vec<ContentItem>, ExtractionError> {
        let (handle, tweet_id) = tweet_parts(url).ok_or_else(|| ExtractionError::Unsupported {
            url: url.to_string(),
        })?;

        let embed = oembed::lookup(
            &self.fetcher,
            &self.oembed_endpoint,
            url,
            &[("omit_script", "true"), ("dnt", "true")],
        )
        .await?;

        let html = embed.html.unwrap_or_default();
        let (text, date) = parse_embed_html(&html);
        if text.is_empty() {
            return Err(ExtractionError::Empty {
                url: url.to_string(),
            });
        }

        let mut item = ContentItem::new(url, ContentType::Tweet, truncate_text(&text, MAX_TITLE_CHARS))
            .map_err(|e| ExtractionError::Malformed {
                url: url.to_string(),
                reason: e.to_string(),
            })?
            .with_description(truncate_text(&text, MAX_DESCRIPTION_CHARS))
            .with_author(embed.author_name.unwrap_or_else(|| handle.clone()))
            .with_created_at(date.unwrap_or_default());

        item.set_meta(NAME, "tweet_id", tweet_id);
        item.set_meta(NAME, "handle", handle);
        if let Some(author_url) = embed.author_url {
            item.set_meta(NAME, "author_url", Value::from(author_url));
        }

        Ok(vec![item])
    }
}
