//! Extractors turn a source URL into normalized content items.
//!
//! Each extractor claims the URLs it understands (`can_extract`) and fetches
//! them asynchronously (`extract_content`). Batches are extracted with
//! per-URL failure isolation: a bad URL is logged, recorded and skipped.

pub mod article;
pub mod http;
pub mod oembed;
pub mod twitter;
pub mod youtube;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, error, warn};
use url::Url;

use crate::core::limits::ExtractionLimits;
use crate::domain::{ContentId, ContentItem, ExtractionFailure};

pub use article::ArticleExtractor;
pub use http::{HttpFetcher, HttpSettings};
pub use twitter::TwitterExtractor;
pub use youtube::YouTubeExtractor;

/// Longest title an extractor produces, in characters
pub const MAX_TITLE_CHARS: usize = 200;

/// Longest description an extractor produces, in characters
pub const MAX_DESCRIPTION_CHARS: usize = 1000;

/// A single URL could not be extracted
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Empty URL")]
    EmptyUrl { url: String },

    #[error("No extractor supports {url}")]
    Unsupported { url: String },

    #[error("URL matches denylist: {url}")]
    Denylisted { url: String },

    #[error("Failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} while fetching {url}")]
    Status { url: String, status: u16 },

    #[error("Malformed content at {url}: {reason}")]
    Malformed { url: String, reason: String },

    #[error("No content found at {url}")]
    Empty { url: String },

    #[error("Extraction of {url} timed out after {seconds}s")]
    Timeout { url: String, seconds: u64 },
}

impl ExtractionError {
    /// The URL that failed
    pub fn url(&self) -> &str {
        match self {
            ExtractionError::EmptyUrl { url }
            | ExtractionError::Unsupported { url }
            | ExtractionError::Denylisted { url }
            | ExtractionError::Fetch { url, .. }
            | ExtractionError::Status { url, .. }
            | ExtractionError::Malformed { url, .. }
            | ExtractionError::Empty { url }
            | ExtractionError::Timeout { url, .. } => url,
        }
    }

    /// Whether a retry could plausibly succeed
    pub fn is_transient(&self) -> bool {
        match self {
            ExtractionError::Fetch { .. } | ExtractionError::Timeout { .. } => true,
            ExtractionError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Items and failures of one batch extraction
#[derive(Debug, Default)]
pub struct BatchExtraction {
    /// Extracted items in input URL order
    pub items: Vec<ContentItem>,

    /// One record per URL that produced an error
    pub failures: Vec<ExtractionFailure>,
}

/// Trait for content extractors
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Source identifier (e.g. "youtube")
    fn name(&self) -> &str;

    /// Whether this extractor handles `url`. Pure, never fails.
    fn can_extract(&self, url: &str) -> bool;

    /// Fetch and normalize the content behind `url`
    async fn extract_content(&self, url: &str) -> Result<Vec<ContentItem>, ExtractionError>;

    /// Extract every claimed URL, skipping the ones that fail.
    ///
    /// Uses the default [`ExtractionLimits`]; see [`extract_batch`] for
    /// explicit limits and failure records.
    async fn batch_extract(&self, urls: &[String]) -> Vec<ContentItem> {
        extract_batch(self, urls, &ExtractionLimits::default())
            .await
            .items
    }
}

/// Extract the URLs `extractor` claims, isolating per-URL failures.
///
/// URLs the extractor does not claim are skipped. Up to
/// `limits.max_concurrency` URLs are in flight at once; results keep input
/// order regardless of completion order.
pub async fn extract_batch<E>(
    extractor: &E,
    urls: &[String],
    limits: &ExtractionLimits,
) -> BatchExtraction
where
    E: Extractor + ?Sized,
{
    let claimed: Vec<String> = urls
        .iter()
        .filter(|url| {
            let ok = extractor.can_extract(url);
            if !ok {
                debug!(extractor = extractor.name(), %url, "URL not claimed, skipping");
            }
            ok
        })
        .cloned()
        .collect();

    let outcomes: Vec<(String, Result<Vec<ContentItem>, ExtractionError>)> =
        stream::iter(claimed)
            .map(|url| async move {
                let outcome = extract_one(extractor, &url, limits).await;
                (url, outcome)
            })
            .buffered(limits.concurrency())
            .collect()
            .await;

    let mut batch = BatchExtraction::default();
    for (url, outcome) in outcomes {
        match outcome {
            Ok(mut items) => {
                index_ids(&url, &mut items);
                debug!(extractor = extractor.name(), %url, count = items.len(), "Extracted");
                batch.items.extend(items);
            }
            Err(e) => {
                error!(extractor = extractor.name(), %url, error = %e, "Failed to extract");
                batch.failures.push(ExtractionFailure {
                    url,
                    extractor: Some(extractor.name().to_string()),
                    message: e.to_string(),
                });
            }
        }
    }

    batch
}

/// Give the items of one URL distinct ids when they all carry the URL id
fn index_ids(url: &str, items: &mut [ContentItem]) {
    let base = ContentId::from_url(url);
    if items.len() > 1 && items.iter().all(|item| item.id == base) {
        for (index, item) in items.iter_mut().enumerate() {
            item.id = ContentId::from_url_indexed(url, index);
        }
    }
}

/// Extract one URL with denylist, timeout and retry handling
async fn extract_one<E>(
    extractor: &E,
    url: &str,
    limits: &ExtractionLimits,
) -> Result<Vec<ContentItem>, ExtractionError>
where
    E: Extractor + ?Sized,
{
    if limits.is_denylisted(url) {
        return Err(ExtractionError::Denylisted {
            url: url.to_string(),
        });
    }

    let policy = &limits.retry_policy;
    let mut attempt = 0u32;

    loop {
        attempt += 1;

        let result = match timeout(limits.timeout(), extractor.extract_content(url)).await {
            Ok(result) => result,
            Err(_) => Err(ExtractionError::Timeout {
                url: url.to_string(),
                seconds: limits.timeout_seconds,
            }),
        };

        match result {
            Err(e) if e.is_transient() && policy.should_retry(attempt) => {
                let delay = policy.delay_for_attempt(attempt);
                warn!(
                    extractor = extractor.name(),
                    %url,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Extraction failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            other => return other,
        }
    }
}

/// Parse `url` if it is an absolute http(s) URL
pub fn parse_http_url(url: &str) -> Option<Url> {
    let parsed = Url::parse(url.trim()).ok()?;
    match parsed.scheme() {
        "http" | "https" => Some(parsed),
        _ => None,
    }
}

/// Host of `url` without a leading "www." / "m." / "mobile.", lower-cased
pub fn bare_host(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    let bare = ["www.", "m.", "mobile."]
        .iter()
        .find_map(|prefix| host.strip_prefix(prefix))
        .unwrap_or(&host)
        .to_string();
    Some(bare)
}

/// The standard extractor set, in routing order.
///
/// The article extractor claims any http(s) URL and is registered last.
pub fn default_extractors(fetcher: HttpFetcher) -> Vec<Box<dyn Extractor>> {
    vec![
        Box::new(TwitterExtractor::new(fetcher.clone())),
        Box::new(YouTubeExtractor::new(fetcher.clone())),
        Box::new(ArticleExtractor::new(fetcher)),
    ]
}
