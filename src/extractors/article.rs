//! Generic web pages.
//!
//! Lightweight readability-like extraction:
//! - title from `og:title`, then `<title>`, then the first `<h1>`
//! - description from the meta description, then the opening paragraphs
//! - author and publication time from the usual meta tags
//! - content type from `og:type` (music.*, video.*) or the host (arxiv)

use async_trait::async_trait;
use chrono::DateTime;
use scraper::{Html, Selector};

use super::http::HttpFetcher;
use super::{bare_host, parse_http_url, ExtractionError, Extractor};
use super::{MAX_DESCRIPTION_CHARS, MAX_TITLE_CHARS};
use crate::domain::{ContentItem, ContentType};
use crate::text::{clean_text, truncate_text, word_count};

pub const NAME: &str = "article";

const RESEARCH_HOSTS: &[&str] = &["arxiv.org", "openreview.net", "paperswithcode.com"];

/// Fallback extractor for any http(s) page
pub struct ArticleExtractor {
    fetcher: HttpFetcher,
}

impl ArticleExtractor {
    pub fn new(fetcher: HttpFetcher) -> Self {
        Self { fetcher }
    }
}

/// Fields read from a page
#[derive(Debug, Default, PartialEq)]
struct PageFields {
    title: String,
    description: String,
    author: String,
    published: String,
    og_type: String,
    body_text: String,
}

fn meta_content(doc: &Html, selector: &str) -> Option<String> {
    let sel = Selector::parse(selector).ok()?;
    doc.select(&sel)
        .filter_map(|el| el.value().attr("content"))
        .map(clean_text)
        .find(|s| !s.is_empty())
}

fn first_text(doc: &Html, selector: &str) -> Option<String> {
    let sel = Selector::parse(selector).ok()?;
    doc.select(&sel)
        .map(|el| clean_text(&el.text().collect::<Vec<_>>().join(" ")))
        .find(|s| !s.is_empty())
}

/// Paragraph text, preferring `<article>` over the whole page
fn paragraph_text(doc: &Html) -> String {
    for selector in ["article p", "main p", "p"] {
        let Ok(sel) = Selector::parse(selector) else {
            continue;
        };
        let paragraphs: Vec<String> = doc
            .select(&sel)
            .map(|p| clean_text(&p.text().collect::<Vec<_>>().join(" ")))
            .filter(|s| !s.is_empty())
            .collect();
        if !paragraphs.is_empty() {
            return paragraphs.join(" ");
        }
    }
    String::new()
}

/// Normalize a published time to RFC 3339, dropping values that don't parse
fn normalize_timestamp(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_default()
}

fn parse_page(html: &str) -> PageFields {
    let doc = Html::parse_document(html);

    let title = meta_content(&doc, r#"meta[property="og:title"]"#)
        .or_else(|| first_text(&doc, "title"))
        .or_else(|| first_text(&doc, "h1"))
        .unwrap_or_default();

    let description = meta_content(&doc, r#"meta[name="description"]"#)
        .or_else(|| meta_content(&doc, r#"meta[property="og:description"]"#))
        .unwrap_or_default();

    let author = meta_content(&doc, r#"meta[name="author"]"#)
        .or_else(|| meta_content(&doc, r#"meta[property="article:author"]"#))
        .unwrap_or_default();

    let published = meta_content(&doc, r#"meta[property="article:published_time"]"#)
        .map(|raw| normalize_timestamp(&raw))
        .unwrap_or_default();

    let og_type = meta_content(&doc, r#"meta[property="og:type"]"#)
        .unwrap_or_default()
        .to_lowercase();

    PageFields {
        title,
        description,
        author,
        published,
        og_type,
        body_text: paragraph_text(&doc),
    }
}

/// Content type from the page's `og:type` and host
fn classify(url: &str, og_type: &str) -> ContentType {
    if og_type.starts_with("music.") {
        return ContentType::Music;
    }
    if og_type.starts_with("video.") {
        return ContentType::Video;
    }

    let is_research = parse_http_url(url)
        .and_then(|u| bare_host(&u))
        .is_some_and(|host| RESEARCH_HOSTS.iter().any(|h| host == *h));
    if is_research {
        ContentType::Research
    } else {
        ContentType::Article
    }
}

fn build_item(url: &str, page: PageFields) -> Result<ContentItem, ExtractionError> {
    if page.title.is_empty() && page.body_text.is_empty() {
        return Err(ExtractionError::Empty {
            url: url.to_string(),
        });
    }

    let description = if page.description.is_empty() {
        &page.body_text
    } else {
        &page.description
    };

    let mut item = ContentItem::new(
        url,
        classify(url, &page.og_type),
        truncate_text(&page.title, MAX_TITLE_CHARS),
    )
    .map_err(|e| ExtractionError::Malformed {
        url: url.to_string(),
        reason: e.to_string(),
    })?
    .with_description(truncate_text(description, MAX_DESCRIPTION_CHARS))
    .with_author(page.author)
    .with_created_at(page.published);

    item.set_meta(NAME, "word_count", word_count(&page.body_text));
    if !page.og_type.is_empty() {
        item.set_meta(NAME, "og_type", page.og_type);
    }

    Ok(item)
}

#[async_trait]
impl Extractor for ArticleExtractor {
    fn name(&self) -> &str {
        NAME
    }

    fn can_extract(&self, url: &str) -> bool {
        parse_http_url(url).is_some()
    }

    async fn extract_content(&self, url: &str) -> Result<Vec<ContentItem>, ExtractionError> {
        if !self.can_extract(url) {
            return Err(ExtractionError::Unsupported {
                url: url.to_string(),
            });
        }

        let html = self.fetcher.get_text(url).await?;
        let page = parse_page(&html);
        Ok(vec![build_item(url, page)?])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::HttpSettings;
    use serde_json::Value;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PAGE: &str = r#"<!doctype html>
<html><head>
  <title>Fallback title</title>
  <meta property="og:title" content="Building   a Sampler">
  <meta name="author" content="Jane Doe">
  <meta property="article:published_time" content="2024-03-05T10:00:00Z">
  <script>var tracking = "ignore me";</script>
</head>
<body>
  <nav><p>Home</p></nav>
  <article>
    <h1>Building a Sampler</h1>
    <p>Samplers slice audio into pads.</p>
    <p>This guide walks through the DSP.</p>
  </article>
</body></html>"#;

    #[test]
    fn test_parse_page_fields() {
        let page = parse_page(PAGE);
        assert_eq!(page.title, "Building a Sampler");
        assert_eq!(page.author, "Jane Doe");
        assert_eq!(page.published, "2024-03-05T10:00:00+00:00");
        assert_eq!(
            page.body_text,
            "Samplers slice audio into pads. This guide walks through the DSP."
        );
        assert!(page.description.is_empty());
    }

    #[test]
    fn test_title_falls_back_to_title_tag() {
        let page = parse_page("<html><head><title> Plain </title></head><body></body></html>");
        assert_eq!(page.title, "Plain");
    }

    #[test]
    fn test_description_falls_back_to_body() {
        let item = build_item("https://blog.example.com/post", parse_page(PAGE)).unwrap();
        assert_eq!(item.content_type, ContentType::Article);
        assert!(item.description.starts_with("Samplers slice audio"));
        assert_eq!(item.meta(NAME, "word_count"), Some(&Value::from(11)));
    }

    #[test]
    fn test_unparseable_timestamp_dropped() {
        assert_eq!(normalize_timestamp("last tuesday"), "");
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify("https://arxiv.org/abs/1234", ""), ContentType::Research);
        assert_eq!(classify("https://example.com/x", "music.song"), ContentType::Music);
        assert_eq!(classify("https://example.com/x", "video.other"), ContentType::Video);
        assert_eq!(classify("https://example.com/x", "article"), ContentType::Article);
    }

    #[test]
    fn test_empty_page_is_error() {
        let err = build_item("https://example.com/x", parse_page("<html></html>")).unwrap_err();
        assert!(matches!(err, ExtractionError::Empty { .. }));
    }

    #[test]
    fn test_can_extract_any_http_url() {
        let ex = ArticleExtractor::new(HttpFetcher::new(&HttpSettings::default()).unwrap());
        assert!(ex.can_extract("https://example.com/a"));
        assert!(ex.can_extract("http://example.com"));
        assert!(!ex.can_extract("mailto:someone@example.com"));
        assert!(!ex.can_extract(""));
    }

    #[tokio::test]
    async fn test_extract_article() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/post"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(PAGE, "text/html"))
            .mount(&server)
            .await;

        let ex = ArticleExtractor::new(HttpFetcher::new(&HttpSettings::default()).unwrap());
        let url = format!("{}/post", server.uri());
        let items = ex.extract_content(&url).await.unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Building a Sampler");
        assert_eq!(items[0].url, url);
    }

    #[tokio::test]
    async fn test_server_error_is_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let ex = ArticleExtractor::new(HttpFetcher::new(&HttpSettings::default()).unwrap());
        let err = ex.extract_content(&server.uri()).await.unwrap_err();
        assert!(matches!(err, ExtractionError::Status { status: 500, .. }));
        assert!(err.is_transient());
    }
}
