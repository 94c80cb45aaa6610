//! YouTube videos via the oEmbed endpoint.

use async_trait::async_trait;

use super::http::HttpFetcher;
use super::{bare_host, oembed, parse_http_url, ExtractionError, Extractor};
use super::MAX_TITLE_CHARS;
use crate::domain::{ContentId, ContentItem, ContentType};
use crate::text::{clean_text, truncate_text};

pub const NAME: &str = "youtube";

const DEFAULT_OEMBED_ENDPOINT: &str = "https://www.youtube.com/oembed";

/// Extractor for youtube.com and youtu.be video URLs
pub struct YouTubeExtractor {
    fetcher: HttpFetcher,
    oembed_endpoint: String,
}

impl YouTubeExtractor {
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

fn is_video_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Video id of a YouTube URL.
///
/// Handles `watch?v=`, `/shorts/`, `/embed/`, `/live/` and `youtu.be/` forms.
pub fn video_id(url: &str) -> Option<String> {
    let parsed = parse_http_url(url)?;
    let host = bare_host(&parsed)?;
    let mut segments = parsed.path_segments()?.filter(|s| !s.is_empty());

    let id = match host.as_str() {
        "youtu.be" => segments.next()?.to_string(),
        "youtube.com" | "music.youtube.com" => match segments.next()? {
            "watch" => parsed
                .query_pairs()
                .find(|(k, _)| k == "v")
                .map(|(_, v)| v.into_owned())?,
            "shorts" | "embed" | "live" => segments.next()?.to_string(),
            _ => return None,
        },
        _ => return None,
    };

    is_video_id(&id).then_some(id)
}

#[async_trait]
impl Extractor for YouTubeExtractor {
    fn name(&self) -> &str {
        NAME
    }

    fn can_extract(&self, url: &str) -> bool {
        video_id(url).is_some()
    }

    async fn extract_content(&self, url: &str) -> Result<Vec<ContentItem>, ExtractionError> {
        let id = video_id(url).ok_or_else(|| ExtractionError::Unsupported {
            url: url.to_string(),
        })?;

        let embed = oembed::lookup(&self.fetcher, &self.oembed_endpoint, url, &[]).await?;

        let title = clean_text(embed.title.as_deref().unwrap_or_default());
        if title.is_empty() {
            return Err(ExtractionError::Empty {
                url: url.to_string(),
            });
        }

        // Same video under different URL forms shares one id
        let content_id = ContentId::from_url(&format!("youtube:{}", id));
        let mut item = ContentItem::with_id(
            content_id,
            url,
            ContentType::Video,
            truncate_text(&title, MAX_TITLE_CHARS),
        )
        .map_err(|e| ExtractionError::Malformed {
            url: url.to_string(),
            reason: e.to_string(),
        })?
        .with_author(clean_text(embed.author_name.as_deref().unwrap_or_default()));

        item.set_meta(NAME, "video_id", id);
        if let Some(channel) = embed.author_url {
            item.set_meta(NAME, "channel_url", channel);
        }
        if let Some(thumbnail) = embed.thumbnail_url {
            item.set_meta(NAME, "thumbnail_url", thumbnail);
        }

        Ok(vec![item])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::HttpSettings;
    use serde_json::Value;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn extractor(endpoint: &str) -> YouTubeExtractor {
        YouTubeExtractor::new(HttpFetcher::new(&HttpSettings::default()).unwrap())
            .with_oembed_endpoint(endpoint)
    }

    #[test]
    fn test_video_id_forms() {
        assert_eq!(
            video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42").as_deref(),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(video_id("https://youtu.be/dQw4w9WgXcQ").as_deref(), Some("dQw4w9WgXcQ"));
        assert_eq!(
            video_id("https://youtube.com/shorts/abc_DEF-123").as_deref(),
            Some("abc_DEF-123")
        );
        assert_eq!(video_id("https://m.youtube.com/embed/xyz").as_deref(), Some("xyz"));

        assert_eq!(video_id("https://www.youtube.com/channel/UC123"), None);
        assert_eq!(video_id("https://www.youtube.com/watch"), None);
        assert_eq!(video_id("https://vimeo.com/12345"), None);
    }

    #[tokio::test]
    async fn test_extract_video() {
        let server = MockServer::start().await;
        let url = "https://youtu.be/dQw4w9WgXcQ";
        Mock::given(method("GET"))
            .and(path("/oembed"))
            .and(query_param("url", url))
            .and(query_param("format", "json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "title": "Mixing  drums\nin 10 minutes",
                "author_name": "Studio Channel",
                "author_url": "https://www.youtube.com/@studio",
                "thumbnail_url": "https://i.ytimg.com/vi/dQw4w9WgXcQ/hqdefault.jpg",
            })))
            .mount(&server)
            .await;

        let items = extractor(&format!("{}/oembed", server.uri()))
            .extract_content(url)
            .await
            .unwrap();

        let item = &items[0];
        assert_eq!(item.content_type, ContentType::Video);
        assert_eq!(item.title, "Mixing drums in 10 minutes");
        assert_eq!(item.author, "Studio Channel");
        assert_eq!(item.meta(NAME, "video_id"), Some(&Value::from("dQw4w9WgXcQ")));
    }

    #[tokio::test]
    async fn test_same_video_same_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"title": "T"})),
            )
            .mount(&server)
            .await;

        let ex = extractor(&server.uri());
        let a = ex.extract_content("https://youtu.be/abc").await.unwrap();
        let b = ex
            .extract_content("https://www.youtube.com/watch?v=abc")
            .await
            .unwrap();
        assert_eq!(a[0].id, b[0].id);
    }

    #[tokio::test]
    async fn test_untitled_video_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let err = extractor(&server.uri())
            .extract_content("https://youtu.be/abc")
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractionError::Empty { .. }));
    }
}
