//! Canonical content record flowing through the pipeline.
//!
//! Extractors create `ContentItem`s, processors take them by value and hand
//! back modified copies. Nothing holds on to an item after a run.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Validation errors for the content model
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("Content URL cannot be empty")]
    EmptyUrl,

    #[error("Unknown content type: {0}")]
    UnknownContentType(String),

    #[error("Unknown domain: {0}")]
    UnknownDomain(String),
}

/// Content identifier (SHA256(url)[0:16] unless assigned by the caller)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(String);

impl ContentId {
    /// Use a caller-assigned identifier as-is
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derive an identifier from a source URL
    pub fn from_url(url: &str) -> Self {
        let digest = Sha256::digest(url.as_bytes());
        Self(hex::encode(&digest[..8]))
    }

    /// Derive the identifier of the `index`-th item extracted from one URL.
    ///
    /// Index 0 is the plain URL id so single-item sources stay stable.
    pub fn from_url_indexed(url: &str, index: usize) -> Self {
        let base = Self::from_url(url);
        if index == 0 {
            base
        } else {
            Self(format!("{}-{}", base.0, index))
        }
    }

    /// Get the raw string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind of content an item represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Tweet,
    Video,
    Article,
    Podcast,
    Music,
    Research,
}

impl ContentType {
    /// All content types, in declaration order
    pub const ALL: [ContentType; 6] = [
        ContentType::Tweet,
        ContentType::Video,
        ContentType::Article,
        ContentType::Podcast,
        ContentType::Music,
        ContentType::Research,
    ];

    /// Wire value of this content type
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Tweet => "tweet",
            ContentType::Video => "video",
            ContentType::Article => "article",
            ContentType::Podcast => "podcast",
            ContentType::Music => "music",
            ContentType::Research => "research",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ContentType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ContentType::ALL
            .into_iter()
            .find(|ct| ct.as_str() == wanted)
            .ok_or_else(|| ModelError::UnknownContentType(s.to_string()))
    }
}

/// A single normalized piece of content.
///
/// `metadata` is shared between extractors and processors. Producers write
/// their keys as `"{producer}.{key}"` (see [`ContentItem::set_meta`]) so that
/// contributions from different stages never overwrite each other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: ContentId,
    pub url: String,
    pub content_type: ContentType,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub author: String,
    /// ISO-8601 timestamp, or empty when the source has none
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,
}

impl ContentItem {
    /// Create an item whose id is derived from its URL
    pub fn new(
        url: impl Into<String>,
        content_type: ContentType,
        title: impl Into<String>,
    ) -> Result<Self, ModelError> {
        let url = url.into();
        let id = ContentId::from_url(&url);
        Self::with_id(id, url, content_type, title)
    }

    /// Create an item with a caller-assigned id
    pub fn with_id(
        id: ContentId,
        url: impl Into<String>,
        content_type: ContentType,
        title: impl Into<String>,
    ) -> Result<Self, ModelError> {
        let url = url.into();
        if url.trim().is_empty() {
            return Err(ModelError::EmptyUrl);
        }

        Ok(Self {
            id,
            url,
            content_type,
            title: title.into(),
            description: String::new(),
            author: String::new(),
            created_at: String::new(),
            metadata: BTreeMap::new(),
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn with_created_at(mut self, created_at: impl Into<String>) -> Self {
        self.created_at = created_at.into();
        self
    }

    /// Namespaced metadata key for a producer
    pub fn meta_key(producer: &str, key: &str) -> String {
        format!("{}.{}", producer, key)
    }

    /// Set a metadata value under the producer's namespace
    pub fn set_meta(&mut self, producer: &str, key: &str, value: impl Into<Value>) {
        self.metadata
            .insert(Self::meta_key(producer, key), value.into());
    }

    /// Read a metadata value from the producer's namespace
    pub fn meta(&self, producer: &str, key: &str) -> Option<&Value> {
        self.metadata.get(&Self::meta_key(producer, key))
    }

    /// Title and description joined, the text processors analyze
    pub fn text(&self) -> String {
        match (self.title.is_empty(), self.description.is_empty()) {
            (false, false) => format!("{} {}", self.title, self.description),
            (false, true) => self.title.clone(),
            (true, _) => self.description.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_id_from_url() {
        let id1 = ContentId::from_url("https://example.com/a");
        let id2 = ContentId::from_url("https://example.com/a");
        let id3 = ContentId::from_url("https://example.com/b");

        assert_eq!(id1, id2);
        assert_ne!(id1, id3);
        assert_eq!(id1.as_str().len(), 16);
    }

    #[test]
    fn test_indexed_ids() {
        let url = "https://example.com/feed";
        assert_eq!(ContentId::from_url_indexed(url, 0), ContentId::from_url(url));
        assert!(ContentId::from_url_indexed(url, 2).as_str().ends_with("-2"));
    }

    #[test]
    fn test_content_type_parsing() {
        assert_eq!("tweet".parse::<ContentType>().unwrap(), ContentType::Tweet);
        assert_eq!(" Video ".parse::<ContentType>().unwrap(), ContentType::Video);
        assert_eq!(
            "blogpost".parse::<ContentType>(),
            Err(ModelError::UnknownContentType("blogpost".to_string()))
        );
    }

    #[test]
    fn test_unknown_content_type_rejected_on_deserialize() {
        let json = r#"{"id":"x","url":"https://a","content_type":"meme","title":""}"#;
        assert!(serde_json::from_str::<ContentItem>(json).is_err());
    }

    #[test]
    fn test_empty_url_rejected() {
        let result = ContentItem::new("  ", ContentType::Article, "title");
        assert_eq!(result, Err(ModelError::EmptyUrl));
    }

    #[test]
    fn test_serialized_shape() {
        let mut item = ContentItem::new("https://example.com/a", ContentType::Article, "A")
            .unwrap()
            .with_author("someone");
        item.set_meta("keyword-tagger", "keywords", serde_json::json!(["rust"]));

        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["content_type"], "article");
        assert_eq!(value["author"], "someone");
        assert_eq!(value["created_at"], "");
        assert_eq!(value["metadata"]["keyword-tagger.keywords"][0], "rust");
    }

    #[test]
    fn test_namespaced_metadata() {
        let mut item = ContentItem::new("https://example.com/a", ContentType::Tweet, "").unwrap();
        item.set_meta("a", "score", 1);
        item.set_meta("b", "score", 2);

        assert_eq!(item.meta("a", "score"), Some(&Value::from(1)));
        assert_eq!(item.meta("b", "score"), Some(&Value::from(2)));
        assert_eq!(item.metadata.len(), 2);
    }

    #[test]
    fn test_text_joins_title_and_description() {
        let item = ContentItem::new("https://example.com/a", ContentType::Article, "Title")
            .unwrap()
            .with_description("Body");
        assert_eq!(item.text(), "Title Body");
    }
}
