//! Keyword tagging by word frequency.

use async_trait::async_trait;
use serde_json::Value;

use super::{ProcessingError, Processor};
use crate::domain::ContentItem;
use crate::text::{extract_keywords, DEFAULT_MAX_KEYWORDS};

pub const NAME: &str = "keyword-tagger";
pub const KEYWORDS_KEY: &str = "keywords";

/// Tags each item with its most frequent title/description words
#[derive(Debug, Clone)]
pub struct KeywordTagger {
    max_keywords: usize,
}

impl Default for KeywordTagger {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_KEYWORDS)
    }
}

impl KeywordTagger {
    pub fn new(max_keywords: usize) -> Self {
        Self { max_keywords }
    }

    fn tag(&self, mut item: ContentItem) -> ContentItem {
        let keywords = extract_keywords(&item.text(), self.max_keywords);
        item.set_meta(NAME, KEYWORDS_KEY, Value::from(keywords));
        item
    }
}

#[async_trait]
impl Processor for KeywordTagger {
    fn name(&self) -> &str {
        NAME
    }

    async fn process_content(
        &self,
        items: Vec<ContentItem>,
    ) -> Result<Vec<ContentItem>, ProcessingError> {
        Ok(items.into_iter().map(|item| self.tag(item)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ContentType;

    #[tokio::test]
    async fn test_tags_keywords() {
        let item = ContentItem::new("https://example.com/a", ContentType::Article, "Modular synth")
            .unwrap()
            .with_description("A modular synth patch with modular sequencing");

        let out = KeywordTagger::new(2).process_content(vec![item]).await.unwrap();
        assert_eq!(
            out[0].meta(NAME, KEYWORDS_KEY),
            Some(&serde_json::json!(["modular", "synth"]))
        );
    }

    #[tokio::test]
    async fn test_empty_text_gets_empty_list() {
        let item = ContentItem::new("https://example.com/a", ContentType::Tweet, "").unwrap();
        let out = KeywordTagger::default().process_single(item).await.unwrap();
        assert_eq!(out.meta(NAME, KEYWORDS_KEY), Some(&serde_json::json!([])));
    }
}
