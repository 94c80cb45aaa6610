//! Emotion tagging from keyword matches.

use async_trait::async_trait;
use serde_json::Value;

use super::{ProcessingError, Processor};
use crate::domain::ContentItem;
use crate::text::extract_emotions;

pub const NAME: &str = "sentiment-tagger";
pub const EMOTIONS_KEY: &str = "emotions";

/// Tags items with the emotion categories found in their text
#[derive(Debug, Clone, Default)]
pub struct SentimentTagger;

#[async_trait]
impl Processor for SentimentTagger {
    fn name(&self) -> &str {
        NAME
    }

    async fn process_content(
        &self,
        items: Vec<ContentItem>,
    ) -> Result<Vec<ContentItem>, ProcessingError> {
        Ok(items
            .into_iter()
            .map(|mut item| {
                let emotions = extract_emotions(&item.text());
                item.set_meta(NAME, EMOTIONS_KEY, Value::from(emotions));
                item
            })
            .collect())
    }
}
