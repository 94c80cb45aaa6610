//! Reading time estimates.

use async_trait::async_trait;

use super::{ProcessingError, Processor};
use crate::domain::ContentItem;
use crate::text::{calculate_reading_time, DEFAULT_WORDS_PER_MINUTE};

pub const NAME: &str = "reading-time";
pub const MINUTES_KEY: &str = "minutes";

/// Annotates items with an estimated reading time in minutes.
///
/// Uses the article word count recorded by the article extractor when
/// present, since the description is truncated.
#[derive(Debug, Clone)]
pub struct ReadingTimeEstimator {
    words_per_minute: usize,
}

impl Default for ReadingTimeEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_WORDS_PER_MINUTE)
    }
}

impl ReadingTimeEstimator {
    pub fn new(words_per_minute: usize) -> Self {
        Self { words_per_minute }
    }

    fn estimate(&self, item: &ContentItem) -> usize {
        let full_word_count = item
            .meta(crate::extractors::article::NAME, "word_count")
            .and_then(|v| v.as_u64());

        match full_word_count {
            Some(words) => {
                let rate = self.words_per_minute.max(1) as u64;
                ((words / rate).max(1)) as usize
            }
            None => calculate_reading_time(&item.text(), self.words_per_minute),
        }
    }
}

#[async_trait]
impl Processor for ReadingTimeEstimator {
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
                let minutes = self.estimate(&item);
                item.set_meta(NAME, MINUTES_KEY, minutes);
                item
            })
            .collect())
    }
}
