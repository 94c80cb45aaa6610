//! Processors enrich or transform batches of content items.
//!
//! Processors take ownership of a batch and hand back the transformed
//! items. Annotations go into the item metadata under the processor's
//! name (`"{processor}.{key}"`).

pub mod category;
pub mod keywords;
pub mod reading_time;
pub mod sentiment;
pub mod summary;

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

use crate::domain::{ContentId, ContentItem};

pub use category::CategoryTagger;
pub use keywords::KeywordTagger;
pub use reading_time::ReadingTimeEstimator;
pub use sentiment::SentimentTagger;
pub use summary::SummaryGenerator;

/// A processor could not transform an item or a batch
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProcessingError {
    #[error("Processor '{processor}' failed on item {content_id}: {reason}")]
    Item {
        processor: String,
        content_id: ContentId,
        reason: String,
    },

    #[error("Processor '{processor}' failed: {reason}")]
    Batch { processor: String, reason: String },

    #[error("Processor '{processor}' timed out after {seconds}s on item {content_id}")]
    Timeout {
        processor: String,
        content_id: ContentId,
        seconds: u64,
    },
}

impl ProcessingError {
    /// The item the error is about, when it concerns a single item
    pub fn content_id(&self) -> Option<&ContentId> {
        match self {
            ProcessingError::Item { content_id, .. }
            | ProcessingError::Timeout { content_id, .. } => Some(content_id),
            ProcessingError::Batch { .. } => None,
        }
    }
}

/// Trait for content processors
#[async_trait]
pub trait Processor: Send + Sync {
    /// Purpose identifier, also the metadata namespace (e.g. "keyword-tagger")
    fn name(&self) -> &str;

    /// Transform a batch.
    ///
    /// Returns at most as many items as it was given. Implementations that
    /// drop items document when they do.
    async fn process_content(
        &self,
        items: Vec<ContentItem>,
    ) -> Result<Vec<ContentItem>, ProcessingError>;

    /// Transform one item.
    ///
    /// When the processor returns nothing for it, the original item comes
    /// back unchanged (and a warning is logged).
    async fn process_single(&self, item: ContentItem) -> Result<ContentItem, ProcessingError> {
        let original = item.clone();
        let mut processed = self.process_content(vec![item]).await?;

        if processed.is_empty() {
            warn!(
                processor = self.name(),
                content_id = %original.id,
                "Processor returned no item, keeping original"
            );
            return Ok(original);
        }

        Ok(processed.swap_remove(0))
    }
}
