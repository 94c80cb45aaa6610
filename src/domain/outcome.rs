//! Outcome records reported alongside a batch of content.
//!
//! Failures are reported per URL or per item so one bad source never hides
//! the results of its siblings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::content::{ContentId, ContentItem};
use crate::core::pipeline::EXTRACTOR_META;
use crate::processors::{category, keywords, summary};

/// Processing status of an item or of one processor run on an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStatus {
    Pending,
    Processing,
    Done,
    Error,
}

impl Default for ProcessingStatus {
    fn default() -> Self {
        Self::Pending
    }
}

/// Outcome of one processor applied to one item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingResult {
    pub content_id: ContentId,
    pub processor: String,
    pub status: ProcessingStatus,
    #[serde(default)]
    pub result: Map<String, Value>,
    pub error_message: Option<String>,
    pub processed_at: DateTime<Utc>,
}

impl ProcessingResult {
    /// A successful outcome
    pub fn done(content_id: ContentId, processor: impl Into<String>) -> Self {
        Self {
            content_id,
            processor: processor.into(),
            status: ProcessingStatus::Done,
            result: Map::new(),
            error_message: None,
            processed_at: Utc::now(),
        }
    }

    /// A failed outcome
    pub fn error(
        content_id: ContentId,
        processor: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            content_id,
            processor: processor.into(),
            status: ProcessingStatus::Error,
            result: Map::new(),
            error_message: Some(message.into()),
            processed_at: Utc::now(),
        }
    }

    /// Attach a result entry
    pub fn with_result(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.result.insert(key.into(), value.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.status == ProcessingStatus::Error
    }
}

/// A URL that produced no content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionFailure {
    pub url: String,
    /// Extractor that attempted the URL, `None` when no extractor claimed it
    pub extractor: Option<String>,
    pub message: String,
}

/// Error descriptor handed back to callers: which URL or item failed and why
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum FailureRecord {
    Extraction { url: String, message: String },
    Processing { content_id: ContentId, processor: String, message: String },
}

/// A content item decorated with extraction and processing details
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedContent {
    pub content: ContentItem,
    pub extracted_at: DateTime<Utc>,
    pub extractor_used: String,
    #[serde(default)]
    pub processing_status: ProcessingStatus,
    #[serde(default)]
    pub ai_summary: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ExtractedContent {
    /// Wrap a freshly extracted item
    pub fn new(content: ContentItem, extractor_used: impl Into<String>) -> Self {
        Self {
            content,
            extracted_at: Utc::now(),
            extractor_used: extractor_used.into(),
            processing_status: ProcessingStatus::Pending,
            ai_summary: String::new(),
            categories: Vec::new(),
            tags: Vec::new(),
        }
    }

    /// Build the decorated view of an item that went through the pipeline.
    ///
    /// Reads the extractor stamp and the summary, category and keyword
    /// annotations left by the built-in processors. `failed` marks items
    /// that had at least one processor error.
    pub fn from_processed(content: ContentItem, failed: bool) -> Self {
        let extractor_used = content
            .metadata
            .get(EXTRACTOR_META)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let ai_summary = content
            .meta(summary::NAME, summary::SUMMARY_KEY)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let categories = string_list(content.meta(category::NAME, category::CATEGORIES_KEY));
        let tags = string_list(content.meta(keywords::NAME, keywords::KEYWORDS_KEY));

        Self {
            processing_status: if failed {
                ProcessingStatus::Error
            } else {
                ProcessingStatus::Done
            },
            ai_summary,
            categories,
            tags,
            ..Self::new(content, extractor_used)
        }
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|values| {
            values
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
