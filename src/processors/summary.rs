//! Summaries generated through an external adapter.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::{ProcessingError, Processor};
use crate::adapters::{Adapter, FabricAdapter};
use crate::domain::{ContentId, ContentItem};
use crate::text::{clean_text, word_count};

pub const NAME: &str = "summary-generator";
pub const SUMMARY_KEY: &str = "summary";

pub const DEFAULT_PATTERN: &str = "summarize";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 60;

/// Items with fewer words than this are their own summary
pub const DEFAULT_MIN_WORDS: usize = 40;

/// Summarizes each item by running a pattern through an [`Adapter`].
///
/// Short items skip the adapter entirely and use their cleaned text.
/// Any adapter failure fails the whole batch with the first item error,
/// so the pipeline retries items one by one. Summaries already produced
/// for the failed batch are held back and reused by that retry, so only
/// the failing items reach the adapter again.
pub struct SummaryGenerator {
    adapter: Box<dyn Adapter>,
    pattern: String,
    timeout: Duration,
    min_words: usize,
    completed: Mutex<HashMap<ContentId, String>>,
}

impl Default for SummaryGenerator {
    fn default() -> Self {
        Self::new(Box::new(FabricAdapter::default()))
    }
}

impl SummaryGenerator {
    pub fn new(adapter: Box<dyn Adapter>) -> Self {
        Self {
            adapter,
            pattern: DEFAULT_PATTERN.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
            min_words: DEFAULT_MIN_WORDS,
            completed: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = pattern.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_min_words(mut self, min_words: usize) -> Self {
        self.min_words = min_words;
        self
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    fn completed(&self) -> MutexGuard<'_, HashMap<ContentId, String>> {
        self.completed.lock().unwrap_or_else(|e| e.into_inner())
    }

    async fn summarize(&self, item: &ContentItem) -> Result<String, ProcessingError> {
        let cached = self.completed().remove(&item.id);
        if let Some(summary) = cached {
            debug!(content_id = %item.id, "Reusing summary from failed batch");
            return Ok(summary);
        }

        let text = clean_text(&item.text());
        if word_count(&text) < self.min_words {
            debug!(content_id = %item.id, "Short item, using text as summary");
            return Ok(text);
        }

        // Give the adapter its own budget, then cap it from the outside as well
        match tokio::time::timeout(
            self.timeout,
            self.adapter.execute(&self.pattern, &text, self.timeout),
        )
        .await
        {
            Ok(Ok(summary)) => Ok(summary.trim().to_string()),
            Ok(Err(e)) => {
                warn!(
                    content_id = %item.id,
                    adapter = self.adapter.name(),
                    error = %e,
                    "Summary adapter failed"
                );
                Err(ProcessingError::Item {
                    processor: NAME.to_string(),
                    content_id: item.id.clone(),
                    reason: format!("{:#}", e),
                })
            }
            Err(_) => Err(ProcessingError::Timeout {
                processor: NAME.to_string(),
                content_id: item.id.clone(),
                seconds: self.timeout.as_secs(),
            }),
        }
    }
}

#[async_trait]
impl Processor for SummaryGenerator {
    fn name(&self) -> &str {
        NAME
    }

    async fn process_content(
        &self,
        items: Vec<ContentItem>,
    ) -> Result<Vec<ContentItem>, ProcessingError> {
        let batched = items.len() > 1;
        let mut first_error = None;
        let mut out = Vec::with_capacity(items.len());

        for mut item in items {
            match self.summarize(&item).await {
                Ok(summary) => {
                    item.set_meta(NAME, SUMMARY_KEY, summary);
                    out.push(item);
                }
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        }

        let Some(err) = first_error else {
            return Ok(out);
        };

        if batched {
            let mut completed = self.completed();
            for item in out {
                if let Some(summary) = item
                    .meta(NAME, SUMMARY_KEY)
                    .and_then(|v| v.as_str())
                {
                    completed.insert(item.id.clone(), summary.to_string());
                }
            }
        }
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ContentType;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct StubAdapter {
        calls: Arc<AtomicUsize>,
        fail_on: Option<&'static str>,
        delay: Duration,
    }

    impl StubAdapter {
        fn ok(calls: Arc<AtomicUsize>) -> Self {
            Self {
                calls,
                fail_on: None,
                delay: Duration::ZERO,
            }
        }
    }

    #[async_trait]
    impl Adapter for StubAdapter {
        fn name(&self) -> &str {
            "stub"
        }

        async fn execute(&self, action: &str, input: &str, _timeout: Duration) -> anyhow::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if let Some(marker) = self.fail_on {
                if input.contains(marker) {
                    anyhow::bail!("backend rejected input");
                }
            }
            Ok(format!("  {}: {} words\n", action, word_count(input)))
        }
    }

    fn long_item(marker: &str) -> ContentItem {
        let body = std::iter::repeat("word").take(50).collect::<Vec<_>>().join(" ");
        let url = format!("https://example.com/{}", marker.to_lowercase());
        ContentItem::new(&url, ContentType::Article, marker)
            .unwrap()
            .with_description(body)
    }

    #[tokio::test]
    async fn test_short_item_skips_adapter() {
        let calls = Arc::new(AtomicUsize::new(0));
        let generator = SummaryGenerator::new(Box::new(StubAdapter::ok(calls.clone())));

        let item = ContentItem::new("https://example.com/a", ContentType::Tweet, "Short  tweet")
            .unwrap();
        let out = generator.process_single(item).await.unwrap();

        assert_eq!(out.meta(NAME, SUMMARY_KEY), Some(&serde_json::json!("Short tweet")));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_long_item_uses_adapter_output() {
        let calls = Arc::new(AtomicUsize::new(0));
        let generator = SummaryGenerator::new(Box::new(StubAdapter::ok(calls.clone())))
            .with_pattern("extract_wisdom");

        let out = generator.process_single(long_item("Title")).await.unwrap();

        assert_eq!(
            out.meta(NAME, SUMMARY_KEY),
            Some(&serde_json::json!("extract_wisdom: 51 words"))
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_adapter_error_names_item() {
        let calls = Arc::new(AtomicUsize::new(0));
        let generator = SummaryGenerator::new(Box::new(StubAdapter {
            calls,
            fail_on: Some("Broken"),
            delay: Duration::ZERO,
        }));

        let item = long_item("Broken");
        let id = item.id.clone();
        let err = generator.process_single(item).await.unwrap_err();

        assert_eq!(err.content_id(), Some(&id));
        assert!(matches!(err, ProcessingError::Item { .. }));
        assert!(err.to_string().contains("backend rejected input"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_adapter_times_out() {
        let calls = Arc::new(AtomicUsize::new(0));
        let generator = SummaryGenerator::new(Box::new(StubAdapter {
            calls,
            fail_on: None,
            delay: Duration::from_secs(30),
        }))
        .with_timeout(Duration::from_secs(2));

        let err = generator.process_single(long_item("Slow")).await.unwrap_err();
        assert!(matches!(err, ProcessingError::Timeout { seconds: 2, .. }));
    }

    #[tokio::test]
    async fn test_item_retry_reuses_batch_summaries() {
        let calls = Arc::new(AtomicUsize::new(0));
        let generator = SummaryGenerator::new(Box::new(StubAdapter {
            calls: calls.clone(),
            fail_on: Some("Broken"),
            delay: Duration::ZERO,
        }));

        let items = vec![long_item("First"), long_item("Broken"), long_item("Last")];
        let err = generator.process_content(items.clone()).await.unwrap_err();
        assert_eq!(err.content_id(), Some(&items[1].id));
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        let first = generator.process_single(items[0].clone()).await.unwrap();
        assert!(generator.process_single(items[1].clone()).await.is_err());
        let last = generator.process_single(items[2].clone()).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(
            first.meta(NAME, SUMMARY_KEY),
            Some(&serde_json::json!("summarize: 51 words"))
        );
        assert!(last.meta(NAME, SUMMARY_KEY).is_some());
    }
}
