//! Pipeline driver.
//!
//! Routes each URL to the first extractor that claims it, runs the
//! extractors concurrently, then feeds the combined batch through the
//! processors in order. Failures are collected per URL and per item; a run
//! only fails as a whole when its URL list breaks the limits.

use std::collections::HashSet;
use std::time::Instant;

use futures::future::join_all;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use super::definition::PipelineDefinition;
use super::limits::{ExtractionLimits, LimitViolation};
use crate::config::ProcessingSettings;
use crate::domain::{
    ContentId, ContentItem, Domain, ExtractedContent, ExtractionFailure, FailureRecord,
    ProcessingResult,
};
use crate::extractors::{extract_batch, ExtractionError, Extractor};
use crate::processors::Processor;

/// Metadata key recording which extractor produced an item
pub const EXTRACTOR_META: &str = "pipeline.extractor";

/// Extractors, processors and the limits they run under
pub struct Pipeline {
    extractors: Vec<Box<dyn Extractor>>,
    processors: Vec<Box<dyn Processor>>,
    limits: ExtractionLimits,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(ExtractionLimits::default())
    }
}

impl Pipeline {
    /// An empty pipeline
    pub fn new(limits: ExtractionLimits) -> Self {
        Self {
            extractors: Vec::new(),
            processors: Vec::new(),
            limits,
        }
    }

    /// Build the pipeline a definition describes, using `extractors` for routing
    pub fn from_definition(
        definition: &PipelineDefinition,
        extractors: Vec<Box<dyn Extractor>>,
        settings: &ProcessingSettings,
        domain: Domain,
    ) -> Self {
        Self::new(definition.limits.clone())
            .with_extractors(extractors)
            .with_processors(definition.build_processors(settings, domain))
    }

    /// Register an extractor. Earlier registrations win routing ties.
    pub fn with_extractor(mut self, extractor: Box<dyn Extractor>) -> Self {
        self.extractors.push(extractor);
        self
    }

    pub fn with_extractors(mut self, extractors: Vec<Box<dyn Extractor>>) -> Self {
        self.extractors.extend(extractors);
        self
    }

    /// Append a processor to the chain
    pub fn with_processor(mut self, processor: Box<dyn Processor>) -> Self {
        self.processors.push(processor);
        self
    }

    pub fn with_processors(mut self, processors: Vec<Box<dyn Processor>>) -> Self {
        self.processors.extend(processors);
        self
    }

    pub fn limits(&self) -> &ExtractionLimits {
        &self.limits
    }

    /// Names of the registered extractors, in routing order
    pub fn extractor_names(&self) -> Vec<&str> {
        self.extractors.iter().map(|e| e.name()).collect()
    }

    /// Names of the processors, in application order
    pub fn processor_names(&self) -> Vec<&str> {
        self.processors.iter().map(|p| p.name()).collect()
    }

    /// Extract and process `urls`.
    ///
    /// Items come back grouped by extractor (registration order), each group
    /// in input URL order.
    #[instrument(skip(self, urls), fields(urls = urls.len()))]
    pub async fn run(&self, urls: &[String]) -> Result<PipelineOutput, LimitViolation> {
        self.limits.validate_urls(urls)?;

        let run_id = Uuid::new_v4();
        let started = Instant::now();
        info!(%run_id, "Starting pipeline run");

        let (routed, mut extraction_failures) = self.route(urls);

        let batches = join_all(
            self.extractors
                .iter()
                .zip(routed.iter())
                .filter(|(_, urls)| !urls.is_empty())
                .map(|(extractor, urls)| async move {
                    let batch = extract_batch(extractor.as_ref(), urls, &self.limits).await;
                    (extractor.name(), batch)
                }),
        )
        .await;

        let mut items = Vec::new();
        for (name, batch) in batches {
            items.extend(batch.items.into_iter().map(|mut item| {
                item.metadata
                    .insert(EXTRACTOR_META.to_string(), Value::from(name));
                item
            }));
            extraction_failures.extend(batch.failures);
        }

        let mut processing_results = Vec::new();
        for processor in &self.processors {
            items = apply_processor(processor.as_ref(), items, &mut processing_results).await;
        }

        info!(
            %run_id,
            items = items.len(),
            extraction_failures = extraction_failures.len(),
            processing_errors = processing_results.iter().filter(|r| r.is_error()).count(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Pipeline run completed"
        );

        Ok(PipelineOutput {
            run_id,
            items,
            extraction_failures,
            processing_results,
        })
    }

    /// Split `urls` per extractor; blank, denylisted and unclaimed URLs become failures
    fn route(&self, urls: &[String]) -> (Vec<Vec<String>>, Vec<ExtractionFailure>) {
        let mut routed = vec![Vec::new(); self.extractors.len()];
        let mut failures = Vec::new();

        for url in urls {
            if url.trim().is_empty() {
                let err = ExtractionError::EmptyUrl { url: url.clone() };
                warn!("Skipping empty URL");
                failures.push(ExtractionFailure {
                    url: url.clone(),
                    extractor: None,
                    message: err.to_string(),
                });
                continue;
            }

            if self.limits.is_denylisted(url) {
                let err = ExtractionError::Denylisted { url: url.clone() };
                warn!(%url, "Skipping denylisted URL");
                failures.push(ExtractionFailure {
                    url: url.clone(),
                    extractor: None,
                    message: err.to_string(),
                });
                continue;
            }

            match self.extractors.iter().position(|e| e.can_extract(url)) {
                Some(idx) => {
                    debug!(%url, extractor = self.extractors[idx].name(), "Routed");
                    routed[idx].push(url.clone());
                }
                None => {
                    let err = ExtractionError::Unsupported { url: url.clone() };
                    warn!(%url, "No extractor claims URL");
                    failures.push(ExtractionFailure {
                        url: url.clone(),
                        extractor: None,
                        message: err.to_string(),
                    });
                }
            }
        }

        (routed, failures)
    }
}

/// Run one processor over the batch.
///
/// A failed batch call is retried item by item; an item that still fails
/// is kept unchanged and recorded as an error. Items a processor filters
/// out are recorded as done with `dropped: true`.
async fn apply_processor(
    processor: &dyn Processor,
    items: Vec<ContentItem>,
    results: &mut Vec<ProcessingResult>,
) -> Vec<ContentItem> {
    if items.is_empty() {
        return items;
    }

    let name = processor.name();
    let input_ids: Vec<ContentId> = items.iter().map(|item| item.id.clone()).collect();

    match processor.process_content(items.clone()).await {
        Ok(processed) => {
            debug!(processor = name, count = processed.len(), "Processed batch");
            results.extend(
                processed
                    .iter()
                    .map(|item| ProcessingResult::done(item.id.clone(), name)),
            );

            let kept: HashSet<&ContentId> = processed.iter().map(|item| &item.id).collect();
            for id in input_ids.iter().filter(|id| !kept.contains(id)) {
                warn!(processor = name, content_id = %id, "Processor dropped item");
                results.push(ProcessingResult::done(id.clone(), name).with_result("dropped", true));
            }
            processed
        }
        Err(e) => {
            warn!(processor = name, error = %e, "Batch failed, processing items one by one");

            let mut out = Vec::with_capacity(items.len());
            for item in items {
                match processor.process_single(item.clone()).await {
                    Ok(processed) => {
                        results.push(ProcessingResult::done(processed.id.clone(), name));
                        out.push(processed);
                    }
                    Err(e) => {
                        error!(processor = name, content_id = %item.id, error = %e, "Failed to process item");
                        results.push(ProcessingResult::error(item.id.clone(), name, e.to_string()));
                        out.push(item);
                    }
                }
            }
            out
        }
    }
}

/// Everything a pipeline run produced
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutput {
    pub run_id: Uuid,
    pub items: Vec<ContentItem>,
    pub extraction_failures: Vec<ExtractionFailure>,
    pub processing_results: Vec<ProcessingResult>,
}

impl PipelineOutput {
    /// Every failure of the run: URLs first, then processor errors
    pub fn failures(&self) -> Vec<FailureRecord> {
        let extraction = self
            .extraction_failures
            .iter()
            .map(|f| FailureRecord::Extraction {
                url: f.url.clone(),
                message: f.message.clone(),
            });

        let processing = self
            .processing_results
            .iter()
            .filter(|r| r.is_error())
            .map(|r| FailureRecord::Processing {
                content_id: r.content_id.clone(),
                processor: r.processor.clone(),
                message: r.error_message.clone().unwrap_or_default(),
            });

        extraction.chain(processing).collect()
    }

    /// No item was produced although some URLs failed
    pub fn is_total_failure(&self) -> bool {
        self.items.is_empty() && !self.extraction_failures.is_empty()
    }

    /// Decorated view of the items, marking those with processor errors
    pub fn into_extracted(self) -> Vec<ExtractedContent> {
        let failed: HashSet<_> = self
            .processing_results
            .iter()
            .filter(|r| r.is_error())
            .map(|r| r.content_id.clone())
            .collect();

        self.items
            .into_iter()
            .map(|item| {
                let has_error = failed.contains(&item.id);
                ExtractedContent::from_processed(item, has_error)
            })
            .collect()
    }
}
