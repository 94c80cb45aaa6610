//! Pipeline definitions and loading.
//!
//! Pipelines are defined in YAML: extraction limits plus an ordered list of
//! processors, each tagged by `kind` with its options.
//!
//! ```yaml
//! name: digest
//! description: Tag and summarize links
//! limits:
//!   timeout_seconds: 15
//! processors:
//!   - kind: keyword_tagger
//!     max_keywords: 5
//!   - kind: reading_time
//!   - kind: summary_generator
//!     pattern: summarize
//! ```

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::limits::ExtractionLimits;
use crate::adapters::FabricAdapter;
use crate::config::ProcessingSettings;
use crate::domain::Domain;
use crate::processors::summary::DEFAULT_TIMEOUT_SECONDS;
use crate::processors::{
    CategoryTagger, KeywordTagger, Processor, ReadingTimeEstimator, SentimentTagger,
    SummaryGenerator,
};

/// A complete pipeline definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineDefinition {
    /// Pipeline name (used in CLI)
    pub name: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Extraction limits for this pipeline
    #[serde(default)]
    pub limits: ExtractionLimits,

    /// Processors applied in order
    pub processors: Vec<ProcessorSpec>,
}

/// One processor entry of a pipeline definition.
///
/// Options left out fall back to the configured [`ProcessingSettings`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProcessorSpec {
    KeywordTagger {
        #[serde(default)]
        max_keywords: Option<usize>,
    },
    ReadingTime {
        #[serde(default)]
        words_per_minute: Option<usize>,
    },
    SentimentTagger,
    CategoryTagger {
        /// Overrides the configured domain
        #[serde(default)]
        domain: Option<Domain>,
    },
    SummaryGenerator {
        #[serde(default)]
        pattern: Option<String>,
        #[serde(default)]
        timeout_seconds: Option<u64>,
    },
}

impl ProcessorSpec {
    /// Instantiate the processor
    pub fn build(&self, settings: &ProcessingSettings, domain: Domain) -> Box<dyn Processor> {
        match self {
            ProcessorSpec::KeywordTagger { max_keywords } => Box::new(KeywordTagger::new(
                max_keywords.unwrap_or(settings.max_keywords),
            )),
            ProcessorSpec::ReadingTime { words_per_minute } => Box::new(
                ReadingTimeEstimator::new(words_per_minute.unwrap_or(settings.words_per_minute)),
            ),
            ProcessorSpec::SentimentTagger => Box::new(SentimentTagger),
            ProcessorSpec::CategoryTagger { domain: overridden } => {
                Box::new(CategoryTagger::new(overridden.unwrap_or(domain)))
            }
            ProcessorSpec::SummaryGenerator {
                pattern,
                timeout_seconds,
            } => {
                let adapter = FabricAdapter::new(settings.fabric_binary.clone());
                let pattern = pattern
                    .clone()
                    .unwrap_or_else(|| settings.summary_pattern.clone());
                let timeout =
                    Duration::from_secs(timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS));

                Box::new(
                    SummaryGenerator::new(Box::new(adapter))
                        .with_pattern(pattern)
                        .with_timeout(timeout),
                )
            }
        }
    }
}

impl PipelineDefinition {
    /// Load a pipeline from a YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read pipeline file: {}", path.display()))?;

        Self::from_yaml(&content)
    }

    /// Parse a pipeline from YAML content
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context("Failed to parse pipeline YAML")
    }

    /// The built-in pipeline: every local processor, no summaries
    pub fn builtin(limits: ExtractionLimits) -> Self {
        Self {
            name: "default".to_string(),
            description: "Keywords, reading time, sentiment and categories".to_string(),
            limits,
            processors: vec![
                ProcessorSpec::KeywordTagger { max_keywords: None },
                ProcessorSpec::ReadingTime {
                    words_per_minute: None,
                },
                ProcessorSpec::SentimentTagger,
                ProcessorSpec::CategoryTagger { domain: None },
            ],
        }
    }

    /// Validate the pipeline definition
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            anyhow::bail!("Pipeline name cannot be empty");
        }

        if self.processors.is_empty() {
            anyhow::bail!("Pipeline '{}' must have at least one processor", self.name);
        }

        if self.limits.max_urls == 0 {
            anyhow::bail!("Pipeline '{}' must accept at least one URL", self.name);
        }

        for pattern in &self.limits.denylist_patterns {
            glob::Pattern::new(pattern)
                .with_context(|| format!("Invalid denylist pattern: {}", pattern))?;
        }

        Ok(())
    }

    /// Instantiate the processors, in order
    pub fn build_processors(
        &self,
        settings: &ProcessingSettings,
        domain: Domain,
    ) -> Vec<Box<dyn Processor>> {
        self.processors
            .iter()
            .map(|spec| spec.build(settings, domain))
            .collect()
    }
}
