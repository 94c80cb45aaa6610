//! rhythm - Pluggable content extraction and enrichment pipeline
//!
//! Turns URLs (tweets, YouTube videos, web articles) into normalized
//! content items, then runs them through a chain of processors that
//! annotate them with keywords, reading time, emotions, categories and
//! summaries.
//!
//! # Architecture
//!
//! - Extractors claim URLs and fetch them concurrently; one failing URL
//!   never hides the results of the others
//! - Processors transform whole batches, falling back to one item at a
//!   time when a batch fails
//! - Annotations are namespaced in item metadata as `"{producer}.{key}"`
//!
//! # Modules
//!
//! - `adapters`: External enrichment backends (Fabric)
//! - `core`: Pipeline driver, definitions and limits
//! - `domain`: Data structures (ContentItem, ProcessingResult, Domain)
//! - `extractors`: URL extractors and the shared HTTP client
//! - `processors`: Built-in processors
//! - `text`: Text utilities used by the processors
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Extract and enrich URLs with the default pipeline
//! rhythm extract https://youtu.be/dQw4w9WgXcQ https://example.com/post
//!
//! # Analyze text from stdin
//! echo "some text" | rhythm analyze
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod extractors;
pub mod processors;
pub mod text;

// Re-export main types at crate root for convenience
pub use core::{ExtractionLimits, Pipeline, PipelineDefinition, PipelineOutput};
pub use domain::{ContentId, ContentItem, ContentType, Domain, ExtractedContent, ProcessingResult};
pub use extractors::{Extractor, ExtractionError};
pub use processors::{ProcessingError, Processor};
