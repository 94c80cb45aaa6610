//! Core pipeline logic.
//!
//! This module contains:
//! - Limits: Per-run extraction limits and retry policy
//! - Definition: YAML pipeline definitions
//! - Pipeline: The extraction and processing driver

pub mod definition;
pub mod limits;
pub mod pipeline;

// Re-export commonly used types
pub use definition::{PipelineDefinition, ProcessorSpec};
pub use limits::{ExtractionLimits, LimitViolation, RetryPolicy};
pub use pipeline::{Pipeline, PipelineOutput, EXTRACTOR_META};
