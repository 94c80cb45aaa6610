//! Domain types for rhythm.
//!
//! This module contains the core data structures:
//! - Content: Normalized content items and their identifiers
//! - Outcome: Processing results and failure records
//! - Profile: Domain profiles and their categories

pub mod content;
pub mod outcome;
pub mod profile;

// Re-export commonly used types
pub use content::{ContentId, ContentItem, ContentType, ModelError};
pub use outcome::{
    ExtractedContent, ExtractionFailure, FailureRecord, ProcessingResult, ProcessingStatus,
};
pub use profile::{Category, Domain};
