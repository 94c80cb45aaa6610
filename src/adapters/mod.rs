//! Enrichment backends.
//!
//! Adapters run a named action (e.g. a Fabric pattern) over text and return
//! the generated text. Processors such as the summary generator use them
//! for anything beyond local heuristics.

pub mod fabric;

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

pub use fabric::FabricAdapter;

/// Trait for external enrichment backends
#[async_trait]
pub trait Adapter: Send + Sync {
    /// Human-readable adapter name
    fn name(&self) -> &str;

    /// Run `action` over `input`, giving up after `timeout`
    async fn execute(&self, action: &str, input: &str, timeout: Duration) -> Result<String>;
}
