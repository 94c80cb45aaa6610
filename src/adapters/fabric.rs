//! Fabric adapter.
//!
//! Runs Fabric patterns through the `fabric` CLI: the input is piped to
//! stdin of `fabric -p <pattern>` and stdout is the result.

use std::process::Stdio;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use super::Adapter;

/// Default binary name
pub const DEFAULT_BINARY: &str = "fabric";

/// Fabric adapter using subprocess mode
#[derive(Debug, Clone)]
pub struct FabricAdapter {
    binary_path: String,
}

impl Default for FabricAdapter {
    fn default() -> Self {
        Self::new(DEFAULT_BINARY)
    }
}

impl FabricAdapter {
    pub fn new(binary_path: impl Into<String>) -> Self {
        Self {
            binary_path: binary_path.into(),
        }
    }

    pub fn binary_path(&self) -> &str {
        &self.binary_path
    }
}

#[async_trait]
impl Adapter for FabricAdapter {
    fn name(&self) -> &str {
        "fabric"
    }

    async fn execute(&self, pattern: &str, input: &str, timeout: Duration) -> Result<String> {
        debug!(binary = %self.binary_path, pattern, "Running fabric pattern");

        let mut child = Command::new(&self.binary_path)
            .args(["-p", pattern])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to spawn '{}' for pattern '{}'", self.binary_path, pattern))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(input.as_bytes())
                .await
                .context("Failed to write to fabric stdin")?;
            // stdin dropped here, signalling EOF
        }

        let output = tokio::time::timeout(timeout, child.wait_with_output())
            .await
            .with_context(|| format!("Fabric pattern '{}' timed out after {:?}", pattern, timeout))?
            .with_context(|| format!("Failed to wait for fabric pattern '{}'", pattern))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!(
                "Fabric pattern '{}' failed with exit code {}: {}",
                pattern,
                output.status.code().unwrap_or(-1),
                stderr.trim()
            );
        }

        String::from_utf8(output.stdout).context("Fabric output is not valid UTF-8")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_binary() {
        let adapter = FabricAdapter::default();
        assert_eq!(adapter.name(), "fabric");
        assert_eq!(adapter.binary_path(), "fabric");
    }

    #[tokio::test]
    async fn test_missing_binary_is_error() {
        let adapter = FabricAdapter::new("/nonexistent/fabric-binary");
        let err = adapter
            .execute("summarize", "text", Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to spawn"));
    }
}
