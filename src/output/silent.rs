// src/output/silent.rs
//! Silent output handler - produces no output

use crate::output::OutputHandler;
use crate::types::Discovery;
use async_trait::async_trait;

/// Silent output handler that produces no output
///
/// Used when --silent is set (file-output-only mode)
pub struct SilentOutput;

#[async_trait]
impl OutputHandler for SilentOutput {
    async fn emit(&self, _discovery: &Discovery) -> anyhow::Result<()> {
        // Intentionally do nothing
        Ok(())
    }

    async fn flush(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_silent_output() {
        let handler = SilentOutput;
        let discovery = Discovery::new("test.com".to_string(), Some(200));

        assert!(handler.emit(&discovery).await.is_ok());
        assert!(handler.flush().await.is_ok());
    }
}
