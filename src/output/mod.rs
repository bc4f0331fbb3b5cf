// src/output/mod.rs
//! Output handling for discovered domains
//!
//! Accepted domains are emitted as they arrive; the run does not buffer
//! results for the writers. Handlers are fan-out: one failing handler is
//! logged and does not stop the others.

use crate::types::Discovery;
use async_trait::async_trait;
use std::sync::Arc;

pub mod csv;
pub mod human;
pub mod json;
pub mod silent;

/// Trait for handlers that receive each accepted domain
#[async_trait]
pub trait OutputHandler: Send + Sync {
    /// Emit one accepted domain
    async fn emit(&self, discovery: &Discovery) -> anyhow::Result<()>;

    /// Flush any buffered output
    async fn flush(&self) -> anyhow::Result<()>;
}

/// Manager that dispatches discoveries to multiple handlers
pub struct OutputManager {
    handlers: Vec<Arc<dyn OutputHandler>>,
}

impl OutputManager {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    pub fn add_handler(&mut self, handler: Arc<dyn OutputHandler>) {
        self.handlers.push(handler);
    }

    /// Emit a discovery to all handlers.
    ///
    /// Individual handler errors are logged but don't stop processing; an
    /// error is returned only when the sole handler failed.
    pub async fn emit(&self, discovery: &Discovery) -> anyhow::Result<()> {
        let mut last_error = None;

        for handler in &self.handlers {
            if let Err(e) = handler.emit(discovery).await {
                tracing::warn!("Output handler error: {}", e);
                last_error = Some(e);
            }
        }

        if let Some(err) = last_error {
            if self.handlers.len() == 1 {
                return Err(err);
            }
        }

        Ok(())
    }

    /// Flush all handlers
    pub async fn flush(&self) -> anyhow::Result<()> {
        for handler in &self.handlers {
            handler.flush().await?;
        }
        Ok(())
    }
}

impl Default for OutputManager {
    fn default() -> Self {
        Self::new()
    }
}
