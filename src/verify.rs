// src/verify.rs
//! Liveness verification
//!
//! A bounded pool of concurrent HTTP(S) probes. Probes never raise: every
//! network error, timeout, or unexpected status folds into
//! `reachable = false`. Certificate validation is deliberately disabled so
//! self-signed and misconfigured hosts still count as reachable.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch, Semaphore};
use tracing::{debug, trace};

/// Result of probing one domain. Ephemeral; never persisted.
#[derive(Debug, Clone)]
pub struct ProbeOutcome {
    pub domain: String,
    pub reachable: bool,
    pub status: Option<u16>,
    pub checked_at: u64,
}

impl ProbeOutcome {
    pub fn new(domain: String, reachable: bool, status: Option<u16>) -> Self {
        Self {
            domain,
            reachable,
            status,
            checked_at: chrono::Utc::now().timestamp() as u64,
        }
    }
}

/// Probes one domain for liveness
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, domain: &str) -> ProbeOutcome;
}

/// Real HTTP(S) prober. Tries HTTPS first, then plain HTTP.
pub struct HttpProber {
    http_client: reqwest::Client,
}

impl HttpProber {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("webwhisper/", env!("CARGO_PKG_VERSION")))
            // Invalid, expired, or self-signed certificates must not fail
            // the probe; liveness is about answering at all
            .danger_accept_invalid_certs(true)
            .build()
            .context("Failed to build probe HTTP client")?;

        Ok(Self { http_client })
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, domain: &str) -> ProbeOutcome {
        for scheme in ["https", "http"] {
            let url = format!("{}://{}/", scheme, domain);

            match self.http_client.get(&url).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        trace!("{} reachable via {} ({})", domain, scheme, status);
                        return ProbeOutcome::new(
                            domain.to_string(),
                            true,
                            Some(status.as_u16()),
                        );
                    }
                    // Non-2xx: fall through to the next scheme
                }
                Err(e) => {
                    trace!("{} probe via {} failed: {}", domain, scheme, e);
                }
            }
        }

        // Unreachable outcomes carry no status; liveness is a boolean gate
        ProbeOutcome::new(domain.to_string(), false, None)
    }
}

/// Pass-through prober for runs with verification disabled: every domain is
/// assumed live, no network call is made
pub struct AssumeLive;

#[async_trait]
impl Prober for AssumeLive {
    async fn probe(&self, domain: &str) -> ProbeOutcome {
        ProbeOutcome::new(domain.to_string(), true, None)
    }
}

/// Bounded pool of concurrent probes.
///
/// `submit` acquires a permit before spawning, so submission beyond the
/// worker capacity queues instead of growing unbounded. Outcomes arrive on
/// the receiver handed out by `new`, in completion order. `shutdown` makes
/// in-flight probes abandon their network call and drop their result.
pub struct VerifierPool {
    prober: Arc<dyn Prober>,
    permits: Arc<Semaphore>,
    outcome_tx: Option<mpsc::Sender<ProbeOutcome>>,
    shutdown_tx: watch::Sender<bool>,
}

impl VerifierPool {
    /// Create a pool with `workers` concurrent probe slots. Returns the pool
    /// and the channel on which outcomes are delivered.
    pub fn new(prober: Arc<dyn Prober>, workers: usize) -> (Self, mpsc::Receiver<ProbeOutcome>) {
        let (outcome_tx, outcome_rx) = mpsc::channel(1024);
        let (shutdown_tx, _) = watch::channel(false);

        let pool = Self {
            prober,
            permits: Arc::new(Semaphore::new(workers.max(1))),
            outcome_tx: Some(outcome_tx),
            shutdown_tx,
        };

        (pool, outcome_rx)
    }

    /// Submit one domain for probing. Waits when all workers are busy.
    pub async fn submit(&self, domain: String) -> Result<()> {
        let outcome_tx = self
            .outcome_tx
            .as_ref()
            .context("Verifier pool already closed")?
            .clone();

        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .context("Verifier pool semaphore closed")?;

        let prober = Arc::clone(&self.prober);
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            if *shutdown_rx.borrow() {
                return;
            }

            let outcome = tokio::select! {
                outcome = prober.probe(&domain) => outcome,
                _ = shutdown_rx.wait_for(|stop| *stop) => {
                    debug!("Probe of {} abandoned by shutdown", domain);
                    return;
                }
            };

            drop(permit);
            // Receiver gone means the run is over; nothing to report
            let _ = outcome_tx.send(outcome).await;
        });

        Ok(())
    }

    /// Stop accepting submissions. Once the last in-flight probe finishes,
    /// the outcome channel closes and the receiver sees `None`.
    pub fn close(&mut self) {
        self.outcome_tx = None;
    }

    /// Tell every in-flight probe to abandon its work
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }
}
