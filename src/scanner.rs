// src/scanner.rs
//! Scan orchestration
//!
//! Drives one run end to end: pull raw candidates per TLD (sequentially,
//! with a pacing delay between queries), normalize, gate through the seen
//! store, fan survivors out to the verifier pool, and collect reachable
//! outcomes until the target count is reached or every source is exhausted.
//!
//! Acceptance order is probe completion order, so it is not deterministic
//! across runs even for identical inputs.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;
use tracing::{debug, info, warn};

use crate::crtsh::CandidateSource;
use crate::normalize::normalize;
use crate::output::OutputManager;
use crate::progress::ProgressIndicator;
use crate::stats::StatsCollector;
use crate::store::{Admission, SeenStore};
use crate::types::{Discovery, ScanOutcome, ScanReport};
use crate::verify::{ProbeOutcome, Prober, VerifierPool};

/// Head-room multiplier for cache-only sampling when probing is on: a
/// sampled domain may have gone dark since it was recorded
const CACHE_SAMPLE_MULTIPLIER: usize = 3;

/// Knobs for one scan run
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Target number of accepted domains (N)
    pub count: usize,
    /// Ordered TLD list to query
    pub tlds: Vec<String>,
    /// Pacing delay between successive TLD queries (not before the first)
    pub fetch_delay: Duration,
    /// Verifier pool capacity
    pub workers: usize,
    /// Skip remote fetching; sample the seen store instead
    pub cache_only: bool,
    /// Whether liveness probes are real (affects cache-only sample size)
    pub verify: bool,
}

/// One-run orchestrator
pub struct Scanner {
    source: Arc<dyn CandidateSource>,
    store: Arc<SeenStore>,
    prober: Arc<dyn Prober>,
    outputs: OutputManager,
    stats: StatsCollector,
    progress: ProgressIndicator,
    opts: ScanOptions,
}

impl Scanner {
    pub fn new(
        source: Arc<dyn CandidateSource>,
        store: Arc<SeenStore>,
        prober: Arc<dyn Prober>,
        outputs: OutputManager,
        stats: StatsCollector,
        progress: ProgressIndicator,
        opts: ScanOptions,
    ) -> Self {
        Self {
            source,
            store,
            prober,
            outputs,
            stats,
            progress,
            opts,
        }
    }

    /// Run the scan to completion.
    ///
    /// Per-TLD fetch failures are absorbed; a seen-store failure aborts the
    /// run, since the no-duplicate guarantee cannot be upheld without it.
    pub async fn run(self) -> Result<ScanReport> {
        let (mut pool, mut outcomes) =
            VerifierPool::new(Arc::clone(&self.prober), self.opts.workers);
        let mut accepted: Vec<Discovery> = Vec::new();

        if self.opts.cache_only {
            self.drain_cache(&pool, &mut outcomes, &mut accepted).await?;
        } else {
            self.drain_sources(&pool, &mut outcomes, &mut accepted).await?;
        }

        // No more submissions; wait out the in-flight probes
        pool.close();

        while accepted.len() < self.opts.count {
            match outcomes.recv().await {
                Some(outcome) => self.accept(outcome, &mut accepted).await,
                None => break,
            }
        }

        // Target reached (or nothing left): abandon any stragglers. Late
        // results are discarded, never promoted into the result set.
        pool.shutdown();
        self.progress.finish();

        if let Err(e) = self.outputs.flush().await {
            warn!("Output flush error: {:?}", e);
        }

        debug!("Run stats: {}", self.stats.format_stats());

        let outcome = if accepted.len() >= self.opts.count {
            info!("Target reached: {} domains accepted", accepted.len());
            ScanOutcome::Done
        } else {
            info!(
                "Sources exhausted: {} of {} requested domains found",
                accepted.len(),
                self.opts.count
            );
            ScanOutcome::Exhausted
        };

        Ok(ScanReport {
            domains: accepted,
            requested: self.opts.count,
            outcome,
        })
    }

    /// Fetch and drain candidates TLD by TLD
    async fn drain_sources(
        &self,
        pool: &VerifierPool,
        outcomes: &mut mpsc::Receiver<ProbeOutcome>,
        accepted: &mut Vec<Discovery>,
    ) -> Result<()> {
        for (i, tld) in self.opts.tlds.iter().enumerate() {
            if accepted.len() >= self.opts.count {
                return Ok(());
            }

            if i > 0 && !self.opts.fetch_delay.is_zero() {
                tokio::time::sleep(self.opts.fetch_delay).await;
            }

            let raws = match self.source.fetch(tld).await {
                Ok(raws) => raws,
                Err(e) => {
                    // Recoverable: other TLDs must still be attempted
                    self.stats.record_fetch_failure();
                    warn!("Fetch failed for .{}: {:#}", tld, e);
                    continue;
                }
            };

            debug!("Draining {} raw candidates from .{}", raws.len(), tld);

            for raw in raws {
                self.collect_ready(outcomes, accepted).await;
                if accepted.len() >= self.opts.count {
                    return Ok(());
                }

                self.stats.record_candidate();

                let Some(domain) = normalize(&raw) else {
                    self.stats.record_rejected();
                    continue;
                };

                match self.store.try_admit(&domain).await? {
                    Admission::AlreadySeen => {
                        self.stats.record_duplicate();
                        continue;
                    }
                    Admission::Admitted => {}
                }

                pool.submit(domain).await?;
                self.stats.record_submitted();
            }
        }

        Ok(())
    }

    /// Cache-only mode: no remote queries, probe a sample of the store
    async fn drain_cache(
        &self,
        pool: &VerifierPool,
        outcomes: &mut mpsc::Receiver<ProbeOutcome>,
        accepted: &mut Vec<Discovery>,
    ) -> Result<()> {
        let limit = if self.opts.verify {
            self.opts.count.saturating_mul(CACHE_SAMPLE_MULTIPLIER)
        } else {
            self.opts.count
        };

        let sampled = self.store.sample(limit).await?;

        if sampled.is_empty() {
            warn!("Seen-domain store is empty; run without cache-only mode to populate it");
            return Ok(());
        }

        info!("Cache-only: probing {} previously seen domains", sampled.len());

        for domain in sampled {
            self.collect_ready(outcomes, accepted).await;
            if accepted.len() >= self.opts.count {
                return Ok(());
            }

            pool.submit(domain).await?;
            self.stats.record_submitted();
        }

        Ok(())
    }

    /// Drain whatever outcomes are already waiting, without blocking
    async fn collect_ready(
        &self,
        outcomes: &mut mpsc::Receiver<ProbeOutcome>,
        accepted: &mut Vec<Discovery>,
    ) {
        loop {
            match outcomes.try_recv() {
                Ok(outcome) => self.accept(outcome, accepted).await,
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => return,
            }
        }
    }

    /// Fold one probe outcome into the result set
    async fn accept(&self, outcome: ProbeOutcome, accepted: &mut Vec<Discovery>) {
        self.stats.record_probed();

        // The length guard keeps the bound even when outcomes race in after
        // the target was hit
        if outcome.reachable && accepted.len() < self.opts.count {
            let discovery = Discovery::new(outcome.domain, outcome.status);

            if let Err(e) = self.outputs.emit(&discovery).await {
                warn!("Output error: {:?}", e);
            }

            accepted.push(discovery);
            self.stats.record_live();
        }

        let snapshot = self.stats.snapshot();
        self.progress
            .probe_progress(snapshot.probed, snapshot.live, self.opts.count);
    }
}
