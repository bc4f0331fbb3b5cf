// src/stats.rs
//! Statistics tracking for a scan run

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Thread-safe counters for one scan run
#[derive(Clone)]
pub struct StatsCollector {
    candidates: Arc<AtomicU64>,
    rejected: Arc<AtomicU64>,
    duplicates: Arc<AtomicU64>,
    submitted: Arc<AtomicU64>,
    probed: Arc<AtomicU64>,
    live: Arc<AtomicU64>,
    fetch_failures: Arc<AtomicU64>,
    start_time: Instant,
}

/// Snapshot of statistics at a point in time
#[derive(Debug, Clone)]
pub struct StatsSnapshot {
    pub candidates: u64,
    pub rejected: u64,
    pub duplicates: u64,
    pub submitted: u64,
    pub probed: u64,
    pub live: u64,
    pub fetch_failures: u64,
    pub uptime_secs: u64,
}

impl StatsCollector {
    pub fn new() -> Self {
        Self {
            candidates: Arc::new(AtomicU64::new(0)),
            rejected: Arc::new(AtomicU64::new(0)),
            duplicates: Arc::new(AtomicU64::new(0)),
            submitted: Arc::new(AtomicU64::new(0)),
            probed: Arc::new(AtomicU64::new(0)),
            live: Arc::new(AtomicU64::new(0)),
            fetch_failures: Arc::new(AtomicU64::new(0)),
            start_time: Instant::now(),
        }
    }

    /// A raw candidate arrived from a source
    pub fn record_candidate(&self) {
        self.candidates.fetch_add(1, Ordering::Relaxed);
    }

    /// A candidate failed normalization
    pub fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// A candidate was already in the seen store
    pub fn record_duplicate(&self) {
        self.duplicates.fetch_add(1, Ordering::Relaxed);
    }

    /// A domain was handed to the verifier pool
    pub fn record_submitted(&self) {
        self.submitted.fetch_add(1, Ordering::Relaxed);
    }

    /// A probe outcome came back
    pub fn record_probed(&self) {
        self.probed.fetch_add(1, Ordering::Relaxed);
    }

    /// A domain was accepted into the result set
    pub fn record_live(&self) {
        self.live.fetch_add(1, Ordering::Relaxed);
    }

    /// A whole TLD query failed
    pub fn record_fetch_failure(&self) {
        self.fetch_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current statistics snapshot
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            candidates: self.candidates.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            duplicates: self.duplicates.load(Ordering::Relaxed),
            submitted: self.submitted.load(Ordering::Relaxed),
            probed: self.probed.load(Ordering::Relaxed),
            live: self.live.load(Ordering::Relaxed),
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
            uptime_secs: self.start_time.elapsed().as_secs(),
        }
    }

    /// Format statistics as a one-line human-readable string
    pub fn format_stats(&self) -> String {
        let s = self.snapshot();
        format!(
            "{} candidates | {} new | {} dupes | {} probed | {} live | {}",
            s.candidates,
            s.submitted,
            s.duplicates,
            s.probed,
            s.live,
            Self::format_uptime(s.uptime_secs)
        )
    }

    /// Format uptime duration
    pub fn format_uptime(secs: u64) -> String {
        let hours = secs / 3600;
        let minutes = (secs % 3600) / 60;
        let seconds = secs % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }
}

impl Default for StatsCollector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_snapshot_is_zeroed() {
        let stats = StatsCollector::new();
        let s = stats.snapshot();

        assert_eq!(s.candidates, 0);
        assert_eq!(s.rejected, 0);
        assert_eq!(s.duplicates, 0);
        assert_eq!(s.submitted, 0);
        assert_eq!(s.probed, 0);
        assert_eq!(s.live, 0);
        assert_eq!(s.fetch_failures, 0);
    }

    #[test]
    fn test_counters_increment_independently() {
        let stats = StatsCollector::new();

        stats.record_candidate();
        stats.record_candidate();
        stats.record_rejected();
        stats.record_duplicate();
        stats.record_submitted();
        stats.record_probed();
        stats.record_live();
        stats.record_fetch_failure();

        let s = stats.snapshot();
        assert_eq!(s.candidates, 2);
        assert_eq!(s.rejected, 1);
        assert_eq!(s.duplicates, 1);
        assert_eq!(s.submitted, 1);
        assert_eq!(s.probed, 1);
        assert_eq!(s.live, 1);
        assert_eq!(s.fetch_failures, 1);
    }

    #[test]
    fn test_clone_shares_state() {
        let stats1 = StatsCollector::new();
        let stats2 = stats1.clone();

        stats1.record_live();
        stats2.record_live();

        assert_eq!(stats1.snapshot().live, 2);
        assert_eq!(stats2.snapshot().live, 2);
    }

    #[test]
    fn test_format_stats_one_liner() {
        let stats = StatsCollector::new();
        stats.record_candidate();
        stats.record_candidate();
        stats.record_submitted();
        stats.record_duplicate();
        stats.record_probed();
        stats.record_live();

        let line = stats.format_stats();
        assert!(line.starts_with("2 candidates | 1 new | 1 dupes | 1 probed | 1 live"));
    }

    #[test]
    fn test_format_uptime() {
        assert_eq!(StatsCollector::format_uptime(30), "30s");
        assert_eq!(StatsCollector::format_uptime(90), "1m 30s");
        assert_eq!(StatsCollector::format_uptime(3661), "1h 1m 1s");
    }
}
