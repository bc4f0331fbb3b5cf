// src/types.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// A domain accepted into the result set of one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Discovery {
    /// The normalized domain name
    pub domain: String,

    /// HTTP status from the liveness probe (None when verification is off
    /// or the probe succeeded without recording one)
    pub status: Option<u16>,

    /// Unix timestamp when the domain was accepted
    pub discovered_at: u64,
}

impl Discovery {
    pub fn new(domain: String, status: Option<u16>) -> Self {
        Self {
            domain,
            status,
            discovered_at: chrono::Utc::now().timestamp() as u64,
        }
    }
}

impl fmt::Display for Discovery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[+] {}", self.domain)?;
        if let Some(status) = self.status {
            write!(f, " (HTTP {})", status)?;
        }
        Ok(())
    }
}

/// How a scan run terminated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    /// The requested number of domains was collected
    Done,
    /// All sources were consumed before the target was reached
    Exhausted,
}

/// Result of one scan run
#[derive(Debug)]
pub struct ScanReport {
    /// Accepted domains, in acceptance order
    pub domains: Vec<Discovery>,
    /// How many domains were requested
    pub requested: usize,
    /// Terminal state of the run
    pub outcome: ScanOutcome,
}

impl ScanReport {
    /// Shortfall between requested and found (0 when the target was reached)
    pub fn shortfall(&self) -> usize {
        self.requested.saturating_sub(self.domains.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discovery_display_with_status() {
        let d = Discovery::new("example.com".to_string(), Some(200));
        assert_eq!(format!("{}", d), "[+] example.com (HTTP 200)");
    }

    #[test]
    fn test_discovery_display_without_status() {
        let d = Discovery::new("example.com".to_string(), None);
        assert_eq!(format!("{}", d), "[+] example.com");
    }

    #[test]
    fn test_discovery_serializes_to_json() {
        let d = Discovery {
            domain: "example.com".to_string(),
            status: Some(200),
            discovered_at: 1234567890,
        };

        let json = serde_json::to_string(&d).unwrap();
        assert!(json.contains("\"domain\":\"example.com\""));
        assert!(json.contains("\"status\":200"));
        assert!(json.contains("\"discovered_at\":1234567890"));
    }

    #[test]
    fn test_report_shortfall() {
        let report = ScanReport {
            domains: vec![Discovery::new("a.com".to_string(), None)],
            requested: 5,
            outcome: ScanOutcome::Exhausted,
        };
        assert_eq!(report.shortfall(), 4);

        let full = ScanReport {
            domains: vec![Discovery::new("a.com".to_string(), None)],
            requested: 1,
            outcome: ScanOutcome::Done,
        };
        assert_eq!(full.shortfall(), 0);
    }
}
