// src/crtsh.rs
//! crt.sh candidate source
//!
//! One query per TLD against the crt.sh JSON endpoint. A single certificate
//! record's `name_value` can carry several names separated by newlines; each
//! becomes its own raw candidate. Failures are returned to the caller and
//! handled per TLD, never aborting the whole scan.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://crt.sh";
const USER_AGENT: &str = concat!("webwhisper/", env!("CARGO_PKG_VERSION"));

/// Source of raw candidate names for a TLD
#[async_trait]
pub trait CandidateSource: Send + Sync {
    /// Fetch raw candidate strings for one TLD. An `Err` is recoverable:
    /// the caller skips this TLD and moves on.
    async fn fetch(&self, tld: &str) -> Result<Vec<String>>;
}

/// One entry of the crt.sh JSON response. Only `name_value` matters here;
/// the issuer and index fields are ignored.
#[derive(Debug, Deserialize)]
struct CrtShEntry {
    name_value: Option<String>,
}

/// HTTP client for the crt.sh certificate search API
pub struct CrtShClient {
    base_url: String,
    http_client: reqwest::Client,
    max_entries: usize,
}

impl CrtShClient {
    /// Create a new client with the given request timeout and a cap on how
    /// many JSON entries are ingested per TLD query
    pub fn new(timeout: Duration, max_entries: usize) -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL.to_string(), timeout, max_entries)
    }

    /// Create a client against a non-default endpoint (tests, mirrors)
    pub fn with_base_url(
        base_url: String,
        timeout: Duration,
        max_entries: usize,
    ) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .gzip(true)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base_url,
            http_client,
            max_entries,
        })
    }
}

#[async_trait]
impl CandidateSource for CrtShClient {
    async fn fetch(&self, tld: &str) -> Result<Vec<String>> {
        let url = format!("{}/", self.base_url);

        debug!("Querying crt.sh for .{}", tld);

        let response = self
            .http_client
            .get(&url)
            .query(&[("q", format!("%.{}", tld)), ("output", "json".to_string())])
            .send()
            .await
            .with_context(|| format!("crt.sh request failed for .{}", tld))?;

        if !response.status().is_success() {
            // Overloaded deployments answer with HTML error pages; treat any
            // non-success status as a failed fetch for this TLD
            anyhow::bail!(
                "crt.sh returned status {} for .{}",
                response.status(),
                tld
            );
        }

        let entries: Vec<CrtShEntry> = response
            .json()
            .await
            .with_context(|| format!("crt.sh returned non-JSON reply for .{}", tld))?;

        let mut candidates = Vec::new();
        for entry in entries.iter().take(self.max_entries) {
            let Some(name_value) = &entry.name_value else {
                continue;
            };
            for name in name_value.lines() {
                let name = name.trim();
                if !name.is_empty() {
                    candidates.push(name.to_string());
                }
            }
        }

        debug!("crt.sh yielded {} raw candidates for .{}", candidates.len(), tld);

        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, max_entries: usize) -> CrtShClient {
        CrtShClient::with_base_url(server.uri(), Duration::from_secs(2), max_entries)
            .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_splits_name_value_lines() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/"))
            .and(query_param("q", "%.com"))
            .and(query_param("output", "json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "name_value": "example.com\n*.example.com" },
                { "name_value": "other.com" },
                { "issuer_name": "no names here" }
            ])))
            .mount(&server)
            .await;

        let client = client_for(&server, 3000);
        let candidates = client.fetch("com").await.unwrap();

        assert_eq!(
            candidates,
            vec!["example.com", "*.example.com", "other.com"]
        );
    }

    #[tokio::test]
    async fn test_fetch_caps_ingested_entries() {
        let server = MockServer::start().await;

        let entries: Vec<_> = (0..10)
            .map(|i| serde_json::json!({ "name_value": format!("site{}.com", i) }))
            .collect();

        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(entries))
            .mount(&server)
            .await;

        let client = client_for(&server, 4);
        let candidates = client.fetch("com").await.unwrap();

        assert_eq!(candidates.len(), 4);
    }

    #[tokio::test]
    async fn test_fetch_non_success_status_is_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = client_for(&server, 3000);
        assert!(client.fetch("io").await.is_err());
    }

    #[tokio::test]
    async fn test_fetch_non_json_reply_is_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("<html>too many results</html>"),
            )
            .mount(&server)
            .await;

        let client = client_for(&server, 3000);
        assert!(client.fetch("io").await.is_err());
    }

    #[tokio::test]
    async fn test_fetch_skips_blank_lines() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "name_value": "a.com\n\n  \nb.com" }
            ])))
            .mount(&server)
            .await;

        let client = client_for(&server, 3000);
        let candidates = client.fetch("com").await.unwrap();
        assert_eq!(candidates, vec!["a.com", "b.com"]);
    }
}
