// src/store.rs
//! Persistent seen-domain store
//!
//! The store is what makes "never repeats a domain" a cross-run guarantee:
//! every domain ever emitted is recorded in SQLite, keyed by a SHA-256
//! fingerprint of its canonical form. Admission is a single conflict-aware
//! insert, so concurrent callers racing on the same domain get exactly one
//! `Admitted`.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::path::Path;
use tracing::{debug, info};

/// Outcome of the dedup gate for one domain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// First sighting across all runs; the domain was recorded
    Admitted,
    /// The fingerprint already exists; not an error
    AlreadySeen,
}

/// Compute the dedup key for a canonical domain string
pub fn fingerprint(domain: &str) -> String {
    hex::encode(Sha256::digest(domain.as_bytes()))
}

/// SQLite-backed set of every domain emitted in any prior run
pub struct SeenStore {
    pool: SqlitePool,
}

impl SeenStore {
    /// Open (or create) the store at the given path
    pub async fn open(path: &Path, max_connections: u32) -> Result<Self> {
        info!("Opening seen-domain store at {:?}", path);

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .context("Failed to open seen-domain store")?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Open an in-memory store (tests and throwaway runs).
    ///
    /// Limited to a single connection: every pooled connection to
    /// `sqlite::memory:` would otherwise get its own private database.
    pub async fn open_in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .context("Failed to open in-memory store")?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS seen_domains (
                fingerprint TEXT PRIMARY KEY,
                domain TEXT NOT NULL,
                first_seen_ts TEXT NOT NULL DEFAULT (datetime('now'))
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create seen_domains table")?;

        Ok(())
    }

    /// Atomically check-and-record a domain.
    ///
    /// One statement does both the existence check and the insert, so two
    /// concurrent calls with the same domain yield exactly one `Admitted`.
    /// A store error means the no-duplicate guarantee cannot be upheld and
    /// is fatal to the run.
    pub async fn try_admit(&self, domain: &str) -> Result<Admission> {
        let fp = fingerprint(domain);

        let result = sqlx::query(
            r#"
            INSERT INTO seen_domains (fingerprint, domain)
            VALUES (?1, ?2)
            ON CONFLICT(fingerprint) DO NOTHING
            "#,
        )
        .bind(&fp)
        .bind(domain)
        .execute(&self.pool)
        .await
        .context("Seen-domain store unavailable")?;

        if result.rows_affected() == 1 {
            debug!("Admitted new domain: {}", domain);
            Ok(Admission::Admitted)
        } else {
            Ok(Admission::AlreadySeen)
        }
    }

    /// Return up to `n` previously seen domains in random order.
    ///
    /// Used by cache-only mode; performs no insert and no verification.
    pub async fn sample(&self, n: usize) -> Result<Vec<String>> {
        let rows = sqlx::query(
            r#"
            SELECT domain FROM seen_domains ORDER BY RANDOM() LIMIT ?1
            "#,
        )
        .bind(n as i64)
        .fetch_all(&self.pool)
        .await
        .context("Failed to sample seen domains")?;

        Ok(rows.into_iter().map(|row| row.get("domain")).collect())
    }

    /// Number of domains recorded across all runs
    pub async fn count(&self) -> Result<u64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM seen_domains")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count seen domains")?;

        Ok(row.get::<i64, _>("n") as u64)
    }

    /// Close the underlying connection pool. Any query after this fails
    /// with a pool-closed error.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Wipe the store. Every domain becomes discoverable again.
    pub async fn reset(&self) -> Result<()> {
        sqlx::query("DELETE FROM seen_domains")
            .execute(&self.pool)
            .await
            .context("Failed to reset seen-domain store")?;

        info!("Seen-domain store reset");
        Ok(())
    }
}
