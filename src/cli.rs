// src/cli.rs
use clap::Parser;

/// WebWhisper: domain discovery via Certificate Transparency
///
/// Fetches freshly certified domains from crt.sh, skips every domain already
/// returned in any prior run, and (unless disabled) keeps only domains that
/// currently answer over HTTP(S).
#[derive(Parser, Debug, Clone)]
#[command(name = "webwhisper")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    // ===== Scan parameters =====
    /// How many unique live domains to return
    #[arg(short = 'n', long = "count")]
    pub count: Option<usize>,

    /// Comma-separated list of TLDs to query (default: 30 common TLDs)
    #[arg(long = "tlds")]
    pub tlds: Option<String>,

    /// Skip live verification (faster but may return offline domains)
    #[arg(long = "no-verify")]
    pub no_verify: bool,

    /// Don't query crt.sh; sample the local seen-domain store instead
    #[arg(long = "use-cache-only")]
    pub use_cache_only: bool,

    // ===== Input & Configuration =====
    /// Path to TOML config file
    #[arg(short = 'c', long = "config", default_value = "config.toml")]
    pub config: String,

    // ===== Output Format =====
    /// Output discoveries in JSONL format
    #[arg(short = 'j', long = "json")]
    pub json: bool,

    /// Output discoveries in CSV format
    #[arg(long = "csv")]
    pub csv: bool,

    /// Suppress per-domain output (still updates the seen-domain store;
    /// pair with --output to keep the results)
    #[arg(short = 's', long = "silent")]
    pub silent: bool,

    // ===== Output Destination =====
    /// Write output to file instead of stdout
    #[arg(short = 'o', long = "output")]
    pub output: Option<String>,

    // ===== Performance =====
    /// Override verifier worker count
    #[arg(long = "workers")]
    pub workers: Option<usize>,

    /// Override per-probe timeout in seconds
    #[arg(long = "probe-timeout")]
    pub probe_timeout: Option<u64>,

    /// Override delay between crt.sh queries in seconds
    #[arg(long = "fetch-delay")]
    pub fetch_delay: Option<u64>,

    // ===== Display =====
    /// Disable progress indicator
    #[arg(long = "no-progress")]
    pub no_progress: bool,

    // ===== Logging =====
    /// Verbose logging (set log level to debug)
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Quiet logging (set log level to warn)
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,

    // ===== Utility Commands =====
    /// Wipe the seen-domain store and exit
    #[arg(long = "reset")]
    pub reset: bool,
}

impl Cli {
    /// Validate flag combinations and return errors for invalid usage
    pub fn validate(&self) -> anyhow::Result<()> {
        // Cannot specify multiple output formats
        let format_count = [self.json, self.csv, self.silent]
            .iter()
            .filter(|&&x| x)
            .count();

        if format_count > 1 {
            anyhow::bail!(
                "Cannot specify multiple output formats. \
                Choose one of: --json, --csv, or --silent"
            );
        }

        if let Some(count) = self.count {
            if count == 0 {
                anyhow::bail!("--count must be greater than 0");
            }
        }

        if self.workers == Some(0) {
            anyhow::bail!("--workers must be greater than 0");
        }

        // Verbose and quiet are mutually exclusive
        if self.verbose && self.quiet {
            anyhow::bail!("Cannot specify both --verbose and --quiet");
        }

        Ok(())
    }

    /// Parse the --tlds override into a cleaned list, if given
    pub fn parsed_tlds(&self) -> Option<Vec<String>> {
        let raw = self.tlds.as_ref()?;
        let tlds: Vec<String> = raw
            .split(',')
            .map(|t| t.trim().trim_start_matches('.').to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();

        if tlds.is_empty() { None } else { Some(tlds) }
    }

    /// Determine the output format based on flags
    pub fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else if self.csv {
            OutputFormat::Csv
        } else if self.silent {
            OutputFormat::Silent
        } else {
            OutputFormat::Human
        }
    }

    /// Check if progress indicator should be enabled
    pub fn should_show_progress(&self) -> bool {
        !self.no_progress && !self.json && !self.csv && !self.silent
    }

    /// Determine log level based on verbose/quiet flags
    pub fn log_level(&self) -> Option<&str> {
        if self.verbose {
            Some("debug")
        } else if self.quiet {
            Some("warn")
        } else {
            None
        }
    }
}

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable colored text output (default)
    Human,
    /// JSON Lines format (one JSON object per line)
    Json,
    /// CSV format
    Csv,
    /// No stdout output
    Silent,
}
