// src/main.rs
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use webwhisper::cli::{Cli, OutputFormat};
use webwhisper::config::Config;
use webwhisper::crtsh::CrtShClient;
use webwhisper::output::{csv, human, json, silent, OutputManager};
use webwhisper::progress::ProgressIndicator;
use webwhisper::scanner::{ScanOptions, Scanner};
use webwhisper::stats::StatsCollector;
use webwhisper::store::SeenStore;
use webwhisper::types::ScanOutcome;
use webwhisper::verify::{AssumeLive, HttpProber, Prober};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Validate arguments
    cli.validate()?;

    // Load config file (missing default file means built-in defaults)
    let is_default_config = cli.config == "config.toml";
    let config = Config::load(Path::new(&cli.config), is_default_config)?;

    // Initialize logging
    // Precedence: CLI flags override config
    let log_level = cli.log_level().unwrap_or(config.logging.level.as_str());

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .init();

    tracing::info!("Starting webwhisper...");

    // Open the seen-domain store
    let store = Arc::new(
        SeenStore::open(
            Path::new(&config.database.path),
            config.database.max_connections,
        )
        .await?,
    );

    // Handle --reset flag
    if cli.reset {
        store.reset().await?;
        println!("Seen-domain store reset.");
        return Ok(());
    }

    // Effective scan parameters
    // Precedence: CLI flags override config
    let count = cli.count.unwrap_or(config.scan.count);
    let tlds = cli
        .parsed_tlds()
        .unwrap_or_else(|| config.scan.tlds.clone());
    let fetch_delay =
        Duration::from_secs(cli.fetch_delay.unwrap_or(config.scan.fetch_delay_secs));
    let workers = cli.workers.unwrap_or(config.verify.workers);
    let probe_timeout =
        Duration::from_secs(cli.probe_timeout.unwrap_or(config.verify.timeout_secs));

    let verify_enabled = if cli.no_verify {
        false
    } else {
        config.verify.enabled
    };

    if verify_enabled {
        tracing::info!(
            "Live verification enabled ({} workers, {}s probe timeout)",
            workers,
            probe_timeout.as_secs()
        );
    } else {
        tracing::info!("Live verification disabled, returned domains may be offline");
    }

    if cli.use_cache_only {
        tracing::info!("Cache-only mode: no crt.sh queries will be made");
    }

    // Create output manager
    let mut output_manager = OutputManager::new();

    // Add output handlers based on format
    match cli.output_format() {
        OutputFormat::Human => {
            if let Some(ref path) = cli.output {
                let file = std::fs::File::create(path)?;
                output_manager.add_handler(Arc::new(human::HumanOutput::to_file(file)));
                tracing::info!("Writing human-readable output to: {}", path);
            } else {
                output_manager.add_handler(Arc::new(human::HumanOutput::new()));
            }
        }
        OutputFormat::Json => {
            if let Some(ref path) = cli.output {
                let file = std::fs::File::create(path)?;
                output_manager.add_handler(Arc::new(json::JsonOutput::to_file(file)));
                tracing::info!("Writing JSON output to: {}", path);
            } else {
                output_manager.add_handler(Arc::new(json::JsonOutput::new()));
            }
        }
        OutputFormat::Csv => {
            if let Some(ref path) = cli.output {
                let file = std::fs::File::create(path)?;
                output_manager.add_handler(Arc::new(csv::CsvOutput::to_file(file)));
                tracing::info!("Writing CSV output to: {}", path);
            } else {
                output_manager.add_handler(Arc::new(csv::CsvOutput::new()));
            }
        }
        OutputFormat::Silent => {
            if let Some(ref path) = cli.output {
                let file = std::fs::File::create(path)?;
                output_manager.add_handler(Arc::new(human::HumanOutput::to_file(file)));
                tracing::info!("Silent mode: writing output to {} only", path);
            } else {
                output_manager.add_handler(Arc::new(silent::SilentOutput));
                tracing::info!("Silent mode: no per-domain output");
            }
        }
    }

    // Candidate source and prober
    let source = Arc::new(CrtShClient::with_base_url(
        config.scan.crtsh_url.clone(),
        Duration::from_secs(config.scan.fetch_timeout_secs),
        config.scan.max_entries_per_tld,
    )?);

    let prober: Arc<dyn Prober> = if verify_enabled {
        Arc::new(HttpProber::new(probe_timeout)?)
    } else {
        Arc::new(AssumeLive)
    };

    // Create stats collector and progress indicator
    let stats = StatsCollector::new();
    let progress = ProgressIndicator::new(cli.should_show_progress());

    let scanner = Scanner::new(
        source,
        store,
        prober,
        output_manager,
        stats.clone(),
        progress.clone(),
        ScanOptions {
            count,
            tlds,
            fetch_delay,
            workers,
            cache_only: cli.use_cache_only,
            verify: verify_enabled,
        },
    );

    tracing::info!("Starting scan (target: {} domains)...", count);
    let report = scanner.run().await?;

    if report.outcome == ScanOutcome::Exhausted {
        tracing::warn!(
            "Sources exhausted before target: {} of {} requested domains found",
            report.domains.len(),
            report.requested
        );
    }

    // Print final summary on the human path; machine formats stay clean
    if cli.output_format() == OutputFormat::Human {
        let snapshot = stats.snapshot();
        println!("\n📊 Scan summary:");
        println!("  Found: {} of {} requested", report.domains.len(), report.requested);
        println!("  Candidates processed: {}", snapshot.candidates);
        println!("  Duplicates skipped: {}", snapshot.duplicates);
        println!("  Rejected candidates: {}", snapshot.rejected);
        println!("  Probes completed: {}", snapshot.probed);
        if snapshot.fetch_failures > 0 {
            println!("  Failed TLD queries: {}", snapshot.fetch_failures);
        }
        println!(
            "  Elapsed: {}",
            StatsCollector::format_uptime(snapshot.uptime_secs)
        );
    }

    Ok(())
}
