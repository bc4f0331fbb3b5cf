// src/output/human.rs
//! Human-readable colored terminal output

use crate::output::OutputHandler;
use crate::types::Discovery;
use async_trait::async_trait;
use colored::Colorize;
use std::io::{self, Write};
use std::sync::Mutex;

/// Human-readable output handler with colored terminal output
pub struct HumanOutput {
    writer: Mutex<Box<dyn Write + Send>>,
    use_colors: bool,
}

impl HumanOutput {
    /// Create a new HumanOutput that writes to stdout
    pub fn new() -> Self {
        Self {
            writer: Mutex::new(Box::new(io::stdout())),
            use_colors: is_terminal::is_terminal(std::io::stdout()),
        }
    }

    /// Create a new HumanOutput that writes to a file
    pub fn to_file(file: std::fs::File) -> Self {
        Self {
            writer: Mutex::new(Box::new(file)),
            use_colors: false, // No colors when writing to file
        }
    }

    /// Format a timestamp as human-readable string
    fn format_timestamp(ts: u64) -> String {
        use chrono::DateTime;

        if let Some(datetime) = DateTime::from_timestamp(ts as i64, 0) {
            datetime.format("%Y-%m-%d %H:%M:%S").to_string()
        } else {
            format!("{}", ts)
        }
    }
}

impl Default for HumanOutput {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OutputHandler for HumanOutput {
    async fn emit(&self, discovery: &Discovery) -> anyhow::Result<()> {
        let mut writer = self.writer.lock().unwrap();

        let timestamp = Self::format_timestamp(discovery.discovered_at);
        let status = discovery
            .status
            .map(|s| format!(" (HTTP {})", s))
            .unwrap_or_default();

        if self.use_colors {
            writeln!(
                writer,
                "{} {} {}{}",
                format!("[{}]", timestamp).dimmed(),
                "[+]".green().bold(),
                discovery.domain.cyan().bold(),
                status.dimmed()
            )?;
        } else {
            writeln!(writer, "[{}] [+] {}{}", timestamp, discovery.domain, status)?;
        }

        writer.flush()?;
        Ok(())
    }

    async fn flush(&self) -> anyhow::Result<()> {
        let mut writer = self.writer.lock().unwrap();
        writer.flush()?;
        Ok(())
    }
}
