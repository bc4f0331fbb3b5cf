// src/output/json.rs
//! JSON Lines (JSONL) output handler

use crate::output::OutputHandler;
use crate::types::Discovery;
use async_trait::async_trait;
use std::io::{self, Write};
use std::sync::Mutex;

/// JSON Lines output handler
///
/// Outputs one JSON object per accepted domain (JSONL/NDJSON format)
pub struct JsonOutput {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl JsonOutput {
    /// Create a new JsonOutput that writes to stdout
    pub fn new() -> Self {
        Self {
            writer: Mutex::new(Box::new(io::stdout())),
        }
    }

    /// Create a new JsonOutput that writes to a file
    pub fn to_file(file: std::fs::File) -> Self {
        Self {
            writer: Mutex::new(Box::new(file)),
        }
    }
}

impl Default for JsonOutput {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OutputHandler for JsonOutput {
    async fn emit(&self, discovery: &Discovery) -> anyhow::Result<()> {
        let mut writer = self.writer.lock().unwrap();

        let json = serde_json::to_string(discovery)?;
        writeln!(writer, "{}", json)?;
        writer.flush()?;

        Ok(())
    }

    async fn flush(&self) -> anyhow::Result<()> {
        let mut writer = self.writer.lock().unwrap();
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Seek};

    #[tokio::test]
    async fn test_json_output_is_one_object_per_line() {
        let mut file = tempfile::tempfile().unwrap();
        let handler = JsonOutput::to_file(file.try_clone().unwrap());

        handler
            .emit(&Discovery {
                domain: "a.com".to_string(),
                status: Some(200),
                discovered_at: 1234567890,
            })
            .await
            .unwrap();
        handler
            .emit(&Discovery {
                domain: "b.com".to_string(),
                status: None,
                discovered_at: 1234567891,
            })
            .await
            .unwrap();

        file.rewind().unwrap();
        let mut contents = String::new();
        file.read_to_string(&mut contents).unwrap();

        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["domain"], "a.com");
        assert_eq!(first["status"], 200);

        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["domain"], "b.com");
        assert!(second["status"].is_null());
    }
}
