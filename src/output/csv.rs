// src/output/csv.rs
//! CSV output handler

use crate::output::OutputHandler;
use crate::types::Discovery;
use async_trait::async_trait;
use std::io::{self, Write};
use std::sync::Mutex;

/// CSV output handler: header row followed by one record per accepted domain
pub struct CsvOutput {
    writer: Mutex<csv::Writer<Box<dyn Write + Send>>>,
}

impl CsvOutput {
    /// Create a new CsvOutput that writes to stdout
    pub fn new() -> Self {
        Self::from_writer(Box::new(io::stdout()))
    }

    /// Create a new CsvOutput that writes to a file
    pub fn to_file(file: std::fs::File) -> Self {
        Self::from_writer(Box::new(file))
    }

    fn from_writer(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(csv::Writer::from_writer(writer)),
        }
    }
}

impl Default for CsvOutput {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OutputHandler for CsvOutput {
    async fn emit(&self, discovery: &Discovery) -> anyhow::Result<()> {
        let mut writer = self.writer.lock().unwrap();

        // serde-driven serialization writes the header before the first record
        writer.serialize(discovery)?;
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
    async fn test_csv_output_header_and_records() {
        let mut file = tempfile::tempfile().unwrap();
        let handler = CsvOutput::to_file(file.try_clone().unwrap());

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
        handler.flush().await.unwrap();

        file.rewind().unwrap();
        let mut contents = String::new();
        file.read_to_string(&mut contents).unwrap();

        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "domain,status,discovered_at");
        assert_eq!(lines[1], "a.com,200,1234567890");
        assert_eq!(lines[2], "b.com,,1234567891");
    }
}
