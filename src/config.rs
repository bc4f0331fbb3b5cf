// src/config.rs

use serde::Deserialize;
use std::fs;
use std::path::Path;

/// The 30 TLDs queried when neither config nor CLI specifies a list
pub const DEFAULT_TLDS: [&str; 30] = [
    "com", "net", "org", "io", "co", "uk", "de", "fr", "ca", "au", "jp", "cn", "in", "br", "ru",
    "nl", "it", "es", "se", "no", "pl", "be", "ch", "at", "dk", "fi", "cz", "pt", "gr", "nz",
];

#[derive(Debug, Deserialize, Clone)]
pub struct ScanConfig {
    #[serde(default = "default_count")]
    pub count: usize,
    #[serde(default = "default_tlds")]
    pub tlds: Vec<String>,
    #[serde(default = "default_fetch_delay")]
    pub fetch_delay_secs: u64,
    #[serde(default = "default_max_entries")]
    pub max_entries_per_tld: usize,
    #[serde(default = "default_crtsh_url")]
    pub crtsh_url: String,
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
}

fn default_count() -> usize { 25 }
fn default_tlds() -> Vec<String> {
    DEFAULT_TLDS.iter().map(|t| t.to_string()).collect()
}
fn default_fetch_delay() -> u64 { 1 }
fn default_max_entries() -> usize { 3000 }
fn default_crtsh_url() -> String { "https://crt.sh".to_string() }
fn default_fetch_timeout() -> u64 { 20 }

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            count: default_count(),
            tlds: default_tlds(),
            fetch_delay_secs: default_fetch_delay(),
            max_entries_per_tld: default_max_entries(),
            crtsh_url: default_crtsh_url(),
            fetch_timeout_secs: default_fetch_timeout(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct VerifyConfig {
    #[serde(default = "default_verify_enabled")]
    pub enabled: bool,
    #[serde(default = "default_workers")]
    pub workers: usize,
    #[serde(default = "default_probe_timeout")]
    pub timeout_secs: u64,
}

fn default_verify_enabled() -> bool { true }
fn default_workers() -> usize { 20 }
fn default_probe_timeout() -> u64 { 5 }

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            enabled: default_verify_enabled(),
            workers: default_workers(),
            timeout_secs: default_probe_timeout(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_path")]
    pub path: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_path() -> String { "webwhisper.db".to_string() }
fn default_max_connections() -> u32 { 5 }

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            max_connections: default_max_connections(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String { "info".to_string() }

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub verify: VerifyConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let cfg: Config = toml::from_str(&contents)?;
        Ok(cfg)
    }

    /// Load the config file, falling back to built-in defaults when the
    /// default config file does not exist. An explicitly named file that is
    /// missing is still an error.
    pub fn load(path: &Path, is_default_path: bool) -> anyhow::Result<Self> {
        if !path.exists() && is_default_path {
            tracing::debug!("No config file at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        Self::from_file(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_from_valid_toml() {
        let toml_content = r#"
[scan]
count = 50
tlds = ["com", "io"]
fetch_delay_secs = 2
max_entries_per_tld = 500

[verify]
enabled = false
workers = 8
timeout_secs = 3

[database]
path = "test.db"
max_connections = 2

[logging]
level = "debug"
        "#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = Config::from_file(temp_file.path()).unwrap();

        assert_eq!(config.scan.count, 50);
        assert_eq!(config.scan.tlds, vec!["com", "io"]);
        assert_eq!(config.scan.fetch_delay_secs, 2);
        assert_eq!(config.scan.max_entries_per_tld, 500);
        assert!(!config.verify.enabled);
        assert_eq!(config.verify.workers, 8);
        assert_eq!(config.verify.timeout_secs, 3);
        assert_eq!(config.database.path, "test.db");
        assert_eq!(config.database.max_connections, 2);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_config_empty_toml_uses_defaults() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"").unwrap();
        temp_file.flush().unwrap();

        let config = Config::from_file(temp_file.path()).unwrap();

        assert_eq!(config.scan.count, 25);
        assert_eq!(config.scan.tlds.len(), 30);
        assert_eq!(config.scan.fetch_delay_secs, 1);
        assert_eq!(config.scan.max_entries_per_tld, 3000);
        assert_eq!(config.scan.crtsh_url, "https://crt.sh");
        assert!(config.verify.enabled);
        assert_eq!(config.verify.workers, 20);
        assert_eq!(config.verify.timeout_secs, 5);
        assert_eq!(config.database.path, "webwhisper.db");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_config_partial_section() {
        let toml_content = r#"
[scan]
count = 5
        "#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = Config::from_file(temp_file.path()).unwrap();

        assert_eq!(config.scan.count, 5);
        // Unspecified fields still default
        assert_eq!(config.scan.tlds.len(), 30);
        assert!(config.verify.enabled);
    }

    #[test]
    fn test_config_invalid_toml() {
        let toml_content = "invalid toml content {{{";

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let result = Config::from_file(temp_file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_load_missing_default_path_falls_back() {
        let config = Config::load(Path::new("/nonexistent/config.toml"), true).unwrap();
        assert_eq!(config.scan.count, 25);
    }

    #[test]
    fn test_load_missing_explicit_path_is_error() {
        let result = Config::load(Path::new("/nonexistent/config.toml"), false);
        assert!(result.is_err());
    }
}
