//! Client configuration
//!
//! The original deployment hard-coded the backend address, index pattern,
//! request headers and time zone as process-wide constants. All of those live
//! here instead and are handed to [`crate::LogSearchClient`] at construction.

use anyhow::{anyhow, Result};
use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Backend connection and query defaults.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Backend HTTP host
    #[serde(default = "default_host")]
    pub host: String,
    /// Backend HTTP port
    #[serde(default = "default_port")]
    pub port: u16,
    /// "http" or "https"
    #[serde(default = "default_scheme")]
    pub scheme: String,
    /// Index pattern every search and aggregation runs against
    #[serde(default = "default_index_pattern")]
    pub index_pattern: String,
    /// Value of the `Role` header sent with every request
    #[serde(default = "default_role")]
    pub role: String,
    /// Zone id passed to the backend's date histogram (`time_zone`)
    #[serde(default = "default_time_zone")]
    pub time_zone: String,
    /// UTC offset in minutes used to interpret and render local timestamps.
    /// Must match `time_zone` (the default pair is Asia/Seoul / +540).
    #[serde(default = "default_utc_offset_minutes")]
    pub utc_offset_minutes: i32,
    /// Idle time-to-live of a scroll cursor between advances, in seconds
    #[serde(default = "default_scroll_ttl_secs")]
    pub scroll_ttl_secs: u64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    9200
}

fn default_scheme() -> String {
    "http".to_string()
}

fn default_index_pattern() -> String {
    "index-*".to_string()
}

fn default_role() -> String {
    "Read".to_string()
}

fn default_time_zone() -> String {
    "Asia/Seoul".to_string()
}

fn default_utc_offset_minutes() -> i32 {
    540
}

fn default_scroll_ttl_secs() -> u64 {
    60
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            scheme: default_scheme(),
            index_pattern: default_index_pattern(),
            role: default_role(),
            time_zone: default_time_zone(),
            utc_offset_minutes: default_utc_offset_minutes(),
            scroll_ttl_secs: default_scroll_ttl_secs(),
        }
    }
}

impl SearchConfig {
    /// Load configuration from a TOML file. Missing keys fall back to the
    /// field defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read config {}: {}", path.display(), e))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config {}: {}", path.display(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Write the configuration back out as TOML.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)
            .map_err(|e| anyhow!("Failed to write config {}: {}", path.display(), e))
    }

    pub fn validate(&self) -> Result<()> {
        if self.scheme != "http" && self.scheme != "https" {
            return Err(anyhow!("Unsupported scheme: {}", self.scheme));
        }
        if self.utc_offset_minutes.abs() >= 24 * 60 {
            return Err(anyhow!(
                "UTC offset out of range: {} minutes",
                self.utc_offset_minutes
            ));
        }
        if self.scroll_ttl_secs == 0 {
            return Err(anyhow!("Scroll TTL must be positive"));
        }
        Ok(())
    }

    /// Base URL of the backend, without a trailing slash.
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.port)
    }

    /// The configured UTC offset as a chrono `FixedOffset`.
    pub fn utc_offset(&self) -> FixedOffset {
        // Range-checked by validate(); fall back to UTC rather than panic.
        FixedOffset::east_opt(self.utc_offset_minutes * 60).unwrap_or_else(|| Utc.fix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = SearchConfig::default();

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 9200);
        assert_eq!(config.index_pattern, "index-*");
        assert_eq!(config.role, "Read");
        assert_eq!(config.time_zone, "Asia/Seoul");
        assert_eq!(config.utc_offset_minutes, 540);
        assert_eq!(config.scroll_ttl_secs, 60);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_base_url() {
        let mut config = SearchConfig::default();
        config.host = "search.internal".to_string();
        config.port = 9400;
        assert_eq!(config.base_url(), "http://search.internal:9400");

        config.scheme = "https".to_string();
        assert_eq!(config.base_url(), "https://search.internal:9400");
    }

    #[test]
    fn test_save_and_load() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("logsearch.toml");

        let mut config = SearchConfig::default();
        config.host = "10.0.0.4".to_string();
        config.port = 9400;
        config.index_pattern = "filebeat-*".to_string();
        config.scroll_ttl_secs = 120;

        config.save(&path).unwrap();

        let loaded = SearchConfig::load(&path).unwrap();
        assert_eq!(loaded.host, "10.0.0.4");
        assert_eq!(loaded.port, 9400);
        assert_eq!(loaded.index_pattern, "filebeat-*");
        assert_eq!(loaded.scroll_ttl_secs, 120);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("partial.toml");
        fs::write(&path, "host = \"logs.example.com\"\n").unwrap();

        let loaded = SearchConfig::load(&path).unwrap();
        assert_eq!(loaded.host, "logs.example.com");
        assert_eq!(loaded.port, 9200);
        assert_eq!(loaded.time_zone, "Asia/Seoul");
    }

    #[test]
    fn test_validate_rejects_bad_scheme() {
        let mut config = SearchConfig::default();
        config.scheme = "ftp".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_ttl() {
        let mut config = SearchConfig::default();
        config.scroll_ttl_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_utc_offset() {
        let config = SearchConfig::default();
        assert_eq!(config.utc_offset().local_minus_utc(), 9 * 3600);
    }
}
