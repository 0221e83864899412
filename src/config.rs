//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! Defaults match the stock OpenIPC ground-station layout: the wfb-ng
//! fallback config at `/etc/wfb.conf`, the stats socket on the wfb-ng
//! gs port 8003, and the SysV init script for the wifibroadcast service.

use serde::Deserialize;
use serde::de::Error;
use std::fs;
use std::path::Path;

use crate::error::Result;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub radio: RadioConfig,

    #[serde(default)]
    pub stats: StatsConfig,
}

/// Radio reconciliation configuration
#[derive(Debug, Deserialize, Clone)]
pub struct RadioConfig {
    /// Radio settings endpoint on the air unit
    #[serde(default = "default_remote_url")]
    pub remote_url: String,

    /// Local fallback config file patched alongside the remote write
    #[serde(default = "default_local_config_path")]
    pub local_config_path: String,

    /// Init script restarted after a persisted change
    #[serde(default = "default_restart_script")]
    pub restart_script: String,

    #[serde(default = "default_forward_timeout_ms")]
    pub forward_timeout_ms: u64,

    #[serde(default = "default_restart_delay_ms")]
    pub restart_delay_ms: u64,
}

/// Link stats ingestion configuration
#[derive(Debug, Deserialize, Clone)]
pub struct StatsConfig {
    /// wfb-ng stats socket (gs.cfg `stats_port`, 8003 by default)
    #[serde(default = "default_stats_address")]
    pub address: String,

    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Backoff after a failed connect attempt
    #[serde(default = "default_connect_retry_ms")]
    pub connect_retry_ms: u64,

    /// Backoff after a dropped or closed connection
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
}

// Default value functions
fn default_remote_url() -> String { "http://10.5.0.10/api/radio".to_string() }
fn default_local_config_path() -> String { "/etc/wfb.conf".to_string() }
fn default_restart_script() -> String { "/etc/init.d/S98wifibroadcast".to_string() }
fn default_forward_timeout_ms() -> u64 { 5000 }
fn default_restart_delay_ms() -> u64 { 1000 }

fn default_stats_address() -> String { "127.0.0.1:8003".to_string() }
fn default_connect_timeout_ms() -> u64 { 2000 }
fn default_connect_retry_ms() -> u64 { 2000 }
fn default_reconnect_delay_ms() -> u64 { 1000 }

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            remote_url: default_remote_url(),
            local_config_path: default_local_config_path(),
            restart_script: default_restart_script(),
            forward_timeout_ms: default_forward_timeout_ms(),
            restart_delay_ms: default_restart_delay_ms(),
        }
    }
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            address: default_stats_address(),
            connect_timeout_ms: default_connect_timeout_ms(),
            connect_retry_ms: default_connect_retry_ms(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    fn validate(&self) -> Result<()> {
        if self.radio.remote_url.is_empty() {
            return Err(crate::error::GsLinkError::Config(
                toml::de::Error::custom("radio remote_url cannot be empty")
            ));
        }

        if self.radio.local_config_path.is_empty() {
            return Err(crate::error::GsLinkError::Config(
                toml::de::Error::custom("radio local_config_path cannot be empty")
            ));
        }

        if self.stats.address.is_empty() {
            return Err(crate::error::GsLinkError::Config(
                toml::de::Error::custom("stats address cannot be empty")
            ));
        }

        if self.radio.forward_timeout_ms == 0 || self.radio.forward_timeout_ms > 60000 {
            return Err(crate::error::GsLinkError::Config(
                toml::de::Error::custom("forward_timeout_ms must be between 1 and 60000")
            ));
        }

        if self.stats.connect_timeout_ms == 0 || self.stats.connect_timeout_ms > 60000 {
            return Err(crate::error::GsLinkError::Config(
                toml::de::Error::custom("connect_timeout_ms must be between 1 and 60000")
            ));
        }

        if self.stats.connect_retry_ms == 0 || self.stats.connect_retry_ms > 60000 {
            return Err(crate::error::GsLinkError::Config(
                toml::de::Error::custom("connect_retry_ms must be between 1 and 60000")
            ));
        }

        if self.stats.reconnect_delay_ms == 0 || self.stats.reconnect_delay_ms > 60000 {
            return Err(crate::error::GsLinkError::Config(
                toml::de::Error::custom("reconnect_delay_ms must be between 1 and 60000")
            ));
        }

        // restart_delay_ms of 0 is allowed: it disables the response-flush
        // grace period, which tests rely on
        if self.radio.restart_delay_ms > 10000 {
            return Err(crate::error::GsLinkError::Config(
                toml::de::Error::custom("restart_delay_ms must be at most 10000")
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.radio.local_config_path, "/etc/wfb.conf");
        assert_eq!(config.radio.restart_script, "/etc/init.d/S98wifibroadcast");
        assert_eq!(config.radio.restart_delay_ms, 1000);
        assert_eq!(config.stats.address, "127.0.0.1:8003");
        assert_eq!(config.stats.connect_timeout_ms, 2000);
        assert_eq!(config.stats.connect_retry_ms, 2000);
        assert_eq!(config.stats.reconnect_delay_ms, 1000);
    }

    #[test]
    fn test_load_valid_config() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[radio]
remote_url = "http://192.168.1.10/api/radio"
local_config_path = "/tmp/wfb.conf"

[stats]
address = "127.0.0.1:9003"
"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.radio.remote_url, "http://192.168.1.10/api/radio");
        assert_eq!(config.stats.address, "127.0.0.1:9003");
        // Unspecified fields fall back to defaults
        assert_eq!(config.radio.forward_timeout_ms, 5000);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[stats]\nconnect_timeout_ms = 0").unwrap();

        let result = Config::load(file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_address_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[stats]\naddress = \"\"").unwrap();

        let result = Config::load(file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load("/nonexistent/gs-link.toml");
        assert!(result.is_err());
    }
}
