//! Configuration loading and persistence.
//!
//! Settings live in a JSON file next to the binary by default. A missing
//! file is not an error: the tool starts with defaults so capture works
//! out of the box, and forwarding stays disabled until configured.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Default config file name, resolved relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "bpsr.json";

/// Top-level tool configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Chat forwarding settings.
    pub forwarder: ForwarderSettings,
}

/// Settings for the external chat-forwarding endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ForwarderSettings {
    /// Whether chat forwarding is active at all.
    pub enabled: bool,
    /// WebSocket endpoint receiving chat messages.
    pub websocket_url: String,
    /// Bearer token presented on connect.
    pub jwt_token: String,
    /// Delay between reconnect attempts, in seconds.
    pub reconnect_delay_secs: u64,
    /// Keepalive ping interval, in seconds.
    pub ping_interval_secs: u64,
    /// Reconnect attempts before giving up. Zero means retry forever.
    pub max_retries: u32,
}

impl Default for ForwarderSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            websocket_url: String::new(),
            jwt_token: String::new(),
            reconnect_delay_secs: 5,
            ping_interval_secs: 30,
            max_retries: 0,
        }
    }
}

impl Config {
    /// Default config file location.
    pub fn default_path() -> PathBuf {
        PathBuf::from(DEFAULT_CONFIG_FILE)
    }

    /// Load configuration from `path`.
    ///
    /// Loading never aborts the tool: a missing file yields the defaults
    /// with an info log, an unreadable or invalid one yields the defaults
    /// with an error log.
    pub fn load_from_file(path: &Path) -> Self {
        let data = match std::fs::read_to_string(path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("no config at {}, using defaults", path.display());
                return Self::default();
            }
            Err(e) => {
                tracing::error!("cannot read config at {}: {e}, using defaults", path.display());
                return Self::default();
            }
        };
        match serde_json::from_str(&data) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!("invalid config at {}: {e}, using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Write the configuration to `path` as pretty-printed JSON.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let data = serde_json::to_string_pretty(self)?;
        std::fs::write(path, data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = Config::load_from_file(Path::new("/nonexistent/bpsr.json"));
        assert!(!config.forwarder.enabled);
        assert_eq!(config.forwarder.reconnect_delay_secs, 5);
    }

    #[test]
    fn test_roundtrip() {
        let dir = std::env::temp_dir();
        let path = dir.join("bpsr_test_config.json");

        let mut config = Config::default();
        config.forwarder.enabled = true;
        config.forwarder.websocket_url = "wss://example.test/chat".into();
        config.save_to_file(&path).unwrap();

        let loaded = Config::load_from_file(&path);
        assert!(loaded.forwarder.enabled);
        assert_eq!(loaded.forwarder.websocket_url, "wss://example.test/chat");

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = std::env::temp_dir();
        let path = dir.join("bpsr_test_partial.json");
        std::fs::write(&path, r#"{"forwarder":{"enabled":true}}"#).unwrap();

        let loaded = Config::load_from_file(&path);
        assert!(loaded.forwarder.enabled);
        assert_eq!(loaded.forwarder.ping_interval_secs, 30);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_invalid_file_falls_back_to_defaults() {
        let dir = std::env::temp_dir();
        let path = dir.join("bpsr_test_invalid.json");
        std::fs::write(&path, "{not json").unwrap();

        let loaded = Config::load_from_file(&path);
        assert!(!loaded.forwarder.enabled);

        std::fs::remove_file(&path).ok();
    }
}
