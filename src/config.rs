//! Client configuration.
//!
//! Every field has a default, so an empty document is a valid configuration:
//!
//! ```yaml
//! name: altitude-monitor
//! poll_interval_ms: 10
//! channel_capacity: 256
//! preview_bytes: 64
//! max_poll_backoff_ms: 1000
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::protocol::DEFAULT_PREVIEW_BYTES;
use crate::{ClientError, Result};

/// Tunables for a [`Client`](crate::Client) and its dispatch loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Client name passed to the native open call
    pub name: String,
    /// Wait between polls that return no data
    pub poll_interval_ms: u64,
    /// Bound of the envelope channel; a full channel applies backpressure
    pub channel_capacity: usize,
    /// Raw bytes kept for messages without a decoder
    pub preview_bytes: usize,
    /// Cap on the backoff after consecutive native poll failures
    pub max_poll_backoff_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            name: "simwire".to_string(),
            poll_interval_ms: 10,
            channel_capacity: 256,
            preview_bytes: DEFAULT_PREVIEW_BYTES,
            max_poll_backoff_ms: 1000,
        }
    }
}

impl ClientConfig {
    /// Default configuration under a different client name.
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    /// Parse and validate a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: ClientConfig = serde_yaml_ng::from_str(yaml).map_err(|e| {
            ClientError::config("Client config deserialization", format!("YAML parsing failed: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading client config");

        let yaml = std::fs::read_to_string(path)
            .map_err(|source| ClientError::ConfigFile { path: path.to_path_buf(), source })?;
        Self::from_yaml_str(&yaml)
    }

    /// Reject values the dispatch loop cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.channel_capacity == 0 {
            return Err(ClientError::config("channel_capacity", "must be at least 1"));
        }
        if self.poll_interval_ms == 0 {
            return Err(ClientError::config("poll_interval_ms", "must be at least 1"));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Backoff cap, never below the poll interval.
    pub fn max_poll_backoff(&self) -> Duration {
        Duration::from_millis(self.max_poll_backoff_ms.max(self.poll_interval_ms))
    }
}
