//! Publisher configuration.
//!
//! Stored as JSON:
//!
//! ```json
//! {
//!   "relays": ["wss://relay.damus.io", "wss://nos.lol"],
//!   "connectTimeoutMs": 10000,
//!   "seenTimeoutMs": 30000
//! }
//! ```
//!
//! A `null` timeout waits for relays without a deadline.

use crate::error::{PublisherError, Result};
use crate::publish::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_SEEN_TIMEOUT, PublishOptions};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::debug;
use url::Url;

fn default_connect_timeout_ms() -> Option<u64> {
    Some(DEFAULT_CONNECT_TIMEOUT.as_millis() as u64)
}

fn default_seen_timeout_ms() -> Option<u64> {
    Some(DEFAULT_SEEN_TIMEOUT.as_millis() as u64)
}

/// Relays to publish to and how long to wait on each
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublisherConfig {
    /// Relay URLs (ws:// or wss://)
    #[serde(default)]
    pub relays: Vec<String>,

    /// Deadline for connecting to a relay, in milliseconds
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: Option<u64>,

    /// Deadline for a terminal notice, in milliseconds
    #[serde(default = "default_seen_timeout_ms")]
    pub seen_timeout_ms: Option<u64>,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            relays: Vec::new(),
            connect_timeout_ms: default_connect_timeout_ms(),
            seen_timeout_ms: default_seen_timeout_ms(),
        }
    }
}

impl PublisherConfig {
    pub fn with_relays(relays: Vec<String>) -> Self {
        Self {
            relays,
            ..Default::default()
        }
    }

    /// Check every relay URL and timeout
    pub fn validate(&self) -> Result<()> {
        for relay in &self.relays {
            validate_relay_url(relay)?;
        }
        if self.connect_timeout_ms == Some(0) {
            return Err(PublisherError::Config(
                "connectTimeoutMs must be positive or null".to_string(),
            ));
        }
        if self.seen_timeout_ms == Some(0) {
            return Err(PublisherError::Config(
                "seenTimeoutMs must be positive or null".to_string(),
            ));
        }
        Ok(())
    }

    /// Options for each publish attempt
    pub fn options(&self) -> PublishOptions {
        PublishOptions {
            connect_timeout: self.connect_timeout_ms.map(Duration::from_millis),
            seen_timeout: self.seen_timeout_ms.map(Duration::from_millis),
        }
    }
}

/// Relay URLs must parse and use the `ws` or `wss` scheme
pub fn validate_relay_url(relay: &str) -> Result<Url> {
    let url = Url::parse(relay)?;
    if url.scheme() != "ws" && url.scheme() != "wss" {
        return Err(PublisherError::InvalidUrl(format!(
            "URL must use ws:// or wss:// scheme, got: {}",
            url.scheme()
        )));
    }
    Ok(url)
}

/// Load and validate a config file
pub fn load_config(path: impl AsRef<Path>) -> Result<PublisherConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let config: PublisherConfig = serde_json::from_str(&content)?;
    config.validate()?;
    debug!(path = %path.display(), relays = config.relays.len(), "Loaded publisher config");
    Ok(config)
}

/// Validate and write a config file, creating parent directories
pub fn save_config(path: impl AsRef<Path>, config: &PublisherConfig) -> Result<()> {
    config.validate()?;
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(config)?)?;
    Ok(())
}
