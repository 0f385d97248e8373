//! Client configuration loaded from TOML.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::common::config::load_config;

/// Client configuration.
///
/// # Example TOML
///
/// ```toml
/// [client]
/// name = "Client1"
/// server_url = "http://127.0.0.1:8000"
///
/// [polling]
/// interval_secs = 30
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub client: ClientInfo,
    #[serde(default)]
    pub polling: PollingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    /// Name used in logs (e.g., "Client1")
    pub name: String,
    /// Base URL of the detection service
    pub server_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Seconds between system status polls
    pub interval_secs: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self { interval_secs: 30 }
    }
}

impl ClientConfig {
    pub fn from_file(path: &str) -> Result<Self> {
        load_config(path)
    }
}
