//! Server configuration loaded from TOML.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::common::config::load_config;
use crate::detection::model::DEFAULT_THRESHOLD;
use crate::detection::{SignalWeights, DEFAULT_MAX_IMAGE_BYTES};

/// Complete server configuration.
///
/// # Example TOML
///
/// ```toml
/// [server]
/// address = "127.0.0.1:8000"
///
/// [limits]
/// max_image_bytes = 10485760
/// max_batch_size = 10
///
/// [model]
/// threshold = 0.5
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address for this service instance
    pub server: ServerInfo,
    /// Upload and batch limits
    #[serde(default)]
    pub limits: Limits,
    /// Scoring model tuning
    #[serde(default)]
    pub model: ModelConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    /// Address the service binds to (e.g., "127.0.0.1:8000")
    pub address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Maximum accepted image payload in bytes
    pub max_image_bytes: usize,
    /// Maximum number of images per batch request
    pub max_batch_size: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            max_batch_size: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Verdict threshold on the normalized signal score
    pub threshold: f64,
    /// Per-signal weights; defaults favor hard packaging evidence
    pub weights: SignalWeights,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            weights: SignalWeights::default(),
        }
    }
}

impl ServerConfig {
    /// Load server configuration from a TOML file.
    pub fn from_file(path: &str) -> Result<Self> {
        load_config(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_fills_defaults() {
        let config: ServerConfig = toml::from_str(
            r#"
            [server]
            address = "127.0.0.1:8000"
            "#,
        )
        .unwrap();
        assert_eq!(config.limits.max_batch_size, 10);
        assert_eq!(config.limits.max_image_bytes, DEFAULT_MAX_IMAGE_BYTES);
        assert_eq!(config.model.threshold, DEFAULT_THRESHOLD);
    }

    #[test]
    fn model_section_overrides_threshold_only() {
        let config: ServerConfig = toml::from_str(
            r#"
            [server]
            address = "0.0.0.0:9000"

            [model]
            threshold = 0.7
            "#,
        )
        .unwrap();
        assert_eq!(config.model.threshold, 0.7);
        assert_eq!(config.model.weights.barcode_729, SignalWeights::default().barcode_729);
    }
}
