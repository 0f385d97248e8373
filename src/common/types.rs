//! # Wire Contract
//!
//! Defines every JSON payload exchanged between the detection service and its
//! clients:
//! - Per-image verdicts ([`DetectionResult`]) and their feature signals
//! - Batch analysis envelopes
//! - Health, model-info and service-banner responses
//! - The uniform error body (`{"detail": ...}`) returned by every non-2xx
//!   response
//!
//! Images travel as multipart uploads; everything coming back is JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Risk tier attached to a matched brand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::High => "high",
            RiskLevel::Medium => "medium",
            RiskLevel::Low => "low",
        }
    }
}

/// Metadata attached to a verdict when a known brand was matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandInfo {
    /// Matched product or brand name as it appeared on the packaging
    pub name: String,
    /// Product category (e.g., "food_beverage", "cosmetics")
    pub category: String,
    /// Risk tier of the owning company
    pub risk_level: RiskLevel,
}

/// The five fixed boolean signals reported with every verdict.
///
/// The field set is part of the wire contract: every response carries exactly
/// these five keys, each present even when false.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedFeatures {
    /// An EAN/UPC barcode with the Israeli 729 country prefix was found
    pub barcode_729: bool,
    /// An origin label ("made in israel", "product of israel", ...) was read
    pub made_in_israel_text: bool,
    /// Hebrew script was recognized anywhere on the packaging
    pub hebrew_text: bool,
    /// A known affiliated brand name was matched
    pub israeli_brand: bool,
    /// A kosher certification mark or vocabulary was recognized
    pub kosher_certification: bool,
}

impl DetectedFeatures {
    /// True if any of the five signals fired.
    pub fn any(&self) -> bool {
        self.barcode_729
            || self.made_in_israel_text
            || self.hebrew_text
            || self.israeli_brand
            || self.kosher_certification
    }
}

/// Structured verdict returned per analyzed image.
///
/// Created by the detection service at inference time; clients hold these
/// transiently in a bounded history and never persist them server-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    /// Boolean verdict
    pub is_israeli_product: bool,
    /// Verdict confidence, always within [0, 1]
    pub confidence: f64,
    /// The five fixed feature signals
    pub detected_features: DetectedFeatures,
    /// Present only when a brand match occurred; omitted from JSON otherwise
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand_info: Option<BrandInfo>,
    /// Server-side creation instant, set at inference time
    pub timestamp: DateTime<Utc>,
    /// Server-side latency measurement for this inference
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_time_ms: Option<f64>,
}

/// One entry of a batch analysis response.
///
/// Carries either a full [`DetectionResult`] or a per-item error message;
/// `index` always matches the submission position of the image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchItem {
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<DetectionResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Envelope for `POST /analyze/batch`.
///
/// `results` is ordered by submission position: the service processes batch
/// images sequentially so index i always corresponds to the i-th uploaded
/// image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResponse {
    pub results: Vec<BatchItem>,
    pub total_processed: usize,
    pub timestamp: DateTime<Utc>,
}

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// "healthy" when the service is up and the model is loaded
    pub status: String,
    pub model_ready: bool,
    pub timestamp: DateTime<Utc>,
    /// Seconds since the service started
    pub uptime_secs: u64,
    pub requests: RequestCounters,
    pub system: SystemLoadSnapshot,
}

/// Request counters reported by the health endpoint.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RequestCounters {
    pub total: u64,
    pub succeeded: u64,
    pub failed: u64,
    /// Exponential moving average of per-request processing time
    pub avg_processing_ms: f64,
}

/// Point-in-time CPU and memory usage of the service host.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SystemLoadSnapshot {
    pub cpu_usage_percent: f32,
    pub memory_used_mb: u64,
    pub memory_total_mb: u64,
}

/// Response body for `GET /model/info`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    /// "ready" or "not_ready"
    pub status: String,
    pub model_type: String,
    pub feature_count: usize,
    pub feature_names: Vec<String>,
    /// Number of companies in the brand database
    pub brands_count: usize,
}

/// Response body for `GET /`, the service banner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub message: String,
    pub status: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

/// Uniform error body carried by every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}
