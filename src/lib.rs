pub mod client;
pub mod common;
pub mod detection;
pub mod server;

pub use common::types::{BrandInfo, DetectedFeatures, DetectionResult, RiskLevel};
pub use detection::DetectionEngine;
