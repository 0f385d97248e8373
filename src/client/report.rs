//! Confidence bands and plain-text verdict rendering.

use crate::common::types::DetectionResult;

/// Display bucket for a verdict confidence.
///
/// Bands partition `[0, 1]` with no gaps; out-of-range values clamp to the
/// outer bands. Declaration order is the band order, lowest confidence first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfidenceBand {
    VeryLow,
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl ConfidenceBand {
    pub fn from_confidence(confidence: f64) -> Self {
        let c = confidence.clamp(0.0, 1.0);
        if c < 0.2 {
            ConfidenceBand::VeryLow
        } else if c < 0.4 {
            ConfidenceBand::Low
        } else if c < 0.6 {
            ConfidenceBand::Moderate
        } else if c < 0.8 {
            ConfidenceBand::High
        } else {
            ConfidenceBand::VeryHigh
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConfidenceBand::VeryLow => "very low",
            ConfidenceBand::Low => "low",
            ConfidenceBand::Moderate => "moderate",
            ConfidenceBand::High => "high",
            ConfidenceBand::VeryHigh => "very high",
        }
    }
}

/// Render a verdict as plain report lines.
///
/// Brand lines appear only when the result carries `brand_info`.
pub fn render_lines(result: &DetectionResult) -> Vec<String> {
    let band = ConfidenceBand::from_confidence(result.confidence);
    let mut lines = vec![
        format!(
            "Verdict: {}",
            if result.is_israeli_product {
                "affiliated product detected"
            } else {
                "no affiliation detected"
            }
        ),
        format!(
            "Confidence: {:.1}% ({})",
            result.confidence * 100.0,
            band.label()
        ),
    ];

    let features = &result.detected_features;
    if features.any() {
        let mut signals = Vec::new();
        for (flag, name) in [
            (features.barcode_729, "729 barcode"),
            (features.made_in_israel_text, "origin label"),
            (features.hebrew_text, "hebrew text"),
            (features.israeli_brand, "known brand"),
            (features.kosher_certification, "certification mark"),
        ] {
            if flag {
                signals.push(name);
            }
        }
        lines.push(format!("Signals: {}", signals.join(", ")));
    }

    if let Some(brand) = &result.brand_info {
        lines.push(format!("Brand: {}", brand.name));
        lines.push(format!("Category: {}", brand.category));
        lines.push(format!("Risk level: {}", brand.risk_level.as_str()));
    }

    if let Some(ms) = result.processing_time_ms {
        lines.push(format!("Processed in {:.1} ms", ms));
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::{BrandInfo, DetectedFeatures, RiskLevel};
    use chrono::Utc;

    fn result(confidence: f64, brand: Option<BrandInfo>) -> DetectionResult {
        DetectionResult {
            is_israeli_product: brand.is_some(),
            confidence,
            detected_features: DetectedFeatures::default(),
            brand_info: brand,
            timestamp: Utc::now(),
            processing_time_ms: None,
        }
    }

    #[test]
    fn bands_are_monotonic_over_the_unit_interval() {
        let mut previous = ConfidenceBand::from_confidence(0.0);
        for step in 1..=1000 {
            let band = ConfidenceBand::from_confidence(step as f64 / 1000.0);
            assert!(band >= previous, "band regressed at step {}", step);
            previous = band;
        }
    }

    #[test]
    fn bands_cover_the_endpoints_and_clamp_beyond_them() {
        assert_eq!(ConfidenceBand::from_confidence(0.0), ConfidenceBand::VeryLow);
        assert_eq!(ConfidenceBand::from_confidence(1.0), ConfidenceBand::VeryHigh);
        assert_eq!(ConfidenceBand::from_confidence(-3.0), ConfidenceBand::VeryLow);
        assert_eq!(ConfidenceBand::from_confidence(2.5), ConfidenceBand::VeryHigh);
    }

    #[test]
    fn every_band_is_reachable() {
        let bands: Vec<_> = [0.1, 0.3, 0.5, 0.7, 0.9]
            .iter()
            .map(|c| ConfidenceBand::from_confidence(*c))
            .collect();
        assert_eq!(
            bands,
            [
                ConfidenceBand::VeryLow,
                ConfidenceBand::Low,
                ConfidenceBand::Moderate,
                ConfidenceBand::High,
                ConfidenceBand::VeryHigh,
            ]
        );
    }

    #[test]
    fn brand_lines_render_only_when_brand_info_present() {
        let without = render_lines(&result(0.9, None));
        assert!(!without.iter().any(|l| l.starts_with("Brand:")));

        let with = render_lines(&result(
            0.9,
            Some(BrandInfo {
                name: "sprite".to_string(),
                category: "beverages".to_string(),
                risk_level: RiskLevel::High,
            }),
        ));
        assert!(with.iter().any(|l| l == "Brand: sprite"));
        assert!(with.iter().any(|l| l == "Risk level: high"));
    }
}
