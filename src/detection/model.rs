//! # Scoring Model
//!
//! Deterministic weighted-signal model over the ten packaging inputs. Hard
//! evidence (barcode prefix, origin label, brand match) carries most of the
//! weight; visual statistics only nudge the score. The verdict is a threshold
//! test on the normalized score and the reported confidence is the
//! probability of the winning class.

use serde::{Deserialize, Serialize};

use crate::common::types::ModelInfo;

use super::features::{FeatureVector, FEATURE_NAMES};

/// Per-input weights, in [`FEATURE_NAMES`] order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalWeights {
    pub barcode_729: f64,
    pub made_in_israel_text: f64,
    pub hebrew_text: f64,
    pub israeli_brand: f64,
    pub kosher_certification: f64,
    pub brand_confidence: f64,
    pub text_confidence: f64,
    pub logo_confidence: f64,
    pub package_analysis: f64,
    pub color_analysis: f64,
}

impl Default for SignalWeights {
    fn default() -> Self {
        Self {
            barcode_729: 0.22,
            made_in_israel_text: 0.22,
            hebrew_text: 0.10,
            israeli_brand: 0.18,
            kosher_certification: 0.06,
            brand_confidence: 0.08,
            text_confidence: 0.05,
            logo_confidence: 0.03,
            package_analysis: 0.03,
            color_analysis: 0.03,
        }
    }
}

impl SignalWeights {
    fn as_array(&self) -> [f64; 10] {
        [
            self.barcode_729,
            self.made_in_israel_text,
            self.hebrew_text,
            self.israeli_brand,
            self.kosher_certification,
            self.brand_confidence,
            self.text_confidence,
            self.logo_confidence,
            self.package_analysis,
            self.color_analysis,
        ]
    }
}

/// Default verdict threshold on the normalized score.
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Outcome of scoring one feature vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub is_positive: bool,
    /// Probability of the winning class, always within [0.5, 1]
    pub confidence: f64,
    /// Normalized weighted score, within [0, 1]
    pub score: f64,
}

/// The scoring model: weights plus a verdict threshold.
#[derive(Debug, Clone)]
pub struct SignalModel {
    weights: SignalWeights,
    threshold: f64,
}

impl Default for SignalModel {
    fn default() -> Self {
        Self::new(SignalWeights::default(), DEFAULT_THRESHOLD)
    }
}

impl SignalModel {
    pub fn new(weights: SignalWeights, threshold: f64) -> Self {
        Self {
            weights,
            threshold: threshold.clamp(0.0, 1.0),
        }
    }

    /// Score a feature vector and derive the verdict.
    pub fn predict(&self, features: &FeatureVector) -> Prediction {
        let weights = self.weights.as_array();
        let inputs = features.as_inputs();
        let total: f64 = weights.iter().sum();

        let score = if total > 0.0 {
            weights
                .iter()
                .zip(inputs.iter())
                .map(|(w, x)| w * x.clamp(0.0, 1.0))
                .sum::<f64>()
                / total
        } else {
            0.0
        };
        let score = score.clamp(0.0, 1.0);

        Prediction {
            is_positive: score >= self.threshold,
            confidence: score.max(1.0 - score).clamp(0.0, 1.0),
            score,
        }
    }

    /// Model description served by `GET /model/info`.
    pub fn info(&self, brands_count: usize) -> ModelInfo {
        ModelInfo {
            status: "ready".to_string(),
            model_type: "weighted-signal".to_string(),
            feature_count: FEATURE_NAMES.len(),
            feature_names: FEATURE_NAMES.iter().map(|n| n.to_string()).collect(),
            brands_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_features_score_negative_with_high_confidence() {
        let model = SignalModel::default();
        let prediction = model.predict(&FeatureVector::default());
        assert!(!prediction.is_positive);
        assert_eq!(prediction.score, 0.0);
        assert_eq!(prediction.confidence, 1.0);
    }

    #[test]
    fn hard_evidence_flips_the_verdict() {
        let model = SignalModel::default();
        let features = FeatureVector {
            barcode_729: true,
            made_in_israel_text: true,
            israeli_brand: true,
            brand_confidence: 0.9,
            text_confidence: 0.8,
            ..Default::default()
        };
        let prediction = model.predict(&features);
        assert!(prediction.is_positive);
        assert!(prediction.confidence > 0.5);
    }

    #[test]
    fn soft_signals_alone_stay_below_threshold() {
        let model = SignalModel::default();
        let features = FeatureVector {
            logo_confidence: 1.0,
            package_analysis: 1.0,
            color_analysis: 1.0,
            text_confidence: 1.0,
            ..Default::default()
        };
        let prediction = model.predict(&features);
        assert!(!prediction.is_positive);
    }

    #[test]
    fn confidence_and_score_stay_within_unit_range() {
        let model = SignalModel::default();
        let features = FeatureVector {
            barcode_729: true,
            made_in_israel_text: true,
            hebrew_text: true,
            israeli_brand: true,
            kosher_certification: true,
            brand_confidence: 1.0,
            text_confidence: 1.0,
            logo_confidence: 1.0,
            package_analysis: 1.0,
            color_analysis: 1.0,
            brand_match: None,
        };
        let prediction = model.predict(&features);
        assert!((0.0..=1.0).contains(&prediction.score));
        assert!((0.5..=1.0).contains(&prediction.confidence));
        assert!(prediction.is_positive);
    }

    #[test]
    fn threshold_is_configurable() {
        let strict = SignalModel::new(SignalWeights::default(), 0.9);
        let features = FeatureVector {
            barcode_729: true,
            made_in_israel_text: true,
            israeli_brand: true,
            ..Default::default()
        };
        assert!(!strict.predict(&features).is_positive);
        assert!(SignalModel::default().predict(&features).is_positive);
    }

    #[test]
    fn info_reports_the_ten_inputs() {
        let info = SignalModel::default().info(10);
        assert_eq!(info.status, "ready");
        assert_eq!(info.feature_count, 10);
        assert_eq!(info.feature_names.len(), 10);
        assert_eq!(info.brands_count, 10);
    }
}
