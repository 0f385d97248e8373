//! # Signal Analysis
//!
//! Derives the ten model inputs (five boolean packaging signals plus five
//! soft confidences) from a recognizer pass and the visual statistics of the
//! processed frame.

use crate::common::types::DetectedFeatures;

use super::brands::{BrandDatabase, BrandMatch};
use super::processing::VisualStats;
use super::recognizer::Recognition;

/// Model input names, in model order.
pub const FEATURE_NAMES: [&str; 10] = [
    "barcode_729",
    "made_in_israel_text",
    "hebrew_text",
    "israeli_brand",
    "kosher_certification",
    "brand_confidence",
    "text_confidence",
    "logo_confidence",
    "package_analysis",
    "color_analysis",
];

/// Fragments at or below this confidence are ignored for text analysis.
const MIN_FRAGMENT_CONFIDENCE: f64 = 0.5;

/// Israeli EAN/UPC country prefix.
const BARCODE_PREFIX: &str = "729";

/// Origin-label phrases, matched against normalized text.
const ORIGIN_PHRASES: [&str; 6] = [
    "made in israel",
    "product of israel",
    "manufactured in israel",
    "produced in israel",
    "israeli product",
    "israel",
];

/// Certification-mark vocabulary.
const CERTIFICATION_MARKS: [&str; 11] = [
    "kosher", "badatz", "kof-k", "star-k", "kashrus", "pareve", "halal", "dairy", "meat", "ⓤ",
    "ⓚ",
];

/// The full set of model inputs extracted from one image.
#[derive(Debug, Clone, Default)]
pub struct FeatureVector {
    pub barcode_729: bool,
    pub made_in_israel_text: bool,
    pub hebrew_text: bool,
    pub israeli_brand: bool,
    pub kosher_certification: bool,
    pub brand_confidence: f64,
    pub text_confidence: f64,
    pub logo_confidence: f64,
    pub package_analysis: f64,
    pub color_analysis: f64,
    /// The brand that set `israeli_brand`, if any
    pub brand_match: Option<BrandMatch>,
}

impl FeatureVector {
    /// Derive all inputs from a recognition pass and visual statistics.
    pub fn extract(
        recognition: &Recognition,
        stats: &VisualStats,
        brands: &BrandDatabase,
    ) -> Self {
        let text = normalize(&recognition.joined_text(MIN_FRAGMENT_CONFIDENCE));
        let brand_match = brands.match_text(&text);

        Self {
            barcode_729: barcode_prefix_match(recognition),
            made_in_israel_text: ORIGIN_PHRASES.iter().any(|p| text.contains(p)),
            hebrew_text: contains_hebrew(&text),
            israeli_brand: brand_match.is_some(),
            kosher_certification: CERTIFICATION_MARKS.iter().any(|m| text.contains(m)),
            brand_confidence: brand_match.as_ref().map_or(0.0, |m| m.confidence),
            text_confidence: mean_text_confidence(recognition),
            logo_confidence: stats.edge_density,
            package_analysis: stats.layout_density,
            color_analysis: stats.color_diversity,
            brand_match,
        }
    }

    /// The five wire-contract booleans.
    pub fn detected(&self) -> DetectedFeatures {
        DetectedFeatures {
            barcode_729: self.barcode_729,
            made_in_israel_text: self.made_in_israel_text,
            hebrew_text: self.hebrew_text,
            israeli_brand: self.israeli_brand,
            kosher_certification: self.kosher_certification,
        }
    }

    /// Inputs as numbers in [`FEATURE_NAMES`] order, booleans as 0/1.
    pub fn as_inputs(&self) -> [f64; 10] {
        [
            self.barcode_729 as u8 as f64,
            self.made_in_israel_text as u8 as f64,
            self.hebrew_text as u8 as f64,
            self.israeli_brand as u8 as f64,
            self.kosher_certification as u8 as f64,
            self.brand_confidence,
            self.text_confidence,
            self.logo_confidence,
            self.package_analysis,
            self.color_analysis,
        ]
    }
}

/// Lowercase and collapse whitespace runs to single spaces.
fn normalize(text: &str) -> String {
    text.to_lowercase().split_whitespace().collect::<Vec<_>>().join(" ")
}

fn contains_hebrew(text: &str) -> bool {
    text.chars().any(|c| ('\u{0590}'..='\u{05FF}').contains(&c))
}

/// Israeli barcode prefix, from decoded barcodes or from digit runs the
/// recognizer read off the label (spaces and hyphens stripped, at least 8
/// digits long).
fn barcode_prefix_match(recognition: &Recognition) -> bool {
    if recognition
        .barcodes
        .iter()
        .any(|code| code.starts_with(BARCODE_PREFIX))
    {
        return true;
    }
    recognition.fragments.iter().any(|fragment| {
        let digits: String = fragment
            .text
            .chars()
            .filter(|c| *c != ' ' && *c != '-')
            .collect();
        digits.len() >= 8 && digits.chars().all(|c| c.is_ascii_digit()) && digits.starts_with(BARCODE_PREFIX)
    })
}

/// Confident fragments averaged over everything the recognizer returned, so a
/// noisy pass with many weak fragments scores low.
fn mean_text_confidence(recognition: &Recognition) -> f64 {
    if recognition.fragments.is_empty() {
        return 0.0;
    }
    let confident: f64 = recognition
        .fragments
        .iter()
        .filter(|f| f.confidence > MIN_FRAGMENT_CONFIDENCE)
        .map(|f| f.confidence)
        .sum();
    (confident / recognition.fragments.len() as f64).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::recognizer::TextFragment;

    fn recognition(fragments: &[(&str, f64)], barcodes: &[&str]) -> Recognition {
        Recognition {
            fragments: fragments
                .iter()
                .map(|(t, c)| TextFragment::new(*t, *c))
                .collect(),
            barcodes: barcodes.iter().map(|b| b.to_string()).collect(),
        }
    }

    fn extract(fragments: &[(&str, f64)], barcodes: &[&str]) -> FeatureVector {
        FeatureVector::extract(
            &recognition(fragments, barcodes),
            &VisualStats::default(),
            &BrandDatabase::builtin(),
        )
    }

    #[test]
    fn origin_label_sets_text_signal() {
        let features = extract(&[("Made  In\nISRAEL", 0.9)], &[]);
        assert!(features.made_in_israel_text);
        assert!(!features.barcode_729);
    }

    #[test]
    fn hebrew_script_is_detected() {
        let features = extract(&[("תוצרת ישראל", 0.8)], &[]);
        assert!(features.hebrew_text);
        // Hebrew phrasing of the origin label is not in the phrase list
        assert!(!features.made_in_israel_text);
    }

    #[test]
    fn decoded_barcode_prefix_matches() {
        let features = extract(&[], &["7290001234567"]);
        assert!(features.barcode_729);
    }

    #[test]
    fn digit_run_fallback_matches_prefix() {
        let features = extract(&[("729-000 1234-567", 0.4)], &[]);
        assert!(features.barcode_729);
    }

    #[test]
    fn short_or_non_numeric_runs_do_not_match() {
        assert!(!extract(&[("7290abc", 0.9)], &[]).barcode_729);
        assert!(!extract(&[("7290123", 0.9)], &[]).barcode_729);
    }

    #[test]
    fn foreign_barcode_does_not_match() {
        assert!(!extract(&[], &["8991234567890"]).barcode_729);
    }

    #[test]
    fn brand_match_sets_flag_and_confidence() {
        let features = extract(&[("NESCAFE gold", 0.95)], &[]);
        assert!(features.israeli_brand);
        assert_eq!(features.brand_confidence, 0.9);
        assert_eq!(features.brand_match.as_ref().unwrap().company, "nestle");
    }

    #[test]
    fn low_confidence_fragments_are_ignored_for_text_signals() {
        let features = extract(&[("made in israel", 0.3)], &[]);
        assert!(!features.made_in_israel_text);
    }

    #[test]
    fn certification_vocabulary_is_detected() {
        let features = extract(&[("Badatz certified", 0.9)], &[]);
        assert!(features.kosher_certification);
    }

    #[test]
    fn text_confidence_averages_over_all_fragments() {
        let features = extract(&[("alpha", 0.8), ("noise", 0.2)], &[]);
        // Only the 0.8 fragment counts, averaged over both fragments
        assert!((features.text_confidence - 0.4).abs() < 1e-9);
    }

    #[test]
    fn detected_features_mirror_the_booleans() {
        let features = extract(&[("made in israel badatz", 0.9)], &["7291"]);
        let detected = features.detected();
        assert!(detected.made_in_israel_text);
        assert!(detected.kosher_certification);
        assert!(detected.barcode_729);
        assert!(!detected.hebrew_text);
    }
}
