//! # Detection Engine
//!
//! Everything that turns an uploaded image into a [`DetectionResult`]:
//!
//! ```text
//! bytes -> ImageProcessor -> Recognizer -> FeatureVector -> SignalModel
//!            (decode,         (OCR/         (ten model       (verdict +
//!             letterbox)       barcode)      inputs)          confidence)
//! ```
//!
//! ## Modules
//!
//! - [`processing`]: payload validation, decoding, letterboxing, visual stats
//! - [`recognizer`]: seam for external OCR/barcode backends
//! - [`brands`]: affiliated-brand database and text matching
//! - [`features`]: derives the ten model inputs
//! - [`model`]: weighted-signal scoring

pub mod brands;
pub mod features;
pub mod model;
pub mod processing;
pub mod recognizer;

use chrono::Utc;
use std::time::Instant;

use crate::common::types::{DetectionResult, ModelInfo};

pub use brands::BrandDatabase;
pub use features::FeatureVector;
pub use model::{SignalModel, SignalWeights};
pub use processing::{ImageProcessor, VisualStats, DEFAULT_MAX_IMAGE_BYTES};
pub use recognizer::{Recognition, Recognizer, TextFragment};

/// Errors raised while analyzing one image.
#[derive(Debug, thiserror::Error)]
pub enum DetectError {
    #[error("image exceeds the maximum size ({size} > {max} bytes)")]
    TooLarge { size: usize, max: usize },

    #[error("cannot decode image: {0}")]
    InvalidImage(#[from] image::ImageError),

    #[error("recognizer failed: {0}")]
    Recognizer(#[source] anyhow::Error),
}

impl DetectError {
    /// True when the failure was caused by the uploaded payload rather than
    /// the service itself. The server maps these to 400 responses.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            DetectError::TooLarge { .. } | DetectError::InvalidImage(_)
        )
    }
}

/// Composes processing, recognition, brand matching and scoring into the
/// per-request inference pipeline.
///
/// The engine is immutable once constructed and safe to share behind an
/// `Arc`; `analyze` is synchronous and CPU-bound, so callers on an async
/// runtime run it under `spawn_blocking`.
pub struct DetectionEngine {
    processor: ImageProcessor,
    brands: BrandDatabase,
    model: SignalModel,
    recognizer: Box<dyn Recognizer>,
}

impl DetectionEngine {
    /// Build an engine with the built-in brand database and no recognizer
    /// backend.
    pub fn new(model: SignalModel, max_image_bytes: usize) -> Self {
        Self {
            processor: ImageProcessor::new(max_image_bytes),
            brands: BrandDatabase::builtin(),
            model,
            recognizer: Box::new(recognizer::Disabled),
        }
    }

    /// Wire in an OCR/barcode backend.
    pub fn with_recognizer(mut self, recognizer: Box<dyn Recognizer>) -> Self {
        self.recognizer = recognizer;
        self
    }

    /// Analyze one uploaded image and produce the structured verdict.
    ///
    /// Stamps the result with the creation instant and the measured
    /// processing time; `brand_info` is attached only when a brand matched.
    pub fn analyze(&self, data: &[u8]) -> Result<DetectionResult, DetectError> {
        let started = Instant::now();

        let frame = self.processor.process(data)?;
        let stats = VisualStats::of(&frame);
        let recognition = self
            .recognizer
            .recognize(&frame)
            .map_err(DetectError::Recognizer)?;

        let features = FeatureVector::extract(&recognition, &stats, &self.brands);
        let prediction = self.model.predict(&features);
        let brand_info = features.brand_match.as_ref().map(|m| m.to_info());

        Ok(DetectionResult {
            is_israeli_product: prediction.is_positive,
            confidence: prediction.confidence,
            detected_features: features.detected(),
            brand_info,
            timestamp: Utc::now(),
            processing_time_ms: Some(started.elapsed().as_secs_f64() * 1000.0),
        })
    }

    /// Ready as soon as the engine is constructed; kept for the health and
    /// model-info endpoints.
    pub fn is_ready(&self) -> bool {
        true
    }

    pub fn model_info(&self) -> ModelInfo {
        self.model.info(self.brands.len())
    }

    pub fn brands(&self) -> &BrandDatabase {
        &self.brands
    }
}

impl Default for DetectionEngine {
    fn default() -> Self {
        Self::new(SignalModel::default(), DEFAULT_MAX_IMAGE_BYTES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use image::{Rgb, RgbImage};

    /// Test backend returning a canned recognition for every frame.
    struct StaticRecognizer(Recognition);

    impl Recognizer for StaticRecognizer {
        fn recognize(&self, _image: &RgbImage) -> Result<Recognition> {
            Ok(self.0.clone())
        }
    }

    fn png_bytes() -> Vec<u8> {
        let image = RgbImage::from_fn(64, 48, |x, y| {
            if (x + y) % 2 == 0 {
                Rgb([200, 40, 40])
            } else {
                Rgb([40, 40, 200])
            }
        });
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgb8(image)
            .write_to(
                &mut std::io::Cursor::new(&mut buf),
                image::ImageOutputFormat::Png,
            )
            .unwrap();
        buf
    }

    #[test]
    fn bare_engine_returns_a_negative_verdict() {
        let engine = DetectionEngine::default();
        let result = engine.analyze(&png_bytes()).unwrap();
        assert!(!result.is_israeli_product);
        assert!((0.0..=1.0).contains(&result.confidence));
        assert!(result.brand_info.is_none());
        assert!(result.processing_time_ms.unwrap() >= 0.0);
    }

    #[test]
    fn recognized_evidence_produces_a_positive_verdict() {
        let recognition = Recognition {
            fragments: vec![
                TextFragment::new("NESCAFE gold blend", 0.95),
                TextFragment::new("made in israel", 0.9),
            ],
            barcodes: vec!["7290001234567".to_string()],
        };
        let engine =
            DetectionEngine::default().with_recognizer(Box::new(StaticRecognizer(recognition)));

        let result = engine.analyze(&png_bytes()).unwrap();
        assert!(result.is_israeli_product);
        assert!(result.confidence > 0.5);
        assert!(result.detected_features.barcode_729);
        assert!(result.detected_features.made_in_israel_text);
        assert!(result.detected_features.israeli_brand);

        let brand = result.brand_info.unwrap();
        assert_eq!(brand.name, "nescafe");
        assert_eq!(brand.category, "food_beverage");
    }

    #[test]
    fn engine_reports_model_info() {
        let info = DetectionEngine::default().model_info();
        assert_eq!(info.feature_count, 10);
        assert_eq!(info.brands_count, 10);
        assert_eq!(info.status, "ready");
    }

    #[test]
    fn oversized_payload_is_a_client_error() {
        let engine = DetectionEngine::new(SignalModel::default(), 8);
        let err = engine.analyze(&png_bytes()).unwrap_err();
        assert!(err.is_client_error());
    }
}
