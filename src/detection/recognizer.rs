//! # Recognizer Seam
//!
//! OCR and barcode decoding are external collaborators: a deployment wires a
//! backend in behind the [`Recognizer`] trait. All downstream signal analysis
//! (origin phrases, script detection, certification marks, barcode prefixes,
//! brand matching) works on the [`Recognition`] the backend produced.

use anyhow::Result;
use image::RgbImage;

/// A piece of text recognized somewhere in the image.
#[derive(Debug, Clone, PartialEq)]
pub struct TextFragment {
    pub text: String,
    /// Recognizer-reported confidence for this fragment, in [0, 1]
    pub confidence: f64,
}

impl TextFragment {
    pub fn new(text: impl Into<String>, confidence: f64) -> Self {
        Self {
            text: text.into(),
            confidence,
        }
    }
}

/// Output of one recognizer pass over an image.
#[derive(Debug, Clone, Default)]
pub struct Recognition {
    pub fragments: Vec<TextFragment>,
    /// Decoded barcode payloads (digit strings)
    pub barcodes: Vec<String>,
}

impl Recognition {
    /// All fragment text above the confidence floor, joined with spaces.
    pub fn joined_text(&self, min_confidence: f64) -> String {
        self.fragments
            .iter()
            .filter(|f| f.confidence > min_confidence)
            .map(|f| f.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Pluggable text/barcode recognition backend.
pub trait Recognizer: Send + Sync {
    fn recognize(&self, image: &RgbImage) -> Result<Recognition>;
}

/// Recognizer that reports nothing.
///
/// Used when no OCR/barcode backend is configured; the service still serves
/// verdicts from visual statistics alone.
pub struct Disabled;

impl Recognizer for Disabled {
    fn recognize(&self, _image: &RgbImage) -> Result<Recognition> {
        Ok(Recognition::default())
    }
}
