//! # Image Processing
//!
//! Turns an uploaded payload into a normalized RGB frame and computes the
//! bounded visual statistics the scoring model consumes. Uploads are size
//! capped, decoded, and letterboxed onto a fixed canvas so downstream cost is
//! independent of the source resolution.

use image::imageops::{self, FilterType};
use image::{GrayImage, RgbImage};

use super::DetectError;

/// Maximum accepted payload when no limit is configured (10 MB).
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

const TARGET_WIDTH: u32 = 640;
const TARGET_HEIGHT: u32 = 480;

/// Gradient magnitude above which a pixel counts as an edge.
const EDGE_THRESHOLD: i32 = 60;

/// Decodes and normalizes uploaded images.
pub struct ImageProcessor {
    target_width: u32,
    target_height: u32,
    max_bytes: usize,
}

impl Default for ImageProcessor {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_IMAGE_BYTES)
    }
}

impl ImageProcessor {
    pub fn new(max_bytes: usize) -> Self {
        Self {
            target_width: TARGET_WIDTH,
            target_height: TARGET_HEIGHT,
            max_bytes,
        }
    }

    /// Validate, decode and letterbox an uploaded payload.
    ///
    /// # Returns
    /// - `Ok(RgbImage)`: the image centered on a black 640x480 canvas
    /// - `Err(DetectError::TooLarge)`: payload exceeds the configured cap
    /// - `Err(DetectError::InvalidImage)`: payload is not a decodable image
    pub fn process(&self, data: &[u8]) -> Result<RgbImage, DetectError> {
        if data.len() > self.max_bytes {
            return Err(DetectError::TooLarge {
                size: data.len(),
                max: self.max_bytes,
            });
        }
        let decoded = image::load_from_memory(data)?;
        Ok(self.letterbox(&decoded.to_rgb8()))
    }

    /// Resize preserving aspect ratio and center on a black canvas.
    fn letterbox(&self, image: &RgbImage) -> RgbImage {
        let (width, height) = image.dimensions();
        let scale = f64::min(
            self.target_width as f64 / width as f64,
            self.target_height as f64 / height as f64,
        );
        let new_width = ((width as f64 * scale) as u32).max(1);
        let new_height = ((height as f64 * scale) as u32).max(1);

        let resized = imageops::resize(image, new_width, new_height, FilterType::Triangle);

        let mut canvas = RgbImage::new(self.target_width, self.target_height);
        let x_offset = (self.target_width - new_width) / 2;
        let y_offset = (self.target_height - new_height) / 2;
        imageops::replace(&mut canvas, &resized, x_offset as i64, y_offset as i64);
        canvas
    }
}

/// Visual statistics of a processed frame, each within [0, 1].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VisualStats {
    /// Fraction of pixels lying on strong luma gradients; proxies logo and
    /// print detail
    pub edge_density: f64,
    /// Density of light/dark transitions along rows; proxies the structured
    /// text layout of printed packaging
    pub layout_density: f64,
    /// Occupancy of a coarse color histogram
    pub color_diversity: f64,
}

impl VisualStats {
    pub fn of(image: &RgbImage) -> Self {
        let luma = imageops::grayscale(image);
        Self {
            edge_density: edge_density(&luma),
            layout_density: layout_density(&luma),
            color_diversity: color_diversity(image),
        }
    }
}

fn edge_density(luma: &GrayImage) -> f64 {
    let (width, height) = luma.dimensions();
    if width < 3 || height < 3 {
        return 0.0;
    }
    let mut edges = 0u64;
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let gx = luma.get_pixel(x + 1, y).0[0] as i32 - luma.get_pixel(x - 1, y).0[0] as i32;
            let gy = luma.get_pixel(x, y + 1).0[0] as i32 - luma.get_pixel(x, y - 1).0[0] as i32;
            if gx.abs() + gy.abs() > EDGE_THRESHOLD {
                edges += 1;
            }
        }
    }
    let interior = ((width - 2) as u64) * ((height - 2) as u64);
    (edges as f64 / interior as f64).clamp(0.0, 1.0)
}

fn layout_density(luma: &GrayImage) -> f64 {
    let (width, height) = luma.dimensions();
    if width < 2 || height == 0 {
        return 0.0;
    }
    let pixels = (width as u64) * (height as u64);
    let mean = luma.pixels().map(|p| p.0[0] as u64).sum::<u64>() / pixels;
    let threshold = mean as u8;

    let mut transitions = 0u64;
    for y in 0..height {
        for x in 1..width {
            let prev = luma.get_pixel(x - 1, y).0[0] > threshold;
            let curr = luma.get_pixel(x, y).0[0] > threshold;
            if prev != curr {
                transitions += 1;
            }
        }
    }
    // Printed packaging lands well below one transition per pixel; scale so
    // typical label layouts fill the band.
    (transitions as f64 / pixels as f64 * 8.0).clamp(0.0, 1.0)
}

fn color_diversity(image: &RgbImage) -> f64 {
    const BINS: usize = 8;
    let mut histogram = [false; BINS * BINS * BINS];
    for pixel in image.pixels() {
        let r = (pixel.0[0] >> 5) as usize;
        let g = (pixel.0[1] >> 5) as usize;
        let b = (pixel.0[2] >> 5) as usize;
        histogram[(r * BINS + g) * BINS + b] = true;
    }
    let occupied = histogram.iter().filter(|&&b| b).count();
    (occupied as f64 / histogram.len() as f64 * 2.0).clamp(0.0, 1.0)
}
