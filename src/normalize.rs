//! Image normalization - resizes to the output grid and reduces RGB to one scalar.

use crate::{AsciiError, Result};
use image::imageops::{self, FilterType};
use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Output width used when no dimension is requested.
pub const DEFAULT_WIDTH: u32 = 100;

// Perceptual weights for (R, G, B).
const LUMA_WEIGHTS: [f32; 3] = [0.2989, 0.5870, 0.1140];

/// Photometric formula reducing a pixel to one intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalizationMode {
    #[default]
    Luminance,
    Lightness,
    Average,
    /// Sum of the pixel's unit vector: 0 for black, otherwise in [1, sqrt(3)].
    /// Not on the 0..=255 scale.
    Norm,
}

impl NormalizationMode {
    pub const ALL: [NormalizationMode; 4] = [
        NormalizationMode::Luminance,
        NormalizationMode::Lightness,
        NormalizationMode::Average,
        NormalizationMode::Norm,
    ];

    pub fn name(self) -> &'static str {
        match self {
            NormalizationMode::Luminance => "luminance",
            NormalizationMode::Lightness => "lightness",
            NormalizationMode::Average => "average",
            NormalizationMode::Norm => "norm",
        }
    }

    #[inline]
    pub fn reduce(self, [r, g, b]: [u8; 3]) -> f32 {
        let (r, g, b) = (r as f32, g as f32, b as f32);
        match self {
            NormalizationMode::Luminance => {
                LUMA_WEIGHTS[0] * r + LUMA_WEIGHTS[1] * g + LUMA_WEIGHTS[2] * b
            }
            NormalizationMode::Lightness => (r.max(g).max(b) + r.min(g).min(b)) / 2.0,
            NormalizationMode::Average => (r + g + b) / 3.0,
            NormalizationMode::Norm => {
                let norm = (r * r + g * g + b * b).sqrt();
                if norm == 0.0 {
                    0.0
                } else {
                    (r + g + b) / norm
                }
            }
        }
    }
}

impl FromStr for NormalizationMode {
    type Err = AsciiError;

    fn from_str(s: &str) -> Result<Self> {
        NormalizationMode::ALL
            .into_iter()
            .find(|mode| mode.name() == s)
            .ok_or_else(|| AsciiError::Configuration(format!("unknown normalization mode: {s}")))
    }
}

impl fmt::Display for NormalizationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Requested output grid. A missing dimension is derived from the source
/// aspect ratio; with neither, the width defaults to [`DEFAULT_WIDTH`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TargetSize {
    pub rows: Option<u32>,
    pub columns: Option<u32>,
}

impl TargetSize {
    pub fn new(rows: Option<u32>, columns: Option<u32>) -> Self {
        Self { rows, columns }
    }

    pub fn exact(rows: u32, columns: u32) -> Self {
        Self::new(Some(rows), Some(columns))
    }

    pub fn columns(columns: u32) -> Self {
        Self::new(None, Some(columns))
    }

    pub fn rows(rows: u32) -> Self {
        Self::new(Some(rows), None)
    }

    /// Pin the smaller terminal dimension and let the other follow the image.
    pub fn fit_terminal(columns: u16, lines: u16) -> Self {
        if lines < columns {
            Self::rows(lines as u32)
        } else {
            Self::columns(columns as u32)
        }
    }

    /// Output `(width, height)` for a `src_width` x `src_height` source.
    pub fn resolve(self, src_width: u32, src_height: u32) -> Result<(u32, u32)> {
        if src_width == 0 || src_height == 0 {
            return Err(AsciiError::Configuration(format!(
                "source image is empty ({src_width}x{src_height})"
            )));
        }
        if self.rows == Some(0) || self.columns == Some(0) {
            return Err(AsciiError::Configuration("target size must be non-zero".into()));
        }

        let ratio = src_height as f64 / src_width as f64;
        let derive = |v: f64| (v.round() as u32).max(1);

        Ok(match (self.rows, self.columns) {
            (Some(rows), Some(columns)) => (columns, rows),
            (None, Some(columns)) => (columns, derive(columns as f64 * ratio)),
            (Some(rows), None) => (derive(rows as f64 / ratio), rows),
            (None, None) => (DEFAULT_WIDTH, derive(DEFAULT_WIDTH as f64 * ratio)),
        })
    }
}

/// Row-major per-cell intensities.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarGrid {
    pub width: u32,
    pub height: u32,
    pub values: Vec<f32>,
}

impl ScalarGrid {
    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.values[(y * self.width + x) as usize]
    }
}

/// Validate a raw interleaved buffer and wrap it as an RGB image.
pub fn rgb_from_raw(data: Vec<u8>, width: u32, height: u32, channels: usize) -> Result<RgbImage> {
    if channels != 3 {
        return Err(AsciiError::InvalidImage(format!("expected 3 channels, got {channels}")));
    }
    let expected = width as usize * height as usize * 3;
    if data.len() != expected {
        return Err(AsciiError::InvalidImage(format!(
            "buffer holds {} bytes, {width}x{height}x3 needs {expected}",
            data.len()
        )));
    }
    RgbImage::from_raw(width, height, data)
        .ok_or_else(|| AsciiError::InvalidImage("buffer does not fit dimensions".into()))
}

/// Resize to exactly `width` x `height`, skipping work when nothing changes.
pub fn resize_rgb(image: &RgbImage, width: u32, height: u32) -> RgbImage {
    if image.dimensions() == (width, height) {
        return image.clone();
    }
    imageops::resize(image, width, height, FilterType::Triangle)
}

/// Reduce an image already at grid size to per-cell scalars.
pub fn reduce(image: &RgbImage, mode: NormalizationMode) -> ScalarGrid {
    let values = image.pixels().map(|p| mode.reduce(p.0)).collect();
    ScalarGrid { width: image.width(), height: image.height(), values }
}

pub fn normalize(image: &RgbImage, mode: NormalizationMode, size: TargetSize) -> Result<ScalarGrid> {
    let (width, height) = size.resolve(image.width(), image.height())?;
    Ok(reduce(&resize_rgb(image, width, height), mode))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_luminance_extremes() {
        let white = NormalizationMode::Luminance.reduce([255, 255, 255]);
        assert!((white - 255.0).abs() < 0.1);
        assert_eq!(NormalizationMode::Luminance.reduce([0, 0, 0]), 0.0);
    }

    #[test]
    fn test_luminance_weights_follow_channel_order() {
        let red = NormalizationMode::Luminance.reduce([255, 0, 0]);
        let blue = NormalizationMode::Luminance.reduce([0, 0, 255]);
        assert!((red - 0.2989 * 255.0).abs() < 1e-3);
        assert!((blue - 0.1140 * 255.0).abs() < 1e-3);
    }

    #[test]
    fn test_lightness_and_average() {
        assert_eq!(NormalizationMode::Lightness.reduce([200, 100, 0]), 100.0);
        assert_eq!(NormalizationMode::Average.reduce([30, 60, 90]), 60.0);
    }

    #[test]
    fn test_norm_mode_range() {
        assert_eq!(NormalizationMode::Norm.reduce([0, 0, 0]), 0.0);
        assert!((NormalizationMode::Norm.reduce([9, 0, 0]) - 1.0).abs() < 1e-6);
        assert!((NormalizationMode::Norm.reduce([5, 5, 5]) - 3f32.sqrt()).abs() < 1e-5);
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("lightness".parse::<NormalizationMode>().unwrap(), NormalizationMode::Lightness);
        assert!(matches!(
            "bogus".parse::<NormalizationMode>(),
            Err(AsciiError::Configuration(_))
        ));
    }

    #[test]
    fn test_resolve_width_only() {
        assert_eq!(TargetSize::columns(50).resolve(400, 200).unwrap(), (50, 25));
    }

    #[test]
    fn test_resolve_height_only() {
        assert_eq!(TargetSize::rows(25).resolve(400, 200).unwrap(), (50, 25));
    }

    #[test]
    fn test_resolve_exact_ignores_aspect() {
        assert_eq!(TargetSize::exact(10, 70).resolve(400, 200).unwrap(), (70, 10));
    }

    #[test]
    fn test_resolve_default_width() {
        assert_eq!(TargetSize::default().resolve(400, 200).unwrap(), (DEFAULT_WIDTH, 50));
    }

    #[test]
    fn test_resolve_rejects_zero() {
        assert!(TargetSize::columns(0).resolve(10, 10).is_err());
        assert!(TargetSize::columns(5).resolve(0, 10).is_err());
    }

    #[test]
    fn test_fit_terminal_pins_smaller_side() {
        assert_eq!(TargetSize::fit_terminal(120, 40), TargetSize::rows(40));
        assert_eq!(TargetSize::fit_terminal(40, 120), TargetSize::columns(40));
    }

    #[test]
    fn test_normalize_shape() {
        let image = RgbImage::from_pixel(400, 200, Rgb([255, 255, 255]));
        let grid = normalize(&image, NormalizationMode::Average, TargetSize::columns(50)).unwrap();
        assert_eq!((grid.width, grid.height), (50, 25));
        assert_eq!(grid.values.len(), 50 * 25);
        assert!((grid.get(10, 10) - 255.0).abs() < 1.0);
    }

    #[test]
    fn test_rgb_from_raw_rejects_channels() {
        assert!(matches!(rgb_from_raw(vec![0; 16], 2, 2, 4), Err(AsciiError::InvalidImage(_))));
        assert!(matches!(rgb_from_raw(vec![0; 11], 2, 2, 3), Err(AsciiError::InvalidImage(_))));
        assert!(rgb_from_raw(vec![0; 12], 2, 2, 3).is_ok());
    }
}
