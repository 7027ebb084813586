//! Glyph ink density - rasterizes a character and measures its coverage.

use crate::{AsciiError, Result};
use fontdue::{Font, FontSettings};
use std::path::Path;

/// Pixel size glyphs are rasterized at.
pub const GLYPH_SIZE: f32 = 100.0;

/// Side of the square canvas densities are normalized against.
pub const DENSITY_CANVAS: f32 = 2.0 * GLYPH_SIZE;

/// Row-major 8-bit coverage of a single rendered glyph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Coverage {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u8>,
}

impl Coverage {
    pub fn new(width: usize, height: usize, pixels: Vec<u8>) -> Self {
        Self { width, height, pixels }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Anything that can turn a character into a coverage map.
///
/// Implementations are shared across the threads that measure a palette,
/// so they must be `Sync`.
pub trait GlyphRasterizer: Sync {
    fn rasterize(&self, ch: char) -> Result<Coverage>;
}

/// fontdue-backed rasterizer at [`GLYPH_SIZE`].
pub struct FontRasterizer {
    font: Font,
}

impl FontRasterizer {
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let font = Font::from_bytes(data, FontSettings::default())
            .map_err(|e| AsciiError::Font(e.to_string()))?;
        Ok(Self { font })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read(path.as_ref())?;
        Self::from_bytes(data)
    }
}

impl GlyphRasterizer for FontRasterizer {
    fn rasterize(&self, ch: char) -> Result<Coverage> {
        // Index 0 is .notdef; whitespace may legitimately have no outline.
        if self.font.lookup_glyph_index(ch) == 0 {
            if ch.is_whitespace() {
                return Ok(Coverage::default());
            }
            return Err(AsciiError::Font(format!("font has no glyph for {ch:?}")));
        }

        let (metrics, bitmap) = self.font.rasterize(ch, GLYPH_SIZE);
        Ok(Coverage::new(metrics.width, metrics.height, bitmap))
    }
}

/// Ink density of `ch`: summed coverage over the glyph box padded toward
/// [`DENSITY_CANVAS`], so glyphs with different boxes stay comparable.
///
/// Empty glyphs yield 0. The result lies in [0, 1].
pub fn ink_density(rasterizer: &dyn GlyphRasterizer, ch: char) -> Result<f32> {
    let coverage = rasterizer.rasterize(ch)?;
    density_of(&coverage).ok_or_else(|| {
        AsciiError::Font(format!(
            "coverage for {ch:?} has {} pixels, expected {}x{}",
            coverage.pixels.len(),
            coverage.width,
            coverage.height
        ))
    })
}

fn density_of(coverage: &Coverage) -> Option<f32> {
    if coverage.pixels.len() != coverage.width * coverage.height {
        return None;
    }
    if coverage.is_empty() {
        return Some(0.0);
    }

    let (h, w) = (coverage.height as f32, coverage.width as f32);
    // Padding clamps to zero when the glyph box outgrows the canvas.
    let pad_h = ((DENSITY_CANVAS - h).max(0.0) / 2.0).ceil();
    let pad_w = ((DENSITY_CANVAS - w).max(0.0) / 2.0).ceil();
    let area = (pad_h + h) * (pad_w + w);

    let ink: f32 = coverage.pixels.iter().map(|&p| p as f32 / 255.0).sum();
    Some((ink / area).min(1.0))
}
