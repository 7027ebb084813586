//! Image to character art using glyph ink-density gradients.

pub mod glyph;
pub mod gradient;
pub mod grid;
pub mod normalize;
pub mod presets;
pub mod settings;

pub use glyph::{ink_density, Coverage, FontRasterizer, GlyphRasterizer};
pub use gradient::{measure_palette, DensityEntry, Gradient, GradientOptions, Scaler};
pub use grid::{Cell, CellGrid, Glyph};
pub use normalize::{NormalizationMode, ScalarGrid, TargetSize, DEFAULT_WIDTH};
pub use presets::Preset;
pub use settings::Settings;

use gradient::{mapped_match, ordered_match, Repr};
use image::{DynamicImage, RgbImage};
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AsciiError {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Font error: {0}")]
    Font(String),
    #[error("Invalid image: {0}")]
    InvalidImage(String),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AsciiError>;

/// Settings for one converter. Replaced whole, never edited in place.
#[derive(Debug, Clone)]
pub struct ConversionConfig {
    pub size: TargetSize,
    pub color: bool,
    pub mode: NormalizationMode,
    pub gradient: Arc<Gradient>,
}

impl ConversionConfig {
    pub fn new(gradient: Arc<Gradient>) -> Self {
        Self {
            size: TargetSize::columns(DEFAULT_WIDTH),
            color: false,
            mode: NormalizationMode::Luminance,
            gradient,
        }
    }
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self::new(Preset::default().gradient())
    }
}

/// Converts RGB frames into mirrored character grids.
///
/// The configuration can be swapped from another thread while a conversion
/// runs; each conversion works from the snapshot taken when it starts.
pub struct Converter {
    config: RwLock<Arc<ConversionConfig>>,
}

impl Converter {
    pub fn new(gradient: Arc<Gradient>) -> Self {
        Self::from_config(ConversionConfig::new(gradient))
    }

    pub fn from_config(config: ConversionConfig) -> Self {
        Self { config: RwLock::new(Arc::new(config)) }
    }

    pub fn with_size(self, size: TargetSize) -> Self {
        self.map_config(|c| c.size = size)
    }

    pub fn with_color(self, enabled: bool) -> Self {
        self.map_config(|c| c.color = enabled)
    }

    pub fn with_mode(self, mode: NormalizationMode) -> Self {
        self.map_config(|c| c.mode = mode)
    }

    pub fn with_gradient(self, gradient: Arc<Gradient>) -> Self {
        self.map_config(|c| c.gradient = gradient)
    }

    fn map_config(self, f: impl FnOnce(&mut ConversionConfig)) -> Self {
        let mut config = (*self.config()).clone();
        f(&mut config);
        Self::from_config(config)
    }

    pub fn config(&self) -> Arc<ConversionConfig> {
        Arc::clone(&self.config.read().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn replace_config(&self, config: ConversionConfig) {
        *self.config.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(config);
    }

    /// Convert `image` to a grid of cells. With `to_ascii` false each cell
    /// holds the matched entry's intensity instead of its character.
    pub fn convert(&self, image: &RgbImage, to_ascii: bool) -> Result<CellGrid> {
        convert_with(&self.config(), image, to_ascii)
    }

    /// Convert an interleaved buffer, rejecting anything but 3 channels.
    pub fn convert_raw(
        &self,
        data: Vec<u8>,
        width: u32,
        height: u32,
        channels: usize,
        to_ascii: bool,
    ) -> Result<CellGrid> {
        let image = normalize::rgb_from_raw(data, width, height, channels)?;
        self.convert(&image, to_ascii)
    }

    pub fn convert_dynamic(&self, image: &DynamicImage, to_ascii: bool) -> Result<CellGrid> {
        self.convert(&image.to_rgb8(), to_ascii)
    }

    pub fn convert_path(&self, path: impl AsRef<Path>, to_ascii: bool) -> Result<CellGrid> {
        let image = image::open(path.as_ref())?;
        self.convert_dynamic(&image, to_ascii)
    }

    /// Convert and render for a terminal using the configured color flag.
    pub fn convert_to_terminal(&self, image: &RgbImage) -> Result<String> {
        let config = self.config();
        let grid = convert_with(&config, image, true)?;
        Ok(grid.to_terminal(config.color))
    }
}

fn convert_with(config: &ConversionConfig, image: &RgbImage, to_ascii: bool) -> Result<CellGrid> {
    let (width, height) = config.size.resolve(image.width(), image.height())?;
    log::debug!(
        "converting {}x{} -> {width}x{height} ({}, color {})",
        image.width(),
        image.height(),
        config.mode,
        config.color
    );

    let resized = normalize::resize_rgb(image, width, height);
    let scalars = normalize::reduce(&resized, config.mode);
    let want_intensity = !to_ascii;

    let cells = match config.gradient.repr() {
        Repr::Ordered(chars) => fill_cells(&scalars, &resized, config.color, |v| {
            ordered_match(chars, v, want_intensity)
        }),
        Repr::Mapped(table) => fill_cells(&scalars, &resized, config.color, |v| {
            mapped_match(table, v, want_intensity)
        }),
    };

    CellGrid::new(width, height, cells)
}

// Rows are walked right to left to undo camera mirroring.
fn fill_cells(
    scalars: &ScalarGrid,
    colors: &RgbImage,
    color: bool,
    lookup: impl Fn(f32) -> Glyph,
) -> Vec<Cell> {
    let width = scalars.width as usize;
    let mut cells = Vec::with_capacity(scalars.values.len());

    let color_rows = colors.as_raw().chunks_exact(width * 3);
    for (row, color_row) in scalars.values.chunks_exact(width).zip(color_rows) {
        for (&value, px) in row.iter().zip(color_row.chunks_exact(3)).rev() {
            let rgb = color.then(|| [px[0], px[1], px[2]]);
            cells.push(Cell { glyph: lookup(value), rgb });
        }
    }
    cells
}
