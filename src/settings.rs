//! JSON settings file for the command line tools.

use crate::glyph::FontRasterizer;
use crate::gradient::{Gradient, GradientOptions, Scaler};
use crate::normalize::{NormalizationMode, TargetSize};
use crate::presets::Preset;
use crate::{ConversionConfig, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Everything a converter can be set up from. Absent fields take defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub rows: Option<u32>,
    pub columns: Option<u32>,
    pub color: bool,
    pub mode: NormalizationMode,
    pub preset: Preset,
    /// Custom palette. Measured with `font` when one is given, otherwise
    /// taken as already ordered.
    pub palette: Option<String>,
    pub font: Option<PathBuf>,
    pub scaler: Scaler,
    pub mapping: bool,
    /// Size the output to the current terminal.
    pub fit_terminal: bool,
}

impl Settings {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&json)
    }

    pub fn size(&self) -> TargetSize {
        TargetSize::new(self.rows, self.columns)
    }

    pub fn gradient_options(&self) -> GradientOptions {
        GradientOptions { mapping: self.mapping, scaler: self.scaler }
    }

    pub fn gradient(&self) -> Result<Arc<Gradient>> {
        let Some(font) = &self.font else {
            return match &self.palette {
                Some(palette) => Ok(Arc::new(Gradient::ordered(palette)?)),
                None => Ok(self.preset.gradient()),
            };
        };

        if self.mapping && self.scaler == Scaler::Identity {
            log::warn!(
                "mapping without the minmax scaler leaves most intensities on the densest glyph"
            );
        }
        let rasterizer = FontRasterizer::from_path(font)?;
        let palette = self.palette.as_deref().unwrap_or(self.preset.palette());
        log::debug!("measuring {} glyphs from {}", palette.chars().count(), font.display());
        Ok(Arc::new(Gradient::build(palette, &rasterizer, self.gradient_options())?))
    }

    pub fn to_config(&self) -> Result<ConversionConfig> {
        Ok(ConversionConfig {
            size: self.size(),
            color: self.color,
            mode: self.mode,
            gradient: self.gradient()?,
        })
    }
}
