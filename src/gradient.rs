//! Character gradients ordered by ink density, and intensity lookup.

use crate::glyph::{ink_density, GlyphRasterizer};
use crate::grid::Glyph;
use crate::{AsciiError, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;

/// Top of the pixel intensity range gradients are indexed by.
pub const MAX_INTENSITY: f32 = 255.0;

/// Rescaling applied to measured densities before ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scaler {
    #[default]
    Identity,
    /// Stretch densities to [0, 1]. No-op unless at least two values differ.
    MinMax,
}

impl Scaler {
    pub fn apply(self, values: &mut [f32]) {
        if self == Scaler::Identity {
            return;
        }
        let min = values.iter().copied().fold(f32::INFINITY, f32::min);
        let max = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let span = max - min;
        if span > 0.0 {
            values.iter_mut().for_each(|v| *v = (*v - min) / span);
        }
    }
}

impl FromStr for Scaler {
    type Err = AsciiError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "identity" | "none" => Ok(Scaler::Identity),
            "minmax" => Ok(Scaler::MinMax),
            other => Err(AsciiError::Configuration(format!("unknown scaler: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GradientOptions {
    /// Build a density -> character table instead of an ordered ramp.
    pub mapping: bool,
    pub scaler: Scaler,
}

/// A measured palette character.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DensityEntry {
    pub ch: char,
    pub density: f32,
}

/// Immutable character gradient, darkest ink first.
///
/// Only built through [`Gradient::ordered`], [`Gradient::mapped`] or
/// [`Gradient::build`], so it is never empty and mapped keys are ascending
/// and unique.
#[derive(Debug, Clone, PartialEq)]
pub struct Gradient {
    repr: Repr,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Repr {
    /// Characters indexed linearly by intensity.
    Ordered(Vec<char>),
    /// Unique intensity keys (ascending) searched for the nearest match.
    Mapped(Vec<(f32, char)>),
}

impl Gradient {
    /// Takes `palette` as already ordered. No glyph is rasterized.
    pub fn ordered(palette: &str) -> Result<Self> {
        let chars: Vec<char> = palette.chars().collect();
        if chars.is_empty() {
            return Err(AsciiError::Configuration("palette is empty".into()));
        }
        Ok(Self { repr: Repr::Ordered(chars) })
    }

    /// Ordered gradient over a built-in, non-empty palette.
    pub(crate) fn from_static(palette: &'static str) -> Self {
        Self { repr: Repr::Ordered(palette.chars().collect()) }
    }

    /// Intensity -> character table. Keys must be finite; they are sorted
    /// and, when repeated, the first entry given for a key wins.
    pub fn mapped(mut table: Vec<(f32, char)>) -> Result<Self> {
        if table.is_empty() {
            return Err(AsciiError::Configuration("density table is empty".into()));
        }
        if let Some(&(key, ch)) = table.iter().find(|(key, _)| !key.is_finite()) {
            return Err(AsciiError::Configuration(format!(
                "density key {key} for {ch:?} is not finite"
            )));
        }

        // stable, so equal keys keep their input order
        table.sort_by(|a, b| a.0.total_cmp(&b.0));
        let before = table.len();
        table.dedup_by(|later, earlier| later.0 == earlier.0);
        let dropped = before - table.len();
        if dropped > 0 {
            log::debug!("{dropped} characters collided on density and were dropped");
        }
        Ok(Self { repr: Repr::Mapped(table) })
    }

    /// Measures every distinct palette character and orders them by density.
    ///
    /// In mapping mode each key is the scaled density times [`MAX_INTENSITY`].
    /// When two characters share a key the first in (density, char) order wins,
    /// so the lower code point is kept.
    pub fn build(
        palette: &str,
        rasterizer: &dyn GlyphRasterizer,
        options: GradientOptions,
    ) -> Result<Self> {
        let entries = measure_palette(palette, rasterizer, options.scaler)?;
        if options.mapping {
            Self::mapped(entries.iter().map(|e| (e.density * MAX_INTENSITY, e.ch)).collect())
        } else {
            Ok(Self { repr: Repr::Ordered(entries.iter().map(|e| e.ch).collect()) })
        }
    }

    pub(crate) fn repr(&self) -> &Repr {
        &self.repr
    }

    /// The (intensity, char) table of a mapped gradient.
    pub fn table(&self) -> Option<&[(f32, char)]> {
        match &self.repr {
            Repr::Ordered(_) => None,
            Repr::Mapped(table) => Some(table),
        }
    }

    pub fn len(&self) -> usize {
        match &self.repr {
            Repr::Ordered(chars) => chars.len(),
            Repr::Mapped(table) => table.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Characters from darkest to brightest.
    pub fn chars(&self) -> Vec<char> {
        match &self.repr {
            Repr::Ordered(chars) => chars.clone(),
            Repr::Mapped(table) => table.iter().map(|&(_, ch)| ch).collect(),
        }
    }

    /// Character used for the lowest intensity.
    pub fn darkest(&self) -> char {
        self.closest_char(0.0)
    }

    pub fn closest_char(&self, intensity: f32) -> char {
        match &self.repr {
            Repr::Ordered(chars) => chars[ordered_index(chars.len(), intensity)],
            Repr::Mapped(table) => table[mapped_index(table, intensity)].1,
        }
    }

    /// Best character for `intensity` in [0, 255], or with `want_intensity`
    /// the canonical intensity of the matched entry. Out-of-range input is
    /// clamped and NaN is read as 0.
    pub fn closest_match(&self, intensity: f32, want_intensity: bool) -> Glyph {
        match &self.repr {
            Repr::Ordered(chars) => ordered_match(chars, intensity, want_intensity),
            Repr::Mapped(table) => mapped_match(table, intensity, want_intensity),
        }
    }
}

fn clamp_intensity(intensity: f32) -> f32 {
    if intensity.is_nan() {
        0.0
    } else {
        intensity.clamp(0.0, MAX_INTENSITY)
    }
}

pub(crate) fn ordered_index(len: usize, intensity: f32) -> usize {
    let last = len - 1;
    let value = clamp_intensity(intensity);
    ((value / MAX_INTENSITY * last as f32).round() as usize).min(last)
}

pub(crate) fn ordered_match(chars: &[char], intensity: f32, want_intensity: bool) -> Glyph {
    let index = ordered_index(chars.len(), intensity);
    if !want_intensity {
        return Glyph::Char(chars[index]);
    }
    let last = chars.len() - 1;
    let level = if last == 0 { 0.0 } else { index as f32 / last as f32 * MAX_INTENSITY };
    Glyph::Intensity(level)
}

pub(crate) fn mapped_index(table: &[(f32, char)], intensity: f32) -> usize {
    let value = clamp_intensity(intensity);
    let upper = table.partition_point(|&(key, _)| key < value);

    if upper == 0 {
        0
    } else if upper == table.len() {
        upper - 1
    } else if value - table[upper - 1].0 <= table[upper].0 - value {
        // ties go to the smaller key
        upper - 1
    } else {
        upper
    }
}

pub(crate) fn mapped_match(table: &[(f32, char)], intensity: f32, want_intensity: bool) -> Glyph {
    let (key, ch) = table[mapped_index(table, intensity)];
    if want_intensity {
        Glyph::Intensity(key)
    } else {
        Glyph::Char(ch)
    }
}

/// Densities of the distinct characters in `palette`, scaled and sorted by
/// (density, char).
pub fn measure_palette(
    palette: &str,
    rasterizer: &dyn GlyphRasterizer,
    scaler: Scaler,
) -> Result<Vec<DensityEntry>> {
    let unique: BTreeSet<char> = palette.chars().collect();
    if unique.is_empty() {
        return Err(AsciiError::Configuration("palette is empty".into()));
    }
    let chars: Vec<char> = unique.into_iter().collect();

    let mut densities = chars
        .par_iter()
        .map(|&ch| ink_density(rasterizer, ch))
        .collect::<Result<Vec<f32>>>()?;
    scaler.apply(&mut densities);

    let mut entries: Vec<DensityEntry> = chars
        .into_iter()
        .zip(densities)
        .map(|(ch, density)| DensityEntry { ch, density })
        .collect();
    entries.sort_by(|a, b| a.density.total_cmp(&b.density).then(a.ch.cmp(&b.ch)));

    for entry in &entries {
        log::trace!("density {:?} = {:.5}", entry.ch, entry.density);
    }
    if let (Some(first), Some(last)) = (entries.first(), entries.last()) {
        log::debug!(
            "measured {} glyphs, density {:.4}..{:.4}",
            entries.len(),
            first.density,
            last.density
        );
    }

    Ok(entries)
}
