//! Converted cells and their terminal rendering.

use crate::{AsciiError, Result};
use serde::Serialize;
use std::fmt::Write as _;

/// What a cell shows: the matched character, or its canonical intensity in
/// preview mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Glyph {
    Char(char),
    Intensity(f32),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Cell {
    pub glyph: Glyph,
    /// Foreground color sampled from the source, when color is enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rgb: Option<[u8; 3]>,
}

/// Row-major grid of converted cells.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellGrid {
    pub width: u32,
    pub height: u32,
    pub cells: Vec<Cell>,
}

impl CellGrid {
    pub fn new(width: u32, height: u32, cells: Vec<Cell>) -> Result<Self> {
        if width as usize * height as usize != cells.len() {
            return Err(AsciiError::Configuration(format!(
                "{} cells do not fill a {width}x{height} grid",
                cells.len()
            )));
        }
        Ok(Self { width, height, cells })
    }

    pub fn get(&self, x: u32, y: u32) -> &Cell {
        &self.cells[(y * self.width + x) as usize]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> + '_ {
        self.cells.chunks(self.width.max(1) as usize)
    }

    /// The grid reflected left to right.
    pub fn mirrored(&self) -> Self {
        let mut cells = self.cells.clone();
        cells.chunks_mut(self.width.max(1) as usize).for_each(|row| row.reverse());
        Self { width: self.width, height: self.height, cells }
    }

    /// Rows joined by newlines. With `color`, each cell carrying an RGB value
    /// is wrapped in a 24-bit foreground escape and a reset.
    pub fn to_terminal(&self, color: bool) -> String {
        let mut out = String::with_capacity(self.cells.len() * if color { 20 } else { 1 });
        for (i, row) in self.rows().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            for cell in row {
                match (color, cell.rgb) {
                    (true, Some([r, g, b])) => {
                        let _ = write!(out, "\x1b[38;2;{r};{g};{b}m");
                        push_glyph(&mut out, cell.glyph);
                        out.push_str("\x1b[0m");
                    }
                    _ => push_glyph(&mut out, cell.glyph),
                }
            }
        }
        out
    }
}

fn push_glyph(out: &mut String, glyph: Glyph) {
    match glyph {
        Glyph::Char(ch) => out.push(ch),
        Glyph::Intensity(v) => {
            let _ = write!(out, "{v:>4.0}");
        }
    }
}
