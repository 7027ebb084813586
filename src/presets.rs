//! Built-in gradients, ordered darkest to brightest.

use crate::gradient::Gradient;
use crate::{AsciiError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::{Arc, OnceLock};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    #[default]
    Uni,
    Ascii,
    AsciiExtended,
    Alphabetic,
    Alphanumeric,
    Blocks,
    Arrows,
    Musical,
    Geometric,
    Roman,
    Mathematical,
}

impl Preset {
    pub const ALL: [Preset; 11] = [
        Preset::Uni,
        Preset::Ascii,
        Preset::AsciiExtended,
        Preset::Alphabetic,
        Preset::Alphanumeric,
        Preset::Blocks,
        Preset::Arrows,
        Preset::Musical,
        Preset::Geometric,
        Preset::Roman,
        Preset::Mathematical,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Preset::Uni => "uni",
            Preset::Ascii => "ascii",
            Preset::AsciiExtended => "ascii-extended",
            Preset::Alphabetic => "alphabetic",
            Preset::Alphanumeric => "alphanumeric",
            Preset::Blocks => "blocks",
            Preset::Arrows => "arrows",
            Preset::Musical => "musical",
            Preset::Geometric => "geometric",
            Preset::Roman => "roman",
            Preset::Mathematical => "mathematical",
        }
    }

    pub fn palette(self) -> &'static str {
        match self {
            Preset::Uni => " ˙·.,:;<*≠am#W@Ŵ₩",
            Preset::Ascii => " .:-=+*#%@",
            Preset::AsciiExtended => concat!(
                "`.-':_,^=;><+!rc*/z?sLTv)J7(|Fi{C}fI31tlu[",
                "neoZ5Yxjya]2ESwqkP6h9d4VpOGbUAKXHm8RD#$Bg0MNWQ%&@"
            ),
            Preset::Alphabetic => " ABCDEFGHIJKLMNOPQRSTUVWXYZ",
            Preset::Alphanumeric => " ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789",
            Preset::Blocks => " ░▒▓█",
            Preset::Arrows => " ←↑→↓↖↗↘↙",
            Preset::Musical => " ♫♪♩♬♭♮♯°ø",
            Preset::Geometric => " ○◔◐◕◕◑●",
            Preset::Roman => " ♔♕♖♗♘♙♚♛♜♝♞♟",
            Preset::Mathematical => " ≠≤≥±≈√∞∫∑∆π",
        }
    }

    /// Shared gradient for this preset, built on first use.
    pub fn gradient(self) -> Arc<Gradient> {
        static BUILT: OnceLock<Vec<Arc<Gradient>>> = OnceLock::new();
        let all = BUILT.get_or_init(|| {
            Preset::ALL
                .iter()
                .map(|p| Arc::new(Gradient::from_static(p.palette())))
                .collect()
        });
        Arc::clone(&all[self as usize])
    }
}

impl FromStr for Preset {
    type Err = AsciiError;

    fn from_str(s: &str) -> Result<Self> {
        Preset::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| AsciiError::Configuration(format!("unknown preset: {s}")))
    }
}
