//! asciicam CLI - Convert images to character art

use asciicam::{AsciiError, Converter, NormalizationMode, Preset, Scaler, Settings, TargetSize};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "asciicam", about = "Convert images to character art")]
struct Args {
    /// Input image file
    input: PathBuf,
    /// Output width in characters
    #[arg(short, long)]
    width: Option<u32>,
    /// Output height in characters
    #[arg(short = 'H', long)]
    height: Option<u32>,
    /// Size the output to the current terminal
    #[arg(short = 't', long)]
    fit_terminal: bool,
    /// Color each character with the source pixel
    #[arg(short, long)]
    color: bool,
    /// Normalization mode: luminance, lightness, average or norm
    #[arg(short, long)]
    mode: Option<NormalizationMode>,
    /// Preset gradient
    #[arg(short, long)]
    preset: Option<Preset>,
    /// Custom palette (measured when --font is given, else used as ordered)
    #[arg(long)]
    palette: Option<String>,
    /// Font file used to measure glyph density
    #[arg(short, long)]
    font: Option<PathBuf>,
    /// Density rescaling for measured palettes: identity or minmax
    #[arg(long)]
    scaler: Option<Scaler>,
    /// Match intensities against a density table instead of a ramp.
    /// Pair with `--scaler minmax`: raw densities only reach a small part of 0..=255
    #[arg(long)]
    mapping: bool,
    /// Emit matched intensities instead of characters, as JSON
    #[arg(long)]
    preview: bool,
    /// Emit the cell grid as JSON
    #[arg(long)]
    json: bool,
    /// JSON settings file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,
    /// Log conversion details to stderr
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn settings(&self) -> Result<Settings, AsciiError> {
        let mut settings = match &self.config {
            Some(path) => Settings::from_json_file(path)?,
            None => Settings::default(),
        };

        settings.rows = self.height.or(settings.rows);
        settings.columns = self.width.or(settings.columns);
        settings.color |= self.color;
        settings.mapping |= self.mapping;
        settings.fit_terminal |= self.fit_terminal;
        if let Some(mode) = self.mode {
            settings.mode = mode;
        }
        if let Some(preset) = self.preset {
            settings.preset = preset;
        }
        if let Some(scaler) = self.scaler {
            settings.scaler = scaler;
        }
        if self.palette.is_some() {
            settings.palette = self.palette.clone();
        }
        if self.font.is_some() {
            settings.font = self.font.clone();
        }
        Ok(settings)
    }
}

fn log_filter(verbose: bool, directives: &str) -> EnvFilter {
    let level = if verbose { LevelFilter::DEBUG } else { LevelFilter::WARN };
    EnvFilter::builder().with_default_directive(level.into()).parse_lossy(directives)
}

/// Route `log` records to stderr: debug when verbose, warnings otherwise.
/// `RUST_LOG` directives take precedence.
fn init_logging(verbose: bool) {
    let directives = std::env::var("RUST_LOG").unwrap_or_default();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(verbose, &directives))
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<(), AsciiError> {
    let args = Args::parse();
    init_logging(args.verbose);

    let settings = args.settings()?;
    let mut config = settings.to_config()?;

    if settings.fit_terminal {
        match crossterm::terminal::size() {
            Ok((columns, lines)) => config.size = TargetSize::fit_terminal(columns, lines),
            Err(e) => log::warn!("terminal size unavailable, keeping {:?}: {e}", config.size),
        }
    }

    let color = config.color;
    let converter = Converter::from_config(config);
    let grid = converter.convert_path(&args.input, !args.preview)?;

    if args.json || args.preview {
        println!("{}", serde_json::to_string(&grid)?);
    } else {
        println!("{}", grid.to_terminal(color));
    }
    Ok(())
}
