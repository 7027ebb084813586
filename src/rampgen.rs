//! rampgen - Order a palette by glyph ink density for a given font

use asciicam::{measure_palette, AsciiError, FontRasterizer, Gradient, GradientOptions, Scaler};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rampgen", about = "Order characters by rendered ink density")]
struct Args {
    /// Font file to rasterize glyphs with
    font: PathBuf,
    /// Characters to measure (default: printable ASCII)
    #[arg(short, long)]
    palette: Option<String>,
    /// Density rescaling: identity or minmax
    #[arg(short, long, default_value = "identity")]
    scaler: Scaler,
    /// Show the density table that mapping mode would search.
    /// Pair with `--scaler minmax` so keys span 0..=255
    #[arg(short, long)]
    mapping: bool,
    /// Emit measurements as JSON
    #[arg(long)]
    json: bool,
    /// Log measurement details to stderr
    #[arg(short, long)]
    verbose: bool,
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

    let rasterizer = FontRasterizer::from_path(&args.font)?;
    let palette = args
        .palette
        .unwrap_or_else(|| (' '..='~').collect::<String>());

    if args.json {
        let entries = measure_palette(&palette, &rasterizer, args.scaler)?;
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    let options = GradientOptions { mapping: args.mapping, scaler: args.scaler };
    let gradient = Gradient::build(&palette, &rasterizer, options)?;
    match gradient.table() {
        Some(table) => {
            for (key, ch) in table {
                println!("{key:>8.3}  {ch:?}");
            }
        }
        None => println!("{}", gradient.chars().into_iter().collect::<String>()),
    }
    Ok(())
}
