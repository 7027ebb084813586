//! End-to-end tests for image conversion.

use asciicam::*;
use image::{Rgb, RgbImage};
use std::sync::Arc;

fn ramp() -> Arc<Gradient> {
    Arc::new(Gradient::ordered(" .:-=+*#%@").unwrap())
}

/// Horizontal brightness ramp with a bright marker in the top-left corner.
fn asymmetric(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        if x < 2 && y < 2 {
            Rgb([255, 255, 255])
        } else {
            let v = (x * 255 / width) as u8;
            Rgb([v, v / 2, 255 - v])
        }
    })
}

fn flip(image: &RgbImage) -> RgbImage {
    image::imageops::flip_horizontal(image)
}

#[test]
fn test_width_only_preserves_aspect() {
    let image = RgbImage::new(400, 200);
    let grid = normalize::normalize(&image, NormalizationMode::Luminance, TargetSize::columns(50))
        .unwrap();
    assert_eq!((grid.width, grid.height), (50, 25));

    let converter = Converter::new(ramp()).with_size(TargetSize::columns(50));
    let cells = converter.convert(&image, true).unwrap();
    assert_eq!((cells.width, cells.height), (50, 25));
}

#[test]
fn test_default_size_is_default_width() {
    let image = RgbImage::new(300, 150);
    let converter = Converter::new(ramp()).with_size(TargetSize::default());
    let grid = converter.convert(&image, true).unwrap();
    assert_eq!((grid.width, grid.height), (DEFAULT_WIDTH, 50));
}

#[test]
fn test_black_image_mapped_gradient() {
    let gradient = Arc::new(Gradient::mapped(vec![(0.0, ' '), (90.0, '+'), (255.0, '@')]).unwrap());
    let image = RgbImage::from_pixel(64, 48, Rgb([0, 0, 0]));
    let converter = Converter::new(gradient).with_size(TargetSize::exact(10, 10));
    let grid = converter.convert(&image, true).unwrap();
    assert_eq!(grid.cells.len(), 100);
    assert!(grid.cells.iter().all(|c| c.glyph == Glyph::Char(' ')));
}

#[test]
fn test_unknown_mode_is_configuration_error() {
    let err = "bogus".parse::<NormalizationMode>().unwrap_err();
    assert!(matches!(err, AsciiError::Configuration(_)));
}

#[test]
fn test_mirror_composition() {
    let image = asymmetric(16, 8);
    let converter = Converter::new(ramp()).with_size(TargetSize::exact(8, 16)).with_color(true);

    let direct = converter.convert(&image, true).unwrap();
    let from_flipped = converter.convert(&flip(&image), true).unwrap();
    assert_ne!(direct, from_flipped);
    assert_eq!(from_flipped, direct.mirrored());
    assert_eq!(from_flipped.mirrored().mirrored(), from_flipped);
}

#[test]
fn test_camera_frame_reads_unmirrored() {
    // the marker sits top-left in the frame, so it lands top-right in the grid
    let image = asymmetric(16, 8);
    let converter = Converter::new(ramp()).with_size(TargetSize::exact(8, 16));
    let grid = converter.convert(&image, true).unwrap();
    assert_eq!(grid.get(15, 0).glyph, Glyph::Char('@'));
    assert_ne!(grid.get(0, 0).glyph, Glyph::Char('@'));
}

#[test]
fn test_color_sampled_after_mirror() {
    let image = asymmetric(16, 8);
    let converter = Converter::new(ramp()).with_size(TargetSize::exact(8, 16)).with_color(true);
    let grid = converter.convert(&image, true).unwrap();
    assert_eq!(grid.get(15, 0).rgb, Some([255, 255, 255]));
    assert_eq!(grid.get(0, 7).rgb, Some(image.get_pixel(15, 7).0));
}

#[test]
fn test_modes_produce_different_grids() {
    let image = RgbImage::from_pixel(4, 4, Rgb([255, 0, 0]));
    let size = TargetSize::exact(4, 4);
    let luminance = Converter::new(ramp()).with_size(size).convert(&image, true).unwrap();
    let lightness = Converter::new(ramp())
        .with_size(size)
        .with_mode(NormalizationMode::Lightness)
        .convert(&image, true)
        .unwrap();
    // 0.2989 * 255 = 76 -> index 3; (255 + 0) / 2 = 127.5 -> index 5
    assert_eq!(luminance.get(0, 0).glyph, Glyph::Char('-'));
    assert_eq!(lightness.get(0, 0).glyph, Glyph::Char('+'));
}

#[test]
fn test_raw_buffer_wrong_channels() {
    let converter = Converter::new(ramp());
    let err = converter.convert_raw(vec![0; 2 * 2 * 4], 2, 2, 4, true).unwrap_err();
    assert!(matches!(err, AsciiError::InvalidImage(_)));
    assert!(converter.convert_raw(vec![0; 2 * 2 * 3], 2, 2, 3, true).is_ok());
}

#[test]
fn test_zero_size_rejected() {
    let converter = Converter::new(ramp()).with_size(TargetSize::exact(0, 5));
    let err = converter.convert(&RgbImage::new(4, 4), true).unwrap_err();
    assert!(matches!(err, AsciiError::Configuration(_)));
}

#[test]
fn test_convert_path_roundtrip_through_png() {
    let path = std::env::temp_dir().join(format!("asciicam-e2e-{}.png", std::process::id()));
    asymmetric(16, 8).save(&path).unwrap();

    let converter = Converter::new(ramp()).with_size(TargetSize::exact(8, 16));
    let from_file = converter.convert_path(&path, true).unwrap();
    let direct = converter.convert(&asymmetric(16, 8), true).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(from_file, direct);
}

#[test]
fn test_convert_path_missing_file() {
    let converter = Converter::new(ramp());
    assert!(converter.convert_path("/nonexistent/frame.png", true).is_err());
}

#[test]
fn test_config_swap_between_threads() {
    let converter = Arc::new(Converter::new(ramp()).with_size(TargetSize::exact(2, 2)));
    let image = RgbImage::from_pixel(2, 2, Rgb([255, 255, 255]));

    let swapper = {
        let converter = Arc::clone(&converter);
        std::thread::spawn(move || {
            let mut next = (*converter.config()).clone();
            next.gradient = Preset::Blocks.gradient();
            converter.replace_config(next);
        })
    };
    let during = converter.convert(&image, true).unwrap();
    swapper.join().unwrap();

    // whichever config was seen, it was seen whole
    let glyph = during.get(0, 0).glyph;
    assert!(glyph == Glyph::Char('@') || glyph == Glyph::Char('█'));
    let after = converter.convert(&image, true).unwrap();
    assert_eq!(after.get(0, 0).glyph, Glyph::Char('█'));
}
