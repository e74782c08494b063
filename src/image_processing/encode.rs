use anyhow::{Context, Result};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ExtendedColorType, ImageFormat};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::cli::OutputFormat;

/// Encode `img` to `path` in the given format.
///
/// JPEG cannot represent alpha, so images with transparency (or sample
/// depths JPEG does not support) are flattened to 8-bit RGB first. PNG
/// and WebP keep their alpha channel. PNG is lossless and ignores
/// `quality`; JPEG and WebP encode lossily at `quality` (1-100).
pub fn encode_to_file(
    img: &DynamicImage,
    path: &Path,
    format: OutputFormat,
    quality: u8,
) -> Result<()> {
    match format {
        OutputFormat::Jpeg => encode_jpeg(img, path, quality),
        OutputFormat::Png => encode_png(img, path),
        OutputFormat::Webp => encode_webp(img, path, quality),
    }
}

fn encode_jpeg(img: &DynamicImage, path: &Path, quality: u8) -> Result<()> {
    let rgb = img.to_rgb8();

    let file = fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    let mut encoder = JpegEncoder::new_with_quality(&mut writer, quality);
    encoder
        .encode(
            rgb.as_raw(),
            rgb.width(),
            rgb.height(),
            ExtendedColorType::Rgb8,
        )
        .with_context(|| format!("Failed to encode JPEG {}", path.display()))?;

    writer
        .flush()
        .with_context(|| format!("Failed to flush {}", path.display()))?;
    Ok(())
}

fn encode_png(img: &DynamicImage, path: &Path) -> Result<()> {
    img.save_with_format(path, ImageFormat::Png)
        .with_context(|| format!("Failed to write PNG {}", path.display()))
}

fn encode_webp(img: &DynamicImage, path: &Path, quality: u8) -> Result<()> {
    // webp::Encoder only accepts 8-bit RGB/RGBA buffers
    let encoded = if img.color().has_alpha() {
        let rgba = img.to_rgba8();
        webp::Encoder::from_rgba(rgba.as_raw(), rgba.width(), rgba.height())
            .encode(quality as f32)
    } else {
        let rgb = img.to_rgb8();
        webp::Encoder::from_rgb(rgb.as_raw(), rgb.width(), rgb.height()).encode(quality as f32)
    };

    fs::write(path, &*encoded).with_context(|| format!("Failed to write WebP {}", path.display()))
}
