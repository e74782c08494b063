use anyhow::{Context, Result};
use exif::{In, Reader, Tag, Value};
use image::DynamicImage;
use std::path::Path;

/// EXIF orientation values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExifOrientation {
    /// No orientation specified or undefined
    Undefined = 0,
    /// Normal orientation (0 degrees)
    TopLeft = 1,
    /// Horizontally flipped
    TopRight = 2,
    /// Rotated 180 degrees
    BottomRight = 3,
    /// Vertically flipped
    BottomLeft = 4,
    /// Rotated 90 degrees CCW + horizontally flipped
    LeftTop = 5,
    /// Rotated 90 degrees CW (portrait)
    RightTop = 6,
    /// Rotated 90 degrees CW + horizontally flipped
    RightBottom = 7,
    /// Rotated 90 degrees CCW (portrait)
    LeftBottom = 8,
}

impl From<u32> for ExifOrientation {
    fn from(value: u32) -> Self {
        match value {
            1 => ExifOrientation::TopLeft,
            2 => ExifOrientation::TopRight,
            3 => ExifOrientation::BottomRight,
            4 => ExifOrientation::BottomLeft,
            5 => ExifOrientation::LeftTop,
            6 => ExifOrientation::RightTop,
            7 => ExifOrientation::RightBottom,
            8 => ExifOrientation::LeftBottom,
            _ => ExifOrientation::Undefined,
        }
    }
}

impl ExifOrientation {
    /// Get a human-readable description of the orientation
    pub fn description(&self) -> &'static str {
        match self {
            ExifOrientation::Undefined => "Undefined",
            ExifOrientation::TopLeft => "Normal",
            ExifOrientation::TopRight => "Horizontally flipped",
            ExifOrientation::BottomRight => "Rotated 180°",
            ExifOrientation::BottomLeft => "Vertically flipped",
            ExifOrientation::LeftTop => "Rotated 90° CCW + flipped",
            ExifOrientation::RightTop => "Rotated 90° CW (portrait)",
            ExifOrientation::RightBottom => "Rotated 90° CW + flipped",
            ExifOrientation::LeftBottom => "Rotated 90° CCW (portrait)",
        }
    }

    /// True when the upright correction changes the image
    pub fn needs_correction(&self) -> bool {
        matches!(
            self,
            ExifOrientation::BottomRight | ExifOrientation::RightTop | ExifOrientation::LeftBottom
        )
    }
}

/// Read the EXIF orientation tag from an image file.
///
/// Orientation handling is best-effort: missing files, containers
/// without EXIF and malformed EXIF all come back as `Undefined` and
/// never fail a conversion.
pub fn read_orientation(image_path: &Path) -> ExifOrientation {
    try_read_orientation(image_path).unwrap_or(ExifOrientation::Undefined)
}

fn try_read_orientation(image_path: &Path) -> Result<ExifOrientation> {
    let file = std::fs::File::open(image_path).with_context(|| {
        format!(
            "Failed to open image for EXIF reading: {}",
            image_path.display()
        )
    })?;

    let mut buf_reader = std::io::BufReader::new(file);
    let exif = Reader::new()
        .read_from_container(&mut buf_reader)
        .context("Failed to read EXIF data")?;

    // Look for orientation tag
    if let Some(field) = exif.get_field(Tag::Orientation, In::PRIMARY) {
        if let Value::Short(values) = &field.value {
            if let Some(&orientation_value) = values.first() {
                return Ok(ExifOrientation::from(orientation_value as u32));
            }
        }
    }

    Ok(ExifOrientation::Undefined)
}

/// Apply the upright correction for an EXIF orientation.
///
/// Only the three rotation-only orientations cameras actually write are
/// corrected. Mirrored variants and `Undefined` pass through unchanged.
pub fn apply_orientation(img: DynamicImage, orientation: ExifOrientation) -> DynamicImage {
    match orientation {
        // Stored upside down
        ExifOrientation::BottomRight => img.rotate180(),
        // Stored a quarter turn CCW, correct with a quarter turn CW
        ExifOrientation::RightTop => img.rotate90(),
        // Stored a quarter turn CW, correct with a quarter turn CCW
        ExifOrientation::LeftBottom => img.rotate270(),
        _ => img,
    }
}

/// Minimal Exif APP1 segment (little-endian TIFF header plus a single
/// orientation entry) for building test fixtures.
#[cfg(test)]
pub fn exif_app1_segment(orientation: u16) -> Vec<u8> {
    let mut seg = vec![0xFF, 0xE1, 0x00, 0x22];
    seg.extend_from_slice(b"Exif\0\0");
    // TIFF header, IFD0 at offset 8
    seg.extend_from_slice(&[0x49, 0x49, 0x2A, 0x00, 0x08, 0x00, 0x00, 0x00]);
    // One IFD entry
    seg.extend_from_slice(&[0x01, 0x00]);
    // Orientation tag (0x0112), SHORT, count 1
    seg.extend_from_slice(&[0x12, 0x01, 0x03, 0x00, 0x01, 0x00, 0x00, 0x00]);
    seg.extend_from_slice(&orientation.to_le_bytes());
    seg.extend_from_slice(&[0x00, 0x00]);
    // No next IFD
    seg.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);
    seg
}
