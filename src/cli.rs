use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use strum_macros::{Display, EnumIter};

/// Image extensions picked up by directory scans unless overridden
pub const DEFAULT_EXTENSIONS: &str = "png,jpg,jpeg,bmp,tiff";

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Display, EnumIter)]
pub enum OutputFormat {
    /// JPEG output (quality applies, transparency is flattened)
    #[value(name = "jpeg", alias = "jpg")]
    #[strum(serialize = "JPEG")]
    Jpeg,
    /// PNG output (lossless, transparency kept, quality ignored)
    #[value(name = "png")]
    #[strum(serialize = "PNG")]
    Png,
    /// WebP output (lossy at the requested quality, transparency kept)
    #[value(name = "webp")]
    #[strum(serialize = "WebP")]
    Webp,
}

impl OutputFormat {
    /// File extension used for converted images
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
            OutputFormat::Webp => "webp",
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "image-compressor",
    about = "Batch image converter and compressor with EXIF auto-orientation",
    long_about = "
Image Compressor - Batch Conversion Tool

This tool re-encodes batches of photos into JPEG, PNG or WebP at a chosen
quality level. Inputs can be single files or directories (scanned
recursively). Every run writes its results into a fresh timestamped folder
inside the output directory, so repeated runs never clobber each other.

Key Features:
• JPEG, PNG and WebP output with per-run quality control
• EXIF orientation correction (--auto-orient)
• Recursive directory scanning with configurable extensions
• Per-file error reporting that never aborts the batch
• Progress bar or machine-readable JSON progress stream

Example Usage:
  # Compress a folder of photos to JPEG at the default quality (60)
  image-compressor -i ~/Photos -o ~/converted

  # Convert single files to WebP at quality 80, fixing orientation
  image-compressor -i IMG_001.jpg -i IMG_002.jpg -f webp -q 80 --auto-orient

  # Re-encode to JPEG at maximum fidelity
  image-compressor -i ~/Photos -f jpeg --no-compress

  # Only pick up PNG and TIFF files when scanning folders
  image-compressor -i ~/Scans --extensions png,tiff -f png

  # Drive from another program
  image-compressor -i ~/Photos --json-progress"
)]
pub struct Args {
    /// Input directories or single image files (can be specified multiple times)
    #[arg(short = 'i', long = "input", required = true, value_name = "DIR|FILE")]
    pub input_paths: Vec<PathBuf>,

    /// Directory in which the timestamped run folder is created
    #[arg(short = 'o', long = "output", value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Output image format
    #[arg(short = 'f', long = "format", default_value = "jpeg")]
    pub format: OutputFormat,

    /// Encoding quality from 1 (smallest) to 100 (best); PNG ignores it
    #[arg(
        short = 'q',
        long = "quality",
        default_value = "60",
        value_name = "1-100",
        value_parser = clap::value_parser!(u8).range(1..=100)
    )]
    pub quality: u8,

    /// Re-encode at maximum fidelity instead of the requested quality
    #[arg(long = "no-compress")]
    pub no_compress: bool,

    /// Rotate images upright using their EXIF orientation tag
    #[arg(long = "auto-orient")]
    pub auto_orient: bool,

    /// Comma-separated list of image extensions picked up by directory scans
    #[arg(long = "extensions", default_value = DEFAULT_EXTENSIONS)]
    pub extensions_str: String,

    /// Enable verbose output with detailed progress information
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Emit machine-readable JSON progress on stdout instead of styled text
    #[arg(long = "json-progress")]
    pub json_progress: bool,
}

impl Args {
    /// Parse the extensions string into a vector
    pub fn parse_extensions(&self) -> Vec<String> {
        self.extensions_str
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_extensions() {
        let args = Args {
            extensions_str: "png,jpg,jpeg".to_string(),
            ..Default::default()
        };
        assert_eq!(args.parse_extensions(), vec!["png", "jpg", "jpeg"]);

        let args = Args {
            extensions_str: "PNG, JPG , Tiff ".to_string(),
            ..Default::default()
        };
        assert_eq!(args.parse_extensions(), vec!["png", "jpg", "tiff"]);
    }

    #[test]
    fn test_parse_extensions_empty_entries() {
        let args = Args {
            extensions_str: "png,,jpg,".to_string(),
            ..Default::default()
        };
        assert_eq!(args.parse_extensions(), vec!["png", "jpg"]);
    }

    #[test]
    fn test_quality_range_accepted() {
        for q in ["1", "60", "100"] {
            let args = Args::try_parse_from(["image-compressor", "-i", "in", "-q", q]);
            assert!(args.is_ok(), "quality {} should parse", q);
        }
    }

    #[test]
    fn test_quality_range_rejected() {
        for q in ["0", "101", "255", "-1"] {
            let args = Args::try_parse_from(["image-compressor", "-i", "in", "-q", q]);
            assert!(args.is_err(), "quality {} should be rejected", q);
        }
    }

    #[test]
    fn test_format_names() {
        let args = Args::try_parse_from(["image-compressor", "-i", "in", "-f", "webp"]).unwrap();
        assert_eq!(args.format, OutputFormat::Webp);

        // "jpg" is accepted as an alias for "jpeg"
        let args = Args::try_parse_from(["image-compressor", "-i", "in", "-f", "jpg"]).unwrap();
        assert_eq!(args.format, OutputFormat::Jpeg);

        let args = Args::try_parse_from(["image-compressor", "-i", "in", "-f", "gif"]);
        assert!(args.is_err());
    }

    #[test]
    fn test_input_required() {
        assert!(Args::try_parse_from(["image-compressor"]).is_err());
    }

    #[test]
    fn test_extensions() {
        assert_eq!(OutputFormat::Jpeg.extension(), "jpg");
        assert_eq!(OutputFormat::Png.extension(), "png");
        assert_eq!(OutputFormat::Webp.extension(), "webp");
    }
}

// Default implementation for tests
#[cfg(test)]
impl Default for Args {
    fn default() -> Self {
        Self {
            input_paths: vec![],
            output_dir: PathBuf::from("."),
            format: OutputFormat::Jpeg,
            quality: 60,
            no_compress: false,
            auto_orient: false,
            extensions_str: DEFAULT_EXTENSIONS.to_string(),
            verbose: false,
            json_progress: false,
        }
    }
}
