pub mod encode;
pub mod orientation;

use anyhow::{Context, Result};
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::OutputFormat;
use crate::selection::Selection;
use crate::utils::{output_file_name, run_folder_name, verbose_println};

/// Options for one conversion run
#[derive(Debug, Clone)]
pub struct ConversionOptions {
    pub format: OutputFormat,
    /// Requested quality, 1-100
    pub quality: u8,
    /// When false, lossy formats encode at maximum fidelity instead of `quality`
    pub compress: bool,
    pub auto_orient: bool,
    pub verbose: bool,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::Jpeg,
            quality: 60,
            compress: true,
            auto_orient: false,
            verbose: false,
        }
    }
}

impl ConversionOptions {
    /// Quality actually handed to the encoders
    pub fn effective_quality(&self) -> u8 {
        if self.compress {
            self.quality
        } else {
            100
        }
    }
}

/// What happened to a single input file
#[derive(Debug, Clone)]
pub enum FileOutcome {
    /// Decoded and written successfully
    Converted { input: PathBuf, output: PathBuf },
    /// Could not be decoded, left out of the run
    Skipped { input: PathBuf, reason: String },
    /// Decoded but could not be encoded or written
    Failed { input: PathBuf, error: String },
}

impl FileOutcome {
    pub fn input(&self) -> &Path {
        match self {
            FileOutcome::Converted { input, .. }
            | FileOutcome::Skipped { input, .. }
            | FileOutcome::Failed { input, .. } => input,
        }
    }
}

/// Summary of a completed conversion run
#[derive(Debug)]
pub struct BatchReport {
    /// The timestamped folder all outputs were written into
    pub run_dir: PathBuf,
    /// One outcome per input, in processing order
    pub outcomes: Vec<FileOutcome>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn converted(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, FileOutcome::Converted { .. }))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, FileOutcome::Skipped { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, FileOutcome::Failed { .. }))
            .count()
    }
}

pub struct ConversionEngine {
    options: ConversionOptions,
}

impl ConversionEngine {
    pub fn new(options: ConversionOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ConversionOptions {
        &self.options
    }

    /// Convert every file in `selection` into a fresh timestamped folder
    /// under `output_root`, invoking `on_item` once per file as soon as
    /// its outcome is known.
    ///
    /// The loop is strictly sequential: each file finishes before the
    /// next begins. A file that fails to decode is skipped, a file that
    /// fails to encode or write is reported, and neither stops the
    /// batch. Only creating the output folder itself is fatal.
    pub fn convert_batch<F>(
        &self,
        selection: &Selection,
        output_root: &Path,
        mut on_item: F,
    ) -> Result<BatchReport>
    where
        F: FnMut(usize, usize, &FileOutcome),
    {
        let files = selection.files();
        let run_dir = self.create_run_dir(output_root)?;
        let mut outcomes = Vec::with_capacity(files.len());

        for (index, input) in files.iter().enumerate() {
            let outcome = self.convert_single(input, &run_dir);
            on_item(index + 1, files.len(), &outcome);
            outcomes.push(outcome);
        }

        Ok(BatchReport { run_dir, outcomes })
    }

    /// Create the per-run output folder, named after the batch start time
    fn create_run_dir(&self, output_root: &Path) -> Result<PathBuf> {
        let run_dir = output_root.join(run_folder_name(Local::now()));
        fs::create_dir_all(&run_dir).with_context(|| {
            format!("Failed to create output folder {}", run_dir.display())
        })?;

        verbose_println(
            self.options.verbose,
            &format!("Writing converted images to {}", run_dir.display()),
        );
        Ok(run_dir)
    }

    fn convert_single(&self, input: &Path, run_dir: &Path) -> FileOutcome {
        let img = match image::open(input) {
            Ok(img) => img,
            Err(err) => {
                return FileOutcome::Skipped {
                    input: input.to_path_buf(),
                    reason: err.to_string(),
                }
            }
        };

        let img = if self.options.auto_orient {
            let exif_orientation = orientation::read_orientation(input);
            if exif_orientation.needs_correction() {
                verbose_println(
                    self.options.verbose,
                    &format!(
                        "{}: correcting EXIF orientation: {}",
                        input.display(),
                        exif_orientation.description()
                    ),
                );
            }
            orientation::apply_orientation(img, exif_orientation)
        } else {
            img
        };

        let output = run_dir.join(output_file_name(input, self.options.format.extension()));
        match encode::encode_to_file(
            &img,
            &output,
            self.options.format,
            self.options.effective_quality(),
        ) {
            Ok(()) => FileOutcome::Converted {
                input: input.to_path_buf(),
                output,
            },
            Err(err) => FileOutcome::Failed {
                input: input.to_path_buf(),
                error: format!("{:#}", err),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::codecs::jpeg::JpegEncoder;
    use image::{ExtendedColorType, Rgb, RgbImage};
    use std::io::Cursor;
    use tempfile::TempDir;

    /// Write a small decodable JPEG gradient
    fn create_test_jpeg(path: &Path, width: u32, height: u32) {
        let img = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        });
        let file = fs::File::create(path).unwrap();
        let mut writer = std::io::BufWriter::new(file);
        let mut encoder = JpegEncoder::new_with_quality(&mut writer, 90);
        encoder
            .encode(img.as_raw(), width, height, ExtendedColorType::Rgb8)
            .unwrap();
    }

    /// Write a JPEG whose EXIF says it is stored a quarter turn CCW
    /// (orientation 6), by splicing an APP1 segment in after SOI
    fn create_oriented_jpeg(path: &Path, width: u32, height: u32) {
        let img = RgbImage::from_fn(width, height, |x, _| Rgb([(x * 40 % 256) as u8, 0, 0]));
        let mut encoded = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(Cursor::new(&mut encoded), 90);
        encoder
            .encode(img.as_raw(), width, height, ExtendedColorType::Rgb8)
            .unwrap();

        let mut bytes = encoded[..2].to_vec();
        bytes.extend_from_slice(&orientation::exif_app1_segment(6));
        bytes.extend_from_slice(&encoded[2..]);
        fs::write(path, &bytes).unwrap();
    }

    fn engine(options: ConversionOptions) -> ConversionEngine {
        ConversionEngine::new(options)
    }

    #[test]
    fn test_batch_converts_and_skips() {
        let tmp = TempDir::new().unwrap();
        let input_dir = tmp.path().join("in");
        let output_dir = tmp.path().join("out");
        fs::create_dir_all(&input_dir).unwrap();
        fs::create_dir_all(&output_dir).unwrap();

        create_test_jpeg(&input_dir.join("a.jpg"), 8, 8);
        create_test_jpeg(&input_dir.join("b.jpg"), 8, 8);
        // Named like an image, but undecodable
        fs::write(input_dir.join("photo.HEIC"), b"not an image").unwrap();

        let selection = Selection::from_files(vec![
            input_dir.join("a.jpg"),
            input_dir.join("b.jpg"),
            input_dir.join("photo.HEIC"),
        ]);

        let mut seen = Vec::new();
        let report = engine(ConversionOptions::default())
            .convert_batch(&selection, &output_dir, |current, total, outcome| {
                seen.push((current, total, outcome.input().to_path_buf()));
            })
            .unwrap();

        assert_eq!(report.total(), 3);
        assert_eq!(report.converted(), 2);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.failed(), 0);

        // Observer fired once per input, in order
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0].0, 1);
        assert_eq!(seen[2].0, 3);
        assert!(seen.iter().all(|(_, total, _)| *total == 3));
        assert_eq!(seen[2].2, input_dir.join("photo.HEIC"));

        // Exactly the two decodable files produced outputs
        let written: Vec<_> = fs::read_dir(&report.run_dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(written.len(), 2);
        assert!(written.contains(&"a_compressed.jpg".to_string()));
        assert!(written.contains(&"b_compressed.jpg".to_string()));
    }

    #[test]
    fn test_run_dir_is_timestamped_and_inside_output_root() {
        let tmp = TempDir::new().unwrap();
        let selection = Selection::from_files(Vec::new());

        let report = engine(ConversionOptions::default())
            .convert_batch(&selection, tmp.path(), |_, _, _| {})
            .unwrap();

        assert!(report.run_dir.is_dir());
        assert_eq!(report.run_dir.parent().unwrap(), tmp.path());

        let name = report.run_dir.file_name().unwrap().to_str().unwrap();
        // compressed_YYYYMMDD_HHMMSS
        assert_eq!(name.len(), "compressed_".len() + 15);
        assert!(name.starts_with("compressed_"));
        let stamp = &name["compressed_".len()..];
        assert!(stamp[..8].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(&stamp[8..9], "_");
        assert!(stamp[9..].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_same_stem_inputs_overwrite() {
        let tmp = TempDir::new().unwrap();
        let dir_a = tmp.path().join("a");
        let dir_b = tmp.path().join("b");
        let output_dir = tmp.path().join("out");
        fs::create_dir_all(&dir_a).unwrap();
        fs::create_dir_all(&dir_b).unwrap();
        fs::create_dir_all(&output_dir).unwrap();

        create_test_jpeg(&dir_a.join("holiday.jpg"), 4, 4);
        create_test_jpeg(&dir_b.join("holiday.jpg"), 16, 16);

        let selection =
            Selection::from_files(vec![dir_a.join("holiday.jpg"), dir_b.join("holiday.jpg")]);
        let report = engine(ConversionOptions::default())
            .convert_batch(&selection, &output_dir, |_, _, _| {})
            .unwrap();

        // Both count as converted, but the second write wins
        assert_eq!(report.converted(), 2);
        let written: Vec<_> = fs::read_dir(&report.run_dir).unwrap().collect();
        assert_eq!(written.len(), 1);

        let survivor = report.run_dir.join("holiday_compressed.jpg");
        let decoded = image::open(&survivor).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (16, 16));
    }

    #[test]
    fn test_auto_orient_swaps_dimensions() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("portrait.jpg");
        let output_dir = tmp.path().join("out");
        fs::create_dir_all(&output_dir).unwrap();
        create_oriented_jpeg(&input, 6, 2);

        let selection = Selection::from_files(vec![input.clone()]);

        let options = ConversionOptions {
            auto_orient: true,
            ..Default::default()
        };
        let report = engine(options)
            .convert_batch(&selection, &output_dir, |_, _, _| {})
            .unwrap();
        let decoded = image::open(report.run_dir.join("portrait_compressed.jpg")).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (2, 6));

        // Without auto-orient the stored dimensions pass through
        let report = engine(ConversionOptions::default())
            .convert_batch(&selection, &output_dir, |_, _, _| {})
            .unwrap();
        let decoded = image::open(report.run_dir.join("portrait_compressed.jpg")).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (6, 2));
    }

    #[test]
    fn test_format_selects_extension() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("pic.jpg");
        let output_dir = tmp.path().join("out");
        fs::create_dir_all(&output_dir).unwrap();
        create_test_jpeg(&input, 4, 4);

        let selection = Selection::from_files(vec![input]);

        for (format, expected) in [
            (OutputFormat::Jpeg, "pic_compressed.jpg"),
            (OutputFormat::Png, "pic_compressed.png"),
            (OutputFormat::Webp, "pic_compressed.webp"),
        ] {
            let options = ConversionOptions {
                format,
                ..Default::default()
            };
            let report = engine(options)
                .convert_batch(&selection, &output_dir, |_, _, _| {})
                .unwrap();
            assert!(report.run_dir.join(expected).is_file(), "{}", expected);
        }
    }

    #[test]
    fn test_write_failure_is_reported_and_batch_continues() {
        let tmp = TempDir::new().unwrap();
        let output_dir = tmp.path().join("out");
        fs::create_dir_all(&output_dir).unwrap();
        create_test_jpeg(&tmp.path().join("first.jpg"), 4, 4);
        create_test_jpeg(&tmp.path().join("second.jpg"), 4, 4);
        create_test_jpeg(&tmp.path().join("third.jpg"), 4, 4);

        let selection = Selection::from_files(vec![
            tmp.path().join("first.jpg"),
            tmp.path().join("second.jpg"),
            tmp.path().join("third.jpg"),
        ]);

        let report = engine(ConversionOptions::default())
            .convert_batch(&selection, &output_dir, |current, _, outcome| {
                // After the first file lands, occupy the second file's
                // output path with a directory so that one write fails.
                if current == 1 {
                    if let FileOutcome::Converted { output, .. } = outcome {
                        let run_dir = output.parent().unwrap();
                        fs::create_dir(run_dir.join("second_compressed.jpg")).unwrap();
                    }
                }
            })
            .unwrap();

        assert_eq!(report.converted(), 2);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.skipped(), 0);

        match &report.outcomes[1] {
            FileOutcome::Failed { input, error } => {
                assert_eq!(input, &tmp.path().join("second.jpg"));
                assert!(error.contains("second_compressed.jpg"));
            }
            other => panic!("expected a failed outcome, got {:?}", other),
        }
        // The third file still converted after the failure
        assert!(report.run_dir.join("third_compressed.jpg").is_file());
    }

    #[test]
    fn test_run_dir_creation_failure_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("ok.jpg");
        create_test_jpeg(&input, 4, 4);
        let selection = Selection::from_files(vec![input]);

        // The output root is a file, so no run folder can be created
        let blocked_root = tmp.path().join("blocked");
        fs::write(&blocked_root, b"in the way").unwrap();

        let result = engine(ConversionOptions::default()).convert_batch(
            &selection,
            &blocked_root,
            |_, _, _| {},
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_effective_quality() {
        let compressing = ConversionOptions {
            quality: 42,
            compress: true,
            ..Default::default()
        };
        assert_eq!(compressing.effective_quality(), 42);

        let max_fidelity = ConversionOptions {
            quality: 42,
            compress: false,
            ..Default::default()
        };
        assert_eq!(max_fidelity.effective_quality(), 100);
    }
}
