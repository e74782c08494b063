// Processing implementation for the GUI
// This module contains the conversion run that executes on a background thread

use super::{ImageCompressorApp, ProgressMessage};
use image_compressor::image_processing::{ConversionEngine, ConversionOptions, FileOutcome};
use std::path::PathBuf;
use std::sync::mpsc::channel;

impl ImageCompressorApp {
    pub fn start_processing(&mut self) {
        // Validate inputs
        if self.selection.is_empty() {
            self.error_message = "No images selected. Pick files or a folder first".to_string();
            return;
        }
        if self.output_dir.is_empty() {
            self.error_message = "Please select an output folder".to_string();
            return;
        }

        // Clear previous state
        self.is_processing = true;
        self.progress = 0.0;
        self.processed_count = 0;
        self.total_count = self.selection.len();
        self.current_file.clear();
        self.error_message.clear();
        self.results_message.clear();
        self.file_errors.clear();

        // Create channel for progress updates
        let (tx, rx) = channel();
        self.progress_receiver = Some(rx);

        // Hand the background thread its own copy of the current
        // selection and settings; later repicks do not affect a running
        // batch
        let selection = self.selection.clone();
        let output_dir = PathBuf::from(self.output_dir.clone());
        let options = ConversionOptions {
            format: self.format,
            quality: self.quality,
            compress: self.compress,
            auto_orient: self.auto_orient,
            verbose: false,
        };

        // Spawn processing thread
        std::thread::spawn(move || {
            let engine = ConversionEngine::new(options);

            let result =
                engine.convert_batch(&selection, &output_dir, |current, total, outcome| {
                    match outcome {
                        FileOutcome::Converted { .. } => {}
                        FileOutcome::Skipped { input, reason } => {
                            let _ = tx.send(ProgressMessage::FileError(format!(
                                "Skipped {}: {}",
                                input.display(),
                                reason
                            )));
                        }
                        FileOutcome::Failed { input, error } => {
                            let _ = tx.send(ProgressMessage::FileError(format!(
                                "{}: {}",
                                input.display(),
                                error
                            )));
                        }
                    }
                    let _ = tx.send(ProgressMessage::Progress {
                        current,
                        total,
                        file: outcome.input().display().to_string(),
                    });
                });

            match result {
                Ok(report) => {
                    let _ = tx.send(ProgressMessage::Complete {
                        converted: report.converted(),
                        skipped: report.skipped(),
                        failed: report.failed(),
                        run_dir: report.run_dir,
                    });
                }
                Err(e) => {
                    let _ = tx.send(ProgressMessage::Error(format!("Processing failed: {}", e)));
                }
            }
        });
    }

    /// Check for progress updates from the background thread
    pub fn check_progress(&mut self) {
        let receiver_exists = self.progress_receiver.is_some();
        if !receiver_exists {
            return;
        }

        // Collect all messages first to avoid borrowing issues
        let mut messages = Vec::new();
        if let Some(ref receiver) = self.progress_receiver {
            while let Ok(msg) = receiver.try_recv() {
                messages.push(msg);
            }
        }

        // Process messages and potentially clear the receiver
        let mut should_clear_receiver = false;
        for msg in messages {
            match msg {
                ProgressMessage::Progress {
                    current,
                    total,
                    file,
                } => {
                    self.processed_count = current;
                    self.total_count = total;
                    self.current_file = file;
                    if total > 0 {
                        self.progress = current as f32 / total as f32;
                    }
                }
                ProgressMessage::FileError(line) => {
                    self.file_errors.push(line);
                }
                ProgressMessage::Complete {
                    converted,
                    skipped,
                    failed,
                    run_dir,
                } => {
                    self.is_processing = false;
                    self.results_message = completion_message(converted, skipped, failed, &run_dir);
                    should_clear_receiver = true;
                }
                ProgressMessage::Error(err) => {
                    self.is_processing = false;
                    self.error_message = err;
                    should_clear_receiver = true;
                }
            }
        }

        if should_clear_receiver {
            self.progress_receiver = None;
        }
    }
}

/// One-line summary shown when a run finishes, always naming the folder
/// the outputs went to
fn completion_message(
    converted: usize,
    skipped: usize,
    failed: usize,
    run_dir: &std::path::Path,
) -> String {
    if failed == 0 && skipped == 0 {
        format!(
            "✓ Converted {} images into {}",
            converted,
            run_dir.display()
        )
    } else if failed == 0 {
        format!(
            "✓ Converted {} images into {} ({} skipped)",
            converted,
            run_dir.display(),
            skipped
        )
    } else {
        format!(
            "Converted {} images into {} ({} skipped, {} failed)",
            converted,
            run_dir.display(),
            skipped,
            failed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::completion_message;
    use std::path::Path;

    #[test]
    fn test_completion_message_names_the_run_folder() {
        let dir = Path::new("out/compressed_20240131_153000");

        let all_good = completion_message(4, 0, 0, dir);
        assert_eq!(
            all_good,
            "✓ Converted 4 images into out/compressed_20240131_153000"
        );

        let with_skips = completion_message(3, 1, 0, dir);
        assert!(with_skips.contains("(1 skipped)"));

        let with_failures = completion_message(2, 1, 1, dir);
        assert!(with_failures.contains("1 failed"));
        assert!(with_failures.contains("compressed_20240131_153000"));
    }
}
