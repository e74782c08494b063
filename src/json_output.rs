//! JSON output for front-end integration
//!
//! When the --json-progress flag is enabled, all progress and status
//! information is emitted as JSON lines to stdout, suppressing the styled
//! terminal output.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Last progress emission timestamp (milliseconds since epoch)
/// Used for throttling progress updates to ~25 FPS (40ms between updates)
static LAST_PROGRESS_MS: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum JsonMessage {
    /// Progress update
    Progress {
        current: usize,
        total: usize,
        message: String,
    },
    /// File converted successfully
    FileConverted {
        input_path: String,
        output_path: String,
    },
    /// File skipped because it could not be decoded
    FileSkipped { input_path: String, reason: String },
    /// File decoded but could not be encoded or written
    FileFailed { input_path: String, error: String },
    /// End-of-run summary
    Summary {
        total_files: usize,
        converted: usize,
        skipped: usize,
        failed: usize,
        run_dir: String,
        duration_secs: f64,
    },
}

impl JsonMessage {
    /// Emit JSON message to stdout
    pub fn emit(&self) {
        if let Ok(json) = serde_json::to_string(self) {
            println!("{}", json);
        }
    }

    /// Create and emit progress message (throttled to ~25 FPS for smooth consumers)
    ///
    /// Progress updates are throttled to emit at most every 40ms.
    /// The final progress (current == total) is always emitted to ensure 100% completion.
    pub fn progress(current: usize, total: usize, message: impl Into<String>) {
        let now_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        let last_ms = LAST_PROGRESS_MS.load(Ordering::Relaxed);

        if now_ms.saturating_sub(last_ms) >= 40 || current == total {
            LAST_PROGRESS_MS.store(now_ms, Ordering::Relaxed);
            Self::Progress {
                current,
                total,
                message: message.into(),
            }
            .emit();
        }
    }

    /// Create and emit file converted message
    pub fn file_converted(input_path: &Path, output_path: &Path) {
        Self::FileConverted {
            input_path: input_path.display().to_string(),
            output_path: output_path.display().to_string(),
        }
        .emit();
    }

    /// Create and emit file skipped message
    pub fn file_skipped(input_path: &Path, reason: impl Into<String>) {
        Self::FileSkipped {
            input_path: input_path.display().to_string(),
            reason: reason.into(),
        }
        .emit();
    }

    /// Create and emit file failed message
    pub fn file_failed(input_path: &Path, error: impl Into<String>) {
        Self::FileFailed {
            input_path: input_path.display().to_string(),
            error: error.into(),
        }
        .emit();
    }

    /// Create and emit summary message
    pub fn summary(
        total_files: usize,
        converted: usize,
        skipped: usize,
        failed: usize,
        run_dir: &Path,
        duration_secs: f64,
    ) {
        Self::Summary {
            total_files,
            converted,
            skipped,
            failed,
            run_dir: run_dir.display().to_string(),
            duration_secs,
        }
        .emit();
    }
}
