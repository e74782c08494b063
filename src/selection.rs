//! Input selection.
//!
//! A [`Selection`] is the ordered list of files a conversion run will
//! process. It is built either from explicit file picks (taken verbatim,
//! in picker order) or by scanning directories recursively for known
//! image extensions. Each new pick replaces the previous selection
//! wholesale; selections are never merged.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::utils::has_valid_extension;

#[derive(Debug, Clone, Default)]
pub struct Selection {
    files: Vec<PathBuf>,
}

impl Selection {
    /// Build a selection from explicitly picked files.
    ///
    /// No extension filtering happens here: whatever was picked is queued
    /// as-is, and undecodable entries are skipped later by the conversion
    /// loop.
    pub fn from_files<I>(paths: I) -> Self
    where
        I: IntoIterator<Item = PathBuf>,
    {
        Self {
            files: paths.into_iter().collect(),
        }
    }

    /// Recursively scan a directory for files whose lowercased extension
    /// is in `extensions`. The result is sorted for a stable processing
    /// order.
    pub fn scan_folder(root: &Path, extensions: &[String]) -> Result<Self> {
        let mut files = Vec::new();

        let walker = WalkDir::new(root).follow_links(false);
        for entry in walker {
            let entry = entry.with_context(|| {
                format!("Failed to read directory entry under {}", root.display())
            })?;
            let path = entry.path();

            if path.is_file() && has_valid_extension(path, extensions) {
                files.push(path.to_path_buf());
            }
        }

        files.sort();
        Ok(Self { files })
    }

    /// Build a selection from a mix of files and directories: files are
    /// taken as-is, directories are scanned recursively.
    pub fn from_inputs(inputs: &[PathBuf], extensions: &[String]) -> Result<Self> {
        let mut files = Vec::new();

        for input in inputs {
            if input.is_dir() {
                files.extend(Self::scan_folder(input, extensions)?.files);
            } else {
                files.push(input.clone());
            }
        }

        Ok(Self { files })
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
