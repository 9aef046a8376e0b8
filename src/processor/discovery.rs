//! File discovery for station directories
//!
//! Walks a directory tree for station files with the configured extension
//! and runs the advisory first-line format scan across them.

use crate::models::{FileFormat, FormatCheck};
use crate::validator::detect_delimiter;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Station file discovery rooted at one directory
#[derive(Debug, Clone)]
pub struct FileDiscovery {
    root: PathBuf,
    extension: String,
}

impl FileDiscovery {
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: extension.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All matching files below the root, sorted by path
    ///
    /// Entries that cannot be walked are logged and skipped.
    pub fn discover_files(&self) -> Vec<PathBuf> {
        debug!(
            "Searching for .{} files in: {}",
            self.extension,
            self.root.display()
        );

        let mut files = Vec::new();
        for entry in WalkDir::new(&self.root) {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if entry.file_type().is_file() && self.matches_extension(path) {
                        files.push(path.to_path_buf());
                    }
                }
                Err(e) => {
                    warn!("Error walking directory {}: {}", self.root.display(), e);
                }
            }
        }

        files.sort();
        debug!("Found {} station files", files.len());
        files
    }

    /// Extension match ignoring ASCII case, so `A.DAT` is found alongside `a.dat`
    fn matches_extension(&self, path: &Path) -> bool {
        path.extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(self.extension.as_str()))
    }
}

/// Read the first line of every file and group by delimiter and column count
///
/// Unreadable files are skipped with a warning; the scan itself never fails.
pub fn check_uniform_format(files: &[PathBuf]) -> FormatCheck {
    let mut check = FormatCheck::default();

    for path in files {
        match read_first_line(path) {
            Ok(line) => {
                let delimiter = detect_delimiter(&line);
                let columns = line.trim().split(delimiter.as_char()).count();
                check.formats.push(FileFormat {
                    path: path.clone(),
                    delimiter,
                    columns,
                });
            }
            Err(e) => {
                warn!("Skipping {} in format check: {}", path.display(), e);
                check.unreadable.push(path.clone());
            }
        }
    }

    if !check.is_uniform() {
        warn!(
            "Inconsistent file formats across directory: {:?}",
            check.distinct_formats()
        );
    }

    check
}

fn read_first_line(path: &Path) -> std::io::Result<String> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut line = String::new();
    reader.read_line(&mut line)?;
    Ok(line)
}
