//! Batch log writing
//!
//! Renders per-file reports into the plain-text validation log and writes
//! them through a single buffered writer opened once per batch.

use crate::constants::{LOG_ERROR_INDENT, NO_ERROR_MARKER};
use crate::models::ValidationReport;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Render the log lines for a batch
///
/// Each file with errors produces an `Invalid file format: {path}` line
/// followed by one indented line per error. Clean files are omitted. When
/// `clean_marker` is set and no file has errors, the log holds the
/// `NO ERROR` marker instead.
pub fn render_log(reports: &[ValidationReport], clean_marker: bool) -> Vec<String> {
    let mut lines = Vec::new();
    for report in reports.iter().filter(|r| !r.is_valid()) {
        lines.push(format!("Invalid file format: {}", report.path.display()));
        lines.extend(
            report
                .error_messages()
                .map(|message| format!("{}{}", LOG_ERROR_INDENT, message)),
        );
    }

    if lines.is_empty() && clean_marker {
        lines.push(NO_ERROR_MARKER.to_string());
    }
    lines
}

/// Sequential writer for the batch log file
#[derive(Debug)]
pub struct LogWriter {
    path: PathBuf,
    writer: BufWriter<File>,
    lines_written: usize,
}

impl LogWriter {
    /// Create (or truncate) the log file
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path)?;
        debug!("Opened validation log: {}", path.display());
        Ok(Self {
            path,
            writer: BufWriter::new(file),
            lines_written: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append lines, one per row
    pub fn write_log<I, S>(&mut self, lines: I) -> io::Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for line in lines {
            writeln!(self.writer, "{}", line.as_ref())?;
            self.lines_written += 1;
        }
        Ok(())
    }

    /// Flush buffered output and return the number of lines written
    pub fn finish(mut self) -> io::Result<usize> {
        self.writer.flush()?;
        self.writer.get_ref().sync_all()?;
        debug!(
            "Wrote {} lines to {}",
            self.lines_written,
            self.path.display()
        );
        Ok(self.lines_written)
    }
}
