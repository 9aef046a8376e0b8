//! Batch validation engine.
//!
//! Orchestrates a directory run: file discovery, the advisory format scan,
//! concurrent per-file validation, directory-wide statistics, and the batch
//! log. Presentation is left to a [`crate::report::ReportSink`].

pub mod aggregator;
pub mod discovery;
pub mod streaming;
pub mod writer;

#[cfg(test)]
pub mod tests;

use self::{
    aggregator::FileAggregator,
    discovery::{FileDiscovery, check_uniform_format},
    streaming::StreamingProcessor,
    writer::{LogWriter, render_log},
};

use crate::config::{SchemaKind, ValidatorConfig};
use crate::error::{Result, ValidatorError};
use crate::models::{FormatCheck, ValidationReport, YearlyAccumulator};
use crate::stats::{BatchTotals, DirectorySummary};

use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

/// Everything a batch run produced
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub directory: PathBuf,
    pub log_path: PathBuf,
    /// Per-file reports sorted by path
    pub reports: Vec<ValidationReport>,
    /// Yearly totals merged across every file
    pub yearly: YearlyAccumulator,
    pub totals: BatchTotals,
    pub summary: DirectorySummary,
    pub format_check: FormatCheck,
    pub processing_time_ms: u128,
}

impl BatchOutcome {
    /// Reports that recorded at least one issue
    pub fn invalid_reports(&self) -> impl Iterator<Item = &ValidationReport> {
        self.reports.iter().filter(|report| !report.is_valid())
    }
}

/// Validates every station file in a directory
#[derive(Debug)]
pub struct BatchProcessor {
    directory: PathBuf,
    log_path: PathBuf,
    config: ValidatorConfig,
    show_progress: bool,
}

impl BatchProcessor {
    /// Create a processor for `directory`, logging to `log_path`
    pub fn new(directory: impl Into<PathBuf>, log_path: impl Into<PathBuf>) -> Result<Self> {
        let directory = directory.into();
        if !directory.is_dir() {
            return Err(ValidatorError::DirectoryNotFound { path: directory });
        }

        Ok(Self {
            directory,
            log_path: log_path.into(),
            config: ValidatorConfig::default(),
            show_progress: true,
        })
    }

    pub fn with_config(mut self, config: ValidatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Show or hide the progress bar
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Run the whole batch
    ///
    /// Validation problems never fail the batch; they end up in the
    /// per-file reports. Only an invalid configuration or an unwritable
    /// log is an error, and the latter still carries the computed outcome.
    pub async fn process(&self) -> Result<BatchOutcome> {
        let start_time = Instant::now();
        self.config.validate()?;

        info!("Validating station files in {}", self.directory.display());
        let files = FileDiscovery::new(&self.directory, &self.config.file_extension).discover_files();
        info!("Found {} station files", files.len());

        let format_check = check_uniform_format(&files);
        if !format_check.is_uniform() {
            for (delimiter, columns) in format_check.distinct_formats() {
                warn!("File format in use: {} delimiter, {} columns", delimiter, columns);
            }
        }

        let aggregator = FileAggregator::new(&self.config);
        let streamed = StreamingProcessor::new(aggregator, self.config.workers)
            .with_progress(self.show_progress)
            .process_files(&files)
            .await;

        let mut reports = streamed.reports;
        reports.sort_by(|a, b| a.path.cmp(&b.path));

        let mut totals = BatchTotals::new();
        for report in &reports {
            totals.add_report(report);
        }
        let summary = DirectorySummary::from_accumulator(&streamed.yearly);

        let mut outcome = BatchOutcome {
            directory: self.directory.clone(),
            log_path: self.log_path.clone(),
            reports,
            yearly: streamed.yearly,
            totals,
            summary,
            format_check,
            processing_time_ms: 0,
        };

        let log_result = self.write_log(&outcome.reports);
        outcome.processing_time_ms = start_time.elapsed().as_millis();

        match log_result {
            Ok(lines) => {
                info!(
                    "Validated {} files ({} with errors), wrote {} log lines to {}",
                    outcome.totals.files_scanned,
                    outcome.totals.files_with_errors,
                    lines,
                    self.log_path.display()
                );
                Ok(outcome)
            }
            Err(source) => Err(ValidatorError::LogWrite {
                path: self.log_path.clone(),
                source,
                partial: Box::new(outcome),
            }),
        }
    }

    fn write_log(&self, reports: &[ValidationReport]) -> std::io::Result<usize> {
        let clean_marker = self.config.schema == SchemaKind::Calendar;
        let mut writer = LogWriter::create(&self.log_path)?;
        writer.write_log(render_log(reports, clean_marker))?;
        writer.finish()
    }
}
