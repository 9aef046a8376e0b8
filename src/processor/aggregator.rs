//! Per-file validation and aggregation.
//!
//! Drives the line validator across one station file: detects and
//! normalizes the delimiter, checks header and metadata, validates each
//! data line, and tallies valid records into the file report and a
//! per-year accumulator. Processing is fail-soft; every problem is recorded
//! and the scan continues to the end of the file.

use crate::config::{SchemaKind, ValidatorConfig};
use crate::header::{validate_header, validate_metadata};
use crate::models::{
    Correction, Delimiter, ValidationIssue, ValidationReport, YearlyAccumulator,
};
use crate::validator::{LineValidator, detect_delimiter, normalize_delimiters};
use std::fs;
use std::path::Path;
use tracing::{debug, trace};

/// Index of the first data line (after header and metadata)
const FIRST_DATA_LINE: usize = 2;

/// Report and yearly totals produced for one file
#[derive(Debug, Clone, Default)]
pub struct FileOutcome {
    pub report: ValidationReport,
    pub yearly: YearlyAccumulator,
}

impl FileOutcome {
    /// Outcome for a file that never reached validation
    pub fn failed(path: &Path, reason: impl std::fmt::Display) -> Self {
        let mut report = ValidationReport::new(path);
        report.issues.push(ValidationIssue::file(path, reason));
        Self {
            report,
            yearly: YearlyAccumulator::new(),
        }
    }
}

/// Validates whole files against one configuration
#[derive(Debug, Clone)]
pub struct FileAggregator {
    validator: LineValidator,
    current_year: i32,
    persist_normalized: bool,
}

impl FileAggregator {
    pub fn new(config: &ValidatorConfig) -> Self {
        Self {
            validator: LineValidator::new(config),
            current_year: config.current_year(),
            persist_normalized: config.persist_normalized,
        }
    }

    /// Year after which data lines are skipped
    pub fn current_year(&self) -> i32 {
        self.current_year
    }

    /// Read, validate and aggregate a file on disk
    ///
    /// A file that cannot be read yields a report with a single I/O issue.
    /// With `persist_normalized` set, a non-tab file is rewritten in place
    /// with tab delimiters after validation.
    pub fn validate_path(&self, path: &Path) -> FileOutcome {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                debug!("Could not read {}: {}", path.display(), e);
                return FileOutcome {
                    report: ValidationReport::unreadable(path, &e),
                    yearly: YearlyAccumulator::new(),
                };
            }
        };

        let mut outcome = self.validate_and_aggregate(path, &contents);

        if self.persist_normalized {
            if let Some(delimiter) = outcome.report.delimiter.filter(|d| *d != Delimiter::Tab) {
                let normalized = normalize_delimiters(&contents, delimiter);
                match fs::write(path, normalized.as_bytes()) {
                    Ok(()) => debug!(
                        "Rewrote {} with tab delimiters (was {})",
                        path.display(),
                        delimiter
                    ),
                    Err(e) => outcome.report.issues.push(ValidationIssue::file(path, e)),
                }
            }
        }

        outcome
    }

    /// Validate file contents already in memory
    ///
    /// `path` only labels the report; nothing is read or written.
    pub fn validate_and_aggregate(&self, path: &Path, contents: &str) -> FileOutcome {
        let mut report = ValidationReport::new(path);
        let mut yearly = YearlyAccumulator::new();

        let Some(first_line) = contents.lines().next() else {
            report.issues.push(ValidationIssue::missing_header());
            report.issues.push(ValidationIssue::missing_metadata());
            return FileOutcome { report, yearly };
        };

        let delimiter = detect_delimiter(first_line);
        report.delimiter = Some(delimiter);
        let normalized = normalize_delimiters(contents, delimiter);
        let lines: Vec<&str> = normalized.lines().collect();

        if !validate_header(lines[0]) {
            report.issues.push(ValidationIssue::header(lines[0]));
        }

        match lines.get(1) {
            Some(line) => {
                if let Err(e) = validate_metadata(line) {
                    report
                        .issues
                        .push(ValidationIssue::metadata(line, e.kind, &e.reason));
                }
            }
            None => report.issues.push(ValidationIssue::missing_metadata()),
        }

        let reference_id = match self.validator.schema() {
            SchemaKind::Calendar => lines
                .iter()
                .skip(FIRST_DATA_LINE)
                .find_map(|line| line.split_whitespace().next()),
            SchemaKind::Strict => None,
        };

        for (index, line) in lines.iter().enumerate().skip(FIRST_DATA_LINE) {
            let line_number = index + 1;
            if line.trim().is_empty() {
                continue;
            }

            let year = line
                .split_whitespace()
                .nth(1)
                .and_then(|field| field.parse::<i32>().ok());
            if year.is_some_and(|year| year > self.current_year) {
                trace!("Skipping future year on line {}", line_number);
                continue;
            }

            match self.validator.validate_data_line(line, reference_id) {
                Ok(record) => {
                    report.tally(&record);
                    yearly.record(&record);
                }
                Err(e) => {
                    report
                        .issues
                        .push(ValidationIssue::line(line_number, line, e.kind, &e.reason));
                    if let Some(corrected) = self.validator.propose_correction(line, reference_id)
                    {
                        report.corrections.push(Correction {
                            line_number,
                            original: line.trim().to_string(),
                            corrected,
                        });
                    }
                }
            }
        }

        debug!(
            "Validated {}: {} errors, {} lines processed",
            path.display(),
            report.error_count(),
            report.lines_processed
        );

        FileOutcome { report, yearly }
    }
}
