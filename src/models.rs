//! Core data structures for station file validation.
//!
//! Defines the delimiter and record types, the per-year accumulator that
//! merges statistics across files, and the per-file validation report.

use crate::error::IssueKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Field delimiter detected on a file's first line
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Delimiter {
    Tab,
    Comma,
    Space,
}

impl Delimiter {
    /// Order in which delimiters are counted; earlier entries win ties
    pub const PRECEDENCE: [Delimiter; 3] = [Delimiter::Tab, Delimiter::Comma, Delimiter::Space];

    pub fn as_char(&self) -> char {
        match self {
            Delimiter::Tab => '\t',
            Delimiter::Comma => ',',
            Delimiter::Space => ' ',
        }
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Delimiter::Tab => "tab",
            Delimiter::Comma => "comma",
            Delimiter::Space => "space",
        };
        f.write_str(name)
    }
}

/// Second line of a station file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationMetadata {
    pub station_code: String,
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: i64,
    pub label: String,
    pub start_year: i32,
    pub end_year: i32,
    pub trailer: String,
}

/// One validated monthly row of daily readings
#[derive(Debug, Clone, PartialEq)]
pub struct DataRecord {
    pub station_id: String,
    pub year: i32,
    pub month: i32,
    /// Daily readings in order; `None` marks the missing sentinel
    pub values: Vec<Option<f64>>,
}

impl DataRecord {
    /// Number of value slots, sentinels included
    pub fn value_count(&self) -> usize {
        self.values.len()
    }

    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_none()).count()
    }

    /// Sum of all recorded (non-sentinel) readings
    pub fn rainfall(&self) -> f64 {
        self.values.iter().flatten().sum()
    }
}

/// Running totals for one year
///
/// Every field combines associatively, so totals merged from any split of
/// the input agree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct YearTotals {
    pub total_rainfall: f64,
    /// Valid data records contributing to this year
    pub count: usize,
    /// Non-sentinel daily readings
    pub value_count: usize,
    pub sum_sq: f64,
    pub max: Option<f64>,
    pub min: Option<f64>,
}

impl YearTotals {
    /// Mean rainfall per contributing record
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total_rainfall / self.count as f64
        }
    }

    /// Population standard deviation of the daily readings
    pub fn std_dev(&self) -> f64 {
        if self.value_count == 0 {
            return 0.0;
        }
        let n = self.value_count as f64;
        let mean = self.total_rainfall / n;
        (self.sum_sq / n - mean * mean).max(0.0).sqrt()
    }

    /// Standard deviation as a percentage of the record mean, 0 when the mean is 0
    pub fn variability_index(&self) -> f64 {
        let mean = self.mean();
        if mean == 0.0 {
            0.0
        } else {
            self.std_dev() / mean * 100.0
        }
    }

    fn add_reading(&mut self, value: f64) {
        self.total_rainfall += value;
        self.value_count += 1;
        self.sum_sq += value * value;
        self.max = Some(self.max.map_or(value, |max| max.max(value)));
        self.min = Some(self.min.map_or(value, |min| min.min(value)));
    }

    fn combine(&mut self, other: &YearTotals) {
        self.total_rainfall += other.total_rainfall;
        self.count += other.count;
        self.value_count += other.value_count;
        self.sum_sq += other.sum_sq;
        self.max = extreme(self.max, other.max, f64::max);
        self.min = extreme(self.min, other.min, f64::min);
    }
}

fn extreme(a: Option<f64>, b: Option<f64>, pick: fn(f64, f64) -> f64) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(pick(a, b)),
        (a, None) => a,
        (None, b) => b,
    }
}

/// Summary statistics for one year, as shown in the batch report
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnualStatistics {
    pub mean: f64,
    /// Largest daily reading, 0 when the year has none
    pub max: f64,
    pub min: f64,
    pub std_dev: f64,
    pub variability_index: f64,
}

impl From<&YearTotals> for AnnualStatistics {
    fn from(totals: &YearTotals) -> Self {
        Self {
            mean: totals.mean(),
            max: totals.max.unwrap_or(0.0),
            min: totals.min.unwrap_or(0.0),
            std_dev: totals.std_dev(),
            variability_index: totals.variability_index(),
        }
    }
}

/// Per-year rainfall totals, merged additively across records and files
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct YearlyAccumulator {
    years: BTreeMap<i32, YearTotals>,
}

impl YearlyAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one valid record and its readings to the record's year
    pub fn record(&mut self, record: &DataRecord) {
        let totals = self.years.entry(record.year).or_default();
        for value in record.values.iter().flatten() {
            totals.add_reading(*value);
        }
        totals.count += 1;
    }

    /// Fold another accumulator into this one
    pub fn merge(&mut self, other: &YearlyAccumulator) {
        for (year, totals) in &other.years {
            self.years.entry(*year).or_default().combine(totals);
        }
    }

    /// Reduce a sequence of accumulators into one
    pub fn merged<'a>(accumulators: impl IntoIterator<Item = &'a YearlyAccumulator>) -> Self {
        let mut merged = Self::new();
        for accumulator in accumulators {
            merged.merge(accumulator);
        }
        merged
    }

    pub fn get(&self, year: i32) -> Option<&YearTotals> {
        self.years.get(&year)
    }

    /// Years in ascending order with their totals
    pub fn iter(&self) -> impl Iterator<Item = (i32, &YearTotals)> {
        self.years.iter().map(|(year, totals)| (*year, totals))
    }

    pub fn len(&self) -> usize {
        self.years.len()
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    pub fn first_year(&self) -> Option<i32> {
        self.years.keys().next().copied()
    }

    pub fn last_year(&self) -> Option<i32> {
        self.years.keys().next_back().copied()
    }

    /// Mean rainfall per record for every year
    pub fn annual_means(&self) -> BTreeMap<i32, f64> {
        self.years
            .iter()
            .map(|(year, totals)| (*year, totals.mean()))
            .collect()
    }

    /// Mean, extremes, spread and variability index for every year
    pub fn annual_statistics(&self) -> BTreeMap<i32, AnnualStatistics> {
        self.years
            .iter()
            .map(|(year, totals)| (*year, AnnualStatistics::from(totals)))
            .collect()
    }
}

/// Where in a file a validation issue was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueLocation {
    Header,
    Metadata,
    /// 1-based physical line number
    Line(usize),
    /// The file as a whole (unreadable, unwritable)
    File,
}

/// One recorded validation failure
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationIssue {
    pub location: IssueLocation,
    pub kind: IssueKind,
    /// Fully formatted log message
    pub message: String,
}

impl ValidationIssue {
    pub fn header(line: &str) -> Self {
        Self {
            location: IssueLocation::Header,
            kind: IssueKind::Structural,
            message: format!("Invalid header: {}", line.trim()),
        }
    }

    pub fn metadata(line: &str, kind: IssueKind, reason: &str) -> Self {
        Self {
            location: IssueLocation::Metadata,
            kind,
            message: format!("Metadata error: {} - {}", line.trim(), reason),
        }
    }

    pub fn line(line_number: usize, line: &str, kind: IssueKind, reason: &str) -> Self {
        Self {
            location: IssueLocation::Line(line_number),
            kind,
            message: format!("Line {} error: {} - {}", line_number, line.trim(), reason),
        }
    }

    pub fn missing_header() -> Self {
        Self {
            location: IssueLocation::Header,
            kind: IssueKind::Structural,
            message: "Invalid header: missing header line".to_string(),
        }
    }

    pub fn missing_metadata() -> Self {
        Self {
            location: IssueLocation::Metadata,
            kind: IssueKind::Structural,
            message: "Metadata error: missing metadata line".to_string(),
        }
    }

    /// Failure affecting the whole file (read, rewrite, worker crash)
    pub fn file(path: &Path, reason: impl fmt::Display) -> Self {
        Self {
            location: IssueLocation::File,
            kind: IssueKind::Io,
            message: format!("Error processing file {}: {}", path.display(), reason),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Padded replacement proposed for a short data line
#[derive(Debug, Clone, PartialEq)]
pub struct Correction {
    pub line_number: usize,
    pub original: String,
    pub corrected: String,
}

/// Per-file validation result
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    pub path: PathBuf,
    /// Delimiter detected on line 0, if the file had one
    pub delimiter: Option<Delimiter>,
    pub issues: Vec<ValidationIssue>,
    pub corrections: Vec<Correction>,
    pub total_values: usize,
    pub missing_values: usize,
    pub total_rainfall: f64,
    pub lines_processed: usize,
}

impl ValidationReport {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Report for a file that could not be opened at all
    pub fn unreadable(path: impl Into<PathBuf>, error: &std::io::Error) -> Self {
        let mut report = Self::new(path);
        let issue = ValidationIssue::file(&report.path, error);
        report.issues.push(issue);
        report
    }

    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.issues.len()
    }

    /// Formatted error messages in the order they were found
    pub fn error_messages(&self) -> impl Iterator<Item = &str> {
        self.issues.iter().map(|issue| issue.message.as_str())
    }

    pub fn count_of(&self, kind: IssueKind) -> usize {
        self.issues.iter().filter(|issue| issue.kind == kind).count()
    }

    /// Tally a valid record into the file counters
    pub(crate) fn tally(&mut self, record: &DataRecord) {
        self.total_values += record.value_count();
        self.missing_values += record.missing_count();
        self.total_rainfall += record.rainfall();
        self.lines_processed += 1;
    }
}

/// First-line format of one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFormat {
    pub path: PathBuf,
    pub delimiter: Delimiter,
    pub columns: usize,
}

/// Result of the directory-wide first-line format scan
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormatCheck {
    pub formats: Vec<FileFormat>,
    /// Files skipped because their first line could not be read
    pub unreadable: Vec<PathBuf>,
}

impl FormatCheck {
    /// Distinct (delimiter, column count) pairs in sorted order
    pub fn distinct_formats(&self) -> Vec<(Delimiter, usize)> {
        let mut distinct: Vec<_> = self
            .formats
            .iter()
            .map(|format| (format.delimiter, format.columns))
            .collect();
        distinct.sort();
        distinct.dedup();
        distinct
    }

    /// True when every readable file shares one format
    pub fn is_uniform(&self) -> bool {
        self.distinct_formats().len() <= 1
    }
}
