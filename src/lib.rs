//! Precipitation Station File Validator
//!
//! A Rust library for validating fixed-format daily precipitation station
//! files and summarizing their yearly rainfall.
//!
//! This library provides tools for:
//! - Detecting and normalizing field delimiters
//! - Checking the header and station metadata lines
//! - Validating data lines against a strict column schema or a
//!   calendar-aware, leap-year-aware schema
//! - Aggregating valid records into per-year totals with order-independent merging
//! - Deriving directory-wide statistics (extreme years, annual change, missing values)
//! - Writing a plain-text validation log per batch

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod header;
pub mod models;
pub mod processor;
pub mod report;
pub mod stats;
pub mod validator;

pub use config::{CorrectionPolicy, SchemaKind, ValidatorConfig, YearRange};
pub use error::{IssueKind, LineError, Result, ValidatorError};
pub use models::{
    AnnualStatistics, DataRecord, Delimiter, StationMetadata, ValidationIssue, ValidationReport,
    YearTotals, YearlyAccumulator,
};
pub use processor::aggregator::{FileAggregator, FileOutcome};
pub use processor::{BatchOutcome, BatchProcessor};
pub use stats::{BatchTotals, DirectorySummary};
pub use validator::{LineValidator, detect_delimiter, normalize_delimiters};
