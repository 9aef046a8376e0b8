//! Configuration management and validation.
//!
//! Provides the validation configuration (schema variant, column count,
//! accepted year range, correction policy) together with batch settings
//! and TOML file loading.

use crate::constants::{
    DEFAULT_EXPECTED_COLUMNS, DEFAULT_FILE_EXTENSION, DEFAULT_YEAR_MAX, DEFAULT_YEAR_MIN,
    MIN_EXPECTED_COLUMNS,
};
use crate::error::{Result, ValidatorError};
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Data line schema variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SchemaKind {
    /// Fixed column count, every non-sentinel value must be numeric
    #[default]
    Strict,
    /// Day count must match the calendar month, with station id and year checks
    Calendar,
}

/// What to do with a data line that is short of values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum CorrectionPolicy {
    /// Only report the error
    #[default]
    None,
    /// Also propose a corrected line padded with `-999` slots
    PadMissing,
}

/// Inclusive year range accepted by the calendar schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub min: i32,
    pub max: i32,
}

impl YearRange {
    pub fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, year: i32) -> bool {
        (self.min..=self.max).contains(&year)
    }
}

impl Default for YearRange {
    fn default() -> Self {
        Self::new(DEFAULT_YEAR_MIN, DEFAULT_YEAR_MAX)
    }
}

/// Global configuration for a validation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ValidatorConfig {
    /// Data line schema variant
    pub schema: SchemaKind,

    /// Total field count per data line under the strict schema
    pub expected_columns: usize,

    /// Accepted years under the calendar schema
    pub year_range: YearRange,

    /// Correction proposals for short data lines
    pub correction: CorrectionPolicy,

    /// Number of files validated concurrently
    pub workers: usize,

    /// Extension (without dot) of station files to pick up
    pub file_extension: String,

    /// Year treated as "now" for the future-year filter (None = current year)
    pub reference_year: Option<i32>,

    /// Rewrite files in place with tab delimiters when they used another one
    pub persist_normalized: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            schema: SchemaKind::default(),
            expected_columns: DEFAULT_EXPECTED_COLUMNS,
            year_range: YearRange::default(),
            correction: CorrectionPolicy::default(),
            workers: num_cpus::get(),
            file_extension: DEFAULT_FILE_EXTENSION.to_string(),
            reference_year: None,
            persist_normalized: false,
        }
    }
}

impl ValidatorConfig {
    /// Load configuration from a TOML file; absent keys keep their defaults
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents).map_err(|source| ValidatorError::ConfigFile {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn with_schema(mut self, schema: SchemaKind) -> Self {
        self.schema = schema;
        self
    }

    pub fn with_expected_columns(mut self, expected_columns: usize) -> Self {
        self.expected_columns = expected_columns;
        self
    }

    pub fn with_year_range(mut self, year_range: YearRange) -> Self {
        self.year_range = year_range;
        self
    }

    pub fn with_correction(mut self, correction: CorrectionPolicy) -> Self {
        self.correction = correction;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Pin the year used by the future-year filter
    pub fn with_reference_year(mut self, year: i32) -> Self {
        self.reference_year = Some(year);
        self
    }

    pub fn with_persist_normalized(mut self, persist: bool) -> Self {
        self.persist_normalized = persist;
        self
    }

    /// Year beyond which data lines are excluded from statistics
    pub fn current_year(&self) -> i32 {
        self.reference_year
            .unwrap_or_else(|| chrono::Local::now().year())
    }

    /// Reject settings the validator cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.year_range.min > self.year_range.max {
            return Err(ValidatorError::Configuration {
                message: format!(
                    "year range minimum {} is greater than maximum {}",
                    self.year_range.min, self.year_range.max
                ),
            });
        }

        if self.schema == SchemaKind::Strict && self.expected_columns < MIN_EXPECTED_COLUMNS {
            return Err(ValidatorError::Configuration {
                message: format!(
                    "expected columns must be at least {}, got {}",
                    MIN_EXPECTED_COLUMNS, self.expected_columns
                ),
            });
        }

        if self.workers == 0 {
            return Err(ValidatorError::Configuration {
                message: "workers must be greater than zero".to_string(),
            });
        }

        if self.file_extension.trim().is_empty() {
            return Err(ValidatorError::Configuration {
                message: "file extension must not be empty".to_string(),
            });
        }

        Ok(())
    }
}
