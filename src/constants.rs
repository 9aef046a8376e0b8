//! Application constants for the precipitation validator
//!
//! This module contains the fixed file-format literals, default values,
//! and calendar tables used throughout the validator.

// =============================================================================
// Station File Format
// =============================================================================

/// Exact header line every station file must start with (tab-delimited form)
pub const EXPECTED_HEADER: &str = "precip\tMIROC5\tRCP60\tREGRESION\tdecimas\t1";

/// Reserved value meaning "no reading recorded" for a day
pub const MISSING_SENTINEL: &str = "-999";

/// Number of tab-separated fields in the metadata line
pub const METADATA_FIELD_COUNT: usize = 8;

/// Leading fields on every data line: station id, year, month
pub const LEADING_FIELDS: usize = 3;

/// Delimiter every file is normalized to before validation
pub const NORMALIZED_DELIMITER: char = '\t';

/// Extension of station data files
pub const DEFAULT_FILE_EXTENSION: &str = "dat";

// =============================================================================
// Validation Defaults
// =============================================================================

/// Strict schema column count: id + year + month + 31 day slots
pub const DEFAULT_EXPECTED_COLUMNS: usize = 34;

/// Smallest column count that still leaves room for one day value
pub const MIN_EXPECTED_COLUMNS: usize = LEADING_FIELDS + 1;

/// Inclusive year range accepted by the calendar-aware schema
pub const DEFAULT_YEAR_MIN: i32 = 2005;
pub const DEFAULT_YEAR_MAX: i32 = 2101;

/// Days per month for a non-leap year, indexed by `month - 1`
pub const DAYS_IN_MONTH: [usize; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

// =============================================================================
// Output
// =============================================================================

/// Default batch log file name
pub const DEFAULT_LOG_FILE: &str = "validation_log.txt";

/// Marker written to the log when a calendar-schema batch has no errors
pub const NO_ERROR_MARKER: &str = "NO ERROR";

/// Indentation applied to each error line under a file block in the log
pub const LOG_ERROR_INDENT: &str = "  ";

/// Directory name under the user config dir holding `config.toml`
pub const CONFIG_DIR_NAME: &str = "precip-validator";

/// Config file name looked up when `--config` is not given
pub const CONFIG_FILE_NAME: &str = "config.toml";
