//! Line-level validation of station files.
//!
//! Detects and normalizes the field delimiter, applies the Gregorian
//! calendar rules, and checks data lines against either the strict
//! fixed-column schema or the calendar-aware schema. Every check returns
//! a [`LineError`] instead of failing; callers decide how to record it.

use crate::config::{CorrectionPolicy, SchemaKind, ValidatorConfig, YearRange};
use crate::constants::{DAYS_IN_MONTH, LEADING_FIELDS, MISSING_SENTINEL, NORMALIZED_DELIMITER};
use crate::error::LineError;
use crate::models::{DataRecord, Delimiter};
use std::borrow::Cow;

/// Pick the most frequent of tab, comma and space in `line`
///
/// Ties go to the delimiter checked first (tab, then comma, then space).
/// A line with none of them is treated as tab-delimited.
pub fn detect_delimiter(line: &str) -> Delimiter {
    let mut best = Delimiter::Tab;
    let mut best_count = 0;
    for delimiter in Delimiter::PRECEDENCE {
        let count = line.matches(delimiter.as_char()).count();
        if count > best_count {
            best = delimiter;
            best_count = count;
        }
    }
    best
}

/// Replace every occurrence of `delimiter` with a tab
///
/// Tab-delimited input is returned unchanged without copying.
pub fn normalize_delimiters(contents: &str, delimiter: Delimiter) -> Cow<'_, str> {
    match delimiter {
        Delimiter::Tab => Cow::Borrowed(contents),
        other => Cow::Owned(contents.replace(other.as_char(), &NORMALIZED_DELIMITER.to_string())),
    }
}

pub fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Calendar days in `month` of `year`, or None for an invalid month
pub fn days_in_month(year: i32, month: i32) -> Option<usize> {
    if !(1..=12).contains(&month) {
        return None;
    }
    if month == 2 && is_leap_year(year) {
        return Some(29);
    }
    Some(DAYS_IN_MONTH[(month - 1) as usize])
}

fn is_sentinel(field: &str) -> bool {
    field == MISSING_SENTINEL
}

/// Day values on a calendar-schema line, excluding one trailing sentinel
fn counted_days(fields: &[&str]) -> usize {
    let values = fields.len().saturating_sub(LEADING_FIELDS);
    match fields.last() {
        Some(last) if values > 0 && is_sentinel(last) => values - 1,
        _ => values,
    }
}

fn parse_year(field: &str) -> Result<i32, LineError> {
    field
        .parse::<i32>()
        .map_err(|_| LineError::parse(format!("invalid year '{}'", field)))
}

fn parse_month(field: &str) -> Result<i32, LineError> {
    field
        .parse::<i32>()
        .map_err(|_| LineError::parse(format!("invalid month '{}'", field)))
}

fn parse_values(fields: &[&str]) -> Result<Vec<Option<f64>>, LineError> {
    fields
        .iter()
        .map(|field| {
            if is_sentinel(field) {
                Ok(None)
            } else {
                field
                    .parse::<f64>()
                    .map(Some)
                    .map_err(|_| LineError::parse(format!("invalid value '{}'", field)))
            }
        })
        .collect()
}

/// Validates data lines under one configured schema
#[derive(Debug, Clone)]
pub struct LineValidator {
    schema: SchemaKind,
    expected_columns: usize,
    year_range: YearRange,
    correction: CorrectionPolicy,
}

impl LineValidator {
    pub fn new(config: &ValidatorConfig) -> Self {
        Self {
            schema: config.schema,
            expected_columns: config.expected_columns,
            year_range: config.year_range,
            correction: config.correction,
        }
    }

    pub fn schema(&self) -> SchemaKind {
        self.schema
    }

    /// Validate one data line and parse it into a record
    ///
    /// `reference_id` is the station id of the file's first data line; only
    /// the calendar schema compares against it.
    pub fn validate_data_line(
        &self,
        line: &str,
        reference_id: Option<&str>,
    ) -> Result<DataRecord, LineError> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        match self.schema {
            SchemaKind::Strict => self.validate_strict(&fields),
            SchemaKind::Calendar => self.validate_calendar(&fields, reference_id),
        }
    }

    fn validate_strict(&self, fields: &[&str]) -> Result<DataRecord, LineError> {
        if fields.len() != self.expected_columns {
            return Err(LineError::structural(format!(
                "Expected {} columns, found {}",
                self.expected_columns,
                fields.len()
            )));
        }
        // A column count below the leading fields is only reachable through
        // an unvalidated config
        if fields.len() < LEADING_FIELDS {
            return Err(LineError::structural("Line has less than 3 columns"));
        }

        let year = parse_year(fields[1])?;
        let month = parse_month(fields[2])?;
        if !(1..=12).contains(&month) {
            return Err(LineError::calendar("Invalid month"));
        }
        let values = parse_values(&fields[LEADING_FIELDS..])?;

        Ok(DataRecord {
            station_id: fields[0].to_string(),
            year,
            month,
            values,
        })
    }

    fn validate_calendar(
        &self,
        fields: &[&str],
        reference_id: Option<&str>,
    ) -> Result<DataRecord, LineError> {
        if fields.len() < LEADING_FIELDS {
            return Err(LineError::structural("Line has less than 3 columns"));
        }

        if reference_id.is_some_and(|id| id != fields[0]) {
            return Err(LineError::calendar("ID mismatch"));
        }

        let year = parse_year(fields[1])?;
        if !self.year_range.contains(year) {
            return Err(LineError::calendar("Year out of range"));
        }

        let month = parse_month(fields[2])?;
        let expected_days =
            days_in_month(year, month).ok_or_else(|| LineError::calendar("Invalid month"))?;

        let actual_days = counted_days(fields);
        if actual_days != expected_days {
            return Err(LineError::calendar(format!(
                "Month {} has {} days of data instead of {}",
                month, actual_days, expected_days
            )));
        }

        let values = parse_values(&fields[LEADING_FIELDS..])?;

        Ok(DataRecord {
            station_id: fields[0].to_string(),
            year,
            month,
            values,
        })
    }

    /// Propose a sentinel-padded replacement for a line short of values
    ///
    /// Returns None when the policy is [`CorrectionPolicy::None`], when the
    /// line is not short, or when padding alone would not make it valid.
    pub fn propose_correction(&self, line: &str, reference_id: Option<&str>) -> Option<String> {
        if self.correction == CorrectionPolicy::None {
            return None;
        }

        let mut fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < LEADING_FIELDS {
            return None;
        }

        match self.schema {
            SchemaKind::Strict => {
                if fields.len() >= self.expected_columns {
                    return None;
                }
                fields.resize(self.expected_columns, MISSING_SENTINEL);
            }
            SchemaKind::Calendar => {
                let year = fields[1].parse::<i32>().ok()?;
                let month = fields[2].parse::<i32>().ok()?;
                let expected_days = days_in_month(year, month)?;
                if counted_days(&fields) >= expected_days {
                    return None;
                }
                // The first pushed sentinel may only become the padding slot
                while counted_days(&fields) < expected_days {
                    fields.push(MISSING_SENTINEL);
                }
            }
        }

        let corrected = fields.join(&NORMALIZED_DELIMITER.to_string());
        self.validate_data_line(&corrected, reference_id)
            .ok()
            .map(|_| corrected)
    }
}
