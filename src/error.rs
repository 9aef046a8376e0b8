//! Error handling for station file validation.
//!
//! Two layers of failure exist. [`ValidatorError`] covers batch-level problems
//! that stop a run (missing directory, bad configuration, unwritable log).
//! [`LineError`] covers a single rejected line and is always recorded in a
//! report instead of being propagated.

use crate::processor::BatchOutcome;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ValidatorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// The batch log could not be written. The results computed before the
    /// failure travel with the error.
    #[error("Failed to write log file {path}: {source}")]
    LogWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
        partial: Box<BatchOutcome>,
    },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Invalid configuration file {path}: {source}")]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, ValidatorError>;

/// Category of a recorded validation failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueKind {
    /// Bad header, metadata shape, or field count
    Structural,
    /// Day count, month, year range, or station id mismatch
    Calendar,
    /// Non-numeric value where a number is required
    Parse,
    /// File could not be read or rewritten
    Io,
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IssueKind::Structural => "structural",
            IssueKind::Calendar => "calendar",
            IssueKind::Parse => "parse",
            IssueKind::Io => "io",
        };
        f.write_str(name)
    }
}

/// Reason a single line was rejected
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{reason}")]
pub struct LineError {
    pub kind: IssueKind,
    pub reason: String,
}

impl LineError {
    pub fn structural(reason: impl Into<String>) -> Self {
        Self {
            kind: IssueKind::Structural,
            reason: reason.into(),
        }
    }

    pub fn calendar(reason: impl Into<String>) -> Self {
        Self {
            kind: IssueKind::Calendar,
            reason: reason.into(),
        }
    }

    pub fn parse(reason: impl Into<String>) -> Self {
        Self {
            kind: IssueKind::Parse,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_error_displays_reason_only() {
        let err = LineError::calendar("Month 2 has 29 days of data instead of 28");
        assert_eq!(err.kind, IssueKind::Calendar);
        assert_eq!(err.to_string(), "Month 2 has 29 days of data instead of 28");
    }

    #[test]
    fn test_directory_not_found_message() {
        let err = ValidatorError::DirectoryNotFound {
            path: PathBuf::from("/no/such/dir"),
        };
        assert_eq!(err.to_string(), "Directory not found: /no/such/dir");
    }
}
