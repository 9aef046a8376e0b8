//! Station file header and metadata validation.
//!
//! The first two lines of every station file are fixed: a literal header
//! naming the model run, then an eight-field tab-delimited metadata line
//! describing the station. Both are checked after delimiter normalization.

use crate::constants::{EXPECTED_HEADER, METADATA_FIELD_COUNT};
use crate::error::LineError;
use crate::models::StationMetadata;
use std::str::FromStr;

/// Check line 0 against the expected header literal, ignoring trailing whitespace
pub fn validate_header(line: &str) -> bool {
    line.trim_end() == EXPECTED_HEADER
}

/// Check and parse line 1 of a station file
///
/// Fields 1 and 2 must be floats (latitude, longitude), fields 3, 5 and 6
/// integers (elevation/code, start year, end year). Fields 0, 4 and 7 are
/// kept as opaque strings.
pub fn validate_metadata(line: &str) -> Result<StationMetadata, LineError> {
    let line = line.trim_end_matches(['\r', '\n']);
    let parts: Vec<&str> = line.split('\t').collect();
    if parts.len() != METADATA_FIELD_COUNT {
        return Err(LineError::structural(format!(
            "Metadata should have {} columns",
            METADATA_FIELD_COUNT
        )));
    }

    Ok(StationMetadata {
        station_code: parts[0].to_string(),
        latitude: parse_field(parts[1], 1, "latitude")?,
        longitude: parse_field(parts[2], 2, "longitude")?,
        elevation: parse_field(parts[3], 3, "elevation")?,
        label: parts[4].to_string(),
        start_year: parse_field(parts[5], 5, "start year")?,
        end_year: parse_field(parts[6], 6, "end year")?,
        trailer: parts[7].to_string(),
    })
}

fn parse_field<T: FromStr>(value: &str, index: usize, name: &str) -> Result<T, LineError> {
    value.trim().parse::<T>().map_err(|_| {
        LineError::parse(format!(
            "Field {} ({}) is not a valid number: '{}'",
            index, name, value
        ))
    })
}
