//! Integration tests for the processor module
//!
//! Tests the complete batch pipeline against station directories written
//! into temporary folders.

pub mod basic_processing;

use crate::constants::EXPECTED_HEADER;
use std::fs;
use std::path::{Path, PathBuf};

pub const METADATA: &str = "12345\t41.5\t2.1\t50\tX\t2006\t2020\tY";

/// Data line with a space-separated id, year, month and values
pub fn data_line(station: &str, year: i32, month: i32, values: &[&str]) -> String {
    format!("{} {} {} {}", station, year, month, values.join(" "))
}

/// Write a station file with the standard header and metadata lines
pub fn write_station_file(dir: &Path, name: &str, data_lines: &[String]) -> PathBuf {
    let mut contents = format!("{}\n{}\n", EXPECTED_HEADER, METADATA);
    for line in data_lines {
        contents.push_str(line);
        contents.push('\n');
    }
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}
