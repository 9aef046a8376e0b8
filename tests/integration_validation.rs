//! Integration tests for the public validation API
//!
//! These tests drive the library the way a caller would: pure line and file
//! validation on in-memory contents, and full batch runs over a station
//! directory written to a temporary folder.

use precip_validator::constants::EXPECTED_HEADER;
use precip_validator::validator::is_leap_year;
use precip_validator::{
    BatchProcessor, Delimiter, FileAggregator, LineValidator, SchemaKind, ValidatorConfig,
    YearlyAccumulator, detect_delimiter, normalize_delimiters,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const METADATA: &str = "12345\t41.5\t2.1\t50\tX\t2006\t2020\tY";

fn station_contents(data_lines: &[String]) -> String {
    let mut contents = format!("{}\n{}\n", EXPECTED_HEADER, METADATA);
    for line in data_lines {
        contents.push_str(line);
        contents.push('\n');
    }
    contents
}

fn month_line(year: i32, month: i32, values: &[&str]) -> String {
    format!("12345 {} {} {}", year, month, values.join(" "))
}

/// Leap year rule at the century boundaries
///
/// Purpose: Validate the Gregorian leap year rule used by the calendar schema
#[test]
fn test_leap_year_rule() {
    assert!(is_leap_year(2000));
    assert!(!is_leap_year(1900));
    assert!(is_leap_year(2004));
    assert!(!is_leap_year(2021));
}

/// Delimiter detection counts and precedence
#[test]
fn test_delimiter_detection() {
    assert_eq!(detect_delimiter("a\tb\tc\td\te\tf,g,h"), Delimiter::Tab);
    assert_eq!(detect_delimiter("a,b,c\td"), Delimiter::Comma);
    assert_eq!(detect_delimiter("a\tb c"), Delimiter::Tab);

    let normalized = normalize_delimiters("a b c\n1 2 3\n", Delimiter::Space);
    assert_eq!(normalized, "a\tb\tc\n1\t2\t3\n");
}

/// Strict schema: 34 fields per line, sentinel values allowed
#[test]
fn test_strict_lines() {
    let validator = LineValidator::new(&ValidatorConfig::default());

    let mut values = vec!["0.5"; 29];
    values.extend(["-999", "-999"]);
    let record = validator
        .validate_data_line(&month_line(2015, 4, &values), None)
        .unwrap();
    assert_eq!(record.value_count(), 31);
    assert_eq!(record.missing_count(), 2);

    let err = validator
        .validate_data_line(&month_line(2015, 4, &["0.5"; 30]), None)
        .unwrap_err();
    assert_eq!(err.reason, "Expected 34 columns, found 33");
}

/// End-to-end: one non-leap February under the calendar schema
///
/// Purpose: Validate header, metadata, and data line checks together on one file
#[test]
fn test_calendar_february_file() {
    let config = ValidatorConfig::default()
        .with_schema(SchemaKind::Calendar)
        .with_reference_year(2024);
    let aggregator = FileAggregator::new(&config);

    let clean = station_contents(&[month_line(2010, 2, &["1.25"; 28])]);
    let outcome = aggregator.validate_and_aggregate(Path::new("clean.dat"), &clean);
    assert!(outcome.report.is_valid());
    assert_eq!(outcome.report.lines_processed, 1);
    assert_eq!(outcome.yearly.get(2010).unwrap().count, 1);
    assert_eq!(outcome.yearly.get(2010).unwrap().total_rainfall, 35.0);

    let too_long = station_contents(&[month_line(2010, 2, &["1"; 29])]);
    let outcome = aggregator.validate_and_aggregate(Path::new("long.dat"), &too_long);
    let messages: Vec<&str> = outcome.report.error_messages().collect();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].starts_with("Line 3 error: "));
    assert!(messages[0].ends_with("- Month 2 has 29 days of data instead of 28"));

    let mut padded_values = vec!["1"; 28];
    padded_values.push("-999");
    let padded = station_contents(&[month_line(2010, 2, &padded_values)]);
    let outcome = aggregator.validate_and_aggregate(Path::new("padded.dat"), &padded);
    assert!(outcome.report.is_valid());
    assert_eq!(outcome.report.missing_values, 1);
}

/// Future years never reach the tallies
#[test]
fn test_future_year_exclusion() {
    let config = ValidatorConfig::default().with_reference_year(2020);
    let aggregator = FileAggregator::new(&config);

    let contents = station_contents(&[
        month_line(2019, 1, &["1"; 31]),
        month_line(2021, 1, &["1"; 31]),
    ]);
    let outcome = aggregator.validate_and_aggregate(Path::new("f.dat"), &contents);

    assert!(outcome.report.is_valid());
    assert_eq!(outcome.report.lines_processed, 1);
    assert_eq!(outcome.report.total_values, 31);
    assert!(outcome.yearly.get(2021).is_none());
}

/// Per-file accumulators merge to the same totals in any grouping
#[test]
fn test_accumulators_merge_in_any_order() {
    let aggregator = FileAggregator::new(&ValidatorConfig::default().with_reference_year(2024));
    let files: Vec<String> = (0..4)
        .map(|i| {
            let value = (i + 1).to_string();
            station_contents(&[
                month_line(2010 + i % 2, 1, &[value.as_str(); 31]),
                month_line(2012, 3, &["2"; 31]),
            ])
        })
        .collect();
    let accumulators: Vec<YearlyAccumulator> = files
        .iter()
        .map(|contents| {
            aggregator
                .validate_and_aggregate(Path::new("s.dat"), contents)
                .yearly
        })
        .collect();

    let one_pass = YearlyAccumulator::merged(&accumulators);
    let left = YearlyAccumulator::merged([&accumulators[3], &accumulators[0]]);
    let right = YearlyAccumulator::merged([&accumulators[2], &accumulators[1]]);
    assert_eq!(one_pass, YearlyAccumulator::merged([&right, &left]));
    assert_eq!(one_pass.get(2012).unwrap().count, 4);
}

/// Full batch run over a directory with a log file
#[tokio::test]
async fn test_batch_run_writes_log() {
    let temp_dir = TempDir::new().unwrap();
    let data_dir = temp_dir.path().join("stations");
    fs::create_dir_all(&data_dir).unwrap();

    fs::write(
        data_dir.join("good.dat"),
        station_contents(&[month_line(2010, 1, &["3"; 31])]),
    )
    .unwrap();
    fs::write(
        data_dir.join("bad.dat"),
        station_contents(&[month_line(2010, 1, &["3"; 20])]),
    )
    .unwrap();

    let log_path = temp_dir.path().join("validation_log.txt");
    let outcome = BatchProcessor::new(&data_dir, &log_path)
        .unwrap()
        .with_config(ValidatorConfig::default().with_reference_year(2024))
        .with_progress(false)
        .process()
        .await
        .unwrap();

    assert_eq!(outcome.totals.files_scanned, 2);
    assert_eq!(outcome.totals.files_with_errors, 1);
    assert_eq!(outcome.summary.total_rainfall, 93.0);

    let log = fs::read_to_string(&log_path).unwrap();
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(
        lines[0],
        format!("Invalid file format: {}", data_dir.join("bad.dat").display())
    );
    assert!(lines[1].starts_with("  Line 3 error: "));
    assert!(lines[1].ends_with("- Expected 34 columns, found 23"));
}
