//! Basic processing integration tests

use super::{data_line, write_station_file};
use crate::config::{SchemaKind, ValidatorConfig};
use crate::processor::BatchProcessor;
use std::fs;
use tempfile::TempDir;

fn test_config() -> ValidatorConfig {
    ValidatorConfig::default()
        .with_reference_year(2024)
        .with_workers(2)
}

/// One clean strict-schema station with two months of data
fn create_minimal_directory(temp_dir: &TempDir) -> std::path::PathBuf {
    let data_dir = temp_dir.path().join("stations");
    fs::create_dir_all(&data_dir).unwrap();

    let mut february = vec!["2"; 28];
    february.extend(["-999"; 3]);
    write_station_file(
        &data_dir,
        "station1.dat",
        &[
            data_line("12345", 2010, 1, &["1"; 31]),
            data_line("12345", 2010, 2, &february),
        ],
    );
    data_dir
}

#[tokio::test]
async fn test_basic_processing_pipeline() {
    let temp_dir = TempDir::new().unwrap();
    let data_dir = create_minimal_directory(&temp_dir);
    let log_path = temp_dir.path().join("validation_log.txt");

    let outcome = BatchProcessor::new(&data_dir, &log_path)
        .unwrap()
        .with_config(test_config())
        .with_progress(false)
        .process()
        .await
        .unwrap();

    assert_eq!(outcome.reports.len(), 1);
    assert_eq!(outcome.totals.files_scanned, 1);
    assert_eq!(outcome.totals.files_with_errors, 0);
    assert_eq!(outcome.totals.total_errors, 0);
    assert_eq!(outcome.totals.lines_processed, 2);
    assert_eq!(outcome.totals.total_values, 62);
    assert_eq!(outcome.totals.missing_values, 3);
    assert_eq!(outcome.totals.total_rainfall, 87.0);

    assert_eq!(outcome.summary.total_years, 1);
    assert_eq!(outcome.summary.driest_year, Some((2010, 87.0)));
    assert_eq!(outcome.yearly.get(2010).unwrap().count, 2);

    // Clean strict batch leaves an empty log
    assert!(log_path.exists());
    assert_eq!(fs::read_to_string(&log_path).unwrap(), "");
}

#[tokio::test]
async fn test_calendar_clean_batch_writes_marker() {
    let temp_dir = TempDir::new().unwrap();
    let data_dir = temp_dir.path().join("stations");
    fs::create_dir_all(&data_dir).unwrap();
    write_station_file(
        &data_dir,
        "feb.dat",
        &[data_line("12345", 2010, 2, &["1.5"; 28])],
    );
    let log_path = temp_dir.path().join("log.txt");

    let outcome = BatchProcessor::new(&data_dir, &log_path)
        .unwrap()
        .with_config(test_config().with_schema(SchemaKind::Calendar))
        .with_progress(false)
        .process()
        .await
        .unwrap();

    assert!(outcome.totals.is_clean());
    assert_eq!(outcome.yearly.get(2010).unwrap().count, 1);
    assert_eq!(fs::read_to_string(&log_path).unwrap(), "NO ERROR\n");
}

#[tokio::test]
async fn test_empty_directory() {
    let temp_dir = TempDir::new().unwrap();
    let data_dir = temp_dir.path().join("empty");
    fs::create_dir_all(&data_dir).unwrap();
    let log_path = temp_dir.path().join("log.txt");

    let outcome = BatchProcessor::new(&data_dir, &log_path)
        .unwrap()
        .with_config(test_config())
        .with_progress(false)
        .process()
        .await
        .unwrap();

    assert!(outcome.reports.is_empty());
    assert_eq!(outcome.totals.files_scanned, 0);
    assert_eq!(outcome.summary.total_years, 0);
    assert_eq!(outcome.summary.driest_year, None);
    assert!(outcome.format_check.is_uniform());
}

#[tokio::test]
async fn test_only_matching_extension_is_validated() {
    let temp_dir = TempDir::new().unwrap();
    let data_dir = create_minimal_directory(&temp_dir);
    fs::write(data_dir.join("readme.txt"), "not a station file").unwrap();

    let outcome = BatchProcessor::new(&data_dir, temp_dir.path().join("log.txt"))
        .unwrap()
        .with_config(test_config())
        .with_progress(false)
        .process()
        .await
        .unwrap();

    assert_eq!(outcome.reports.len(), 1);
    assert!(outcome.reports[0].path.ends_with("station1.dat"));
}

#[tokio::test]
async fn test_persist_normalized_rewrites_comma_files() {
    let temp_dir = TempDir::new().unwrap();
    let data_dir = temp_dir.path().join("stations");
    fs::create_dir_all(&data_dir).unwrap();

    let path = write_station_file(
        &data_dir,
        "comma.dat",
        &[data_line("12345", 2010, 1, &["1"; 31])],
    );
    let comma = fs::read_to_string(&path)
        .unwrap()
        .replace(['\t', ' '], ",");
    fs::write(&path, comma).unwrap();

    let outcome = BatchProcessor::new(&data_dir, temp_dir.path().join("log.txt"))
        .unwrap()
        .with_config(test_config().with_persist_normalized(true))
        .with_progress(false)
        .process()
        .await
        .unwrap();

    assert!(outcome.totals.is_clean());
    let rewritten = fs::read_to_string(&path).unwrap();
    assert!(!rewritten.contains(','));
    assert!(rewritten.starts_with(crate::constants::EXPECTED_HEADER));
}
