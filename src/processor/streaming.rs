//! Concurrent file validation
//!
//! Maps station files onto a bounded pool of blocking tasks, one file per
//! task, and folds the per-file accumulators into a single batch
//! accumulator on the orchestrating task as results arrive.

use crate::models::{ValidationReport, YearlyAccumulator};
use crate::processor::aggregator::{FileAggregator, FileOutcome};

use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::pin::pin;
use std::sync::Arc;
use tokio::task;
use tracing::{debug, error};

/// Reports and merged yearly totals for a set of files
#[derive(Debug, Clone, Default)]
pub struct StreamResult {
    /// One report per input file, in completion order
    pub reports: Vec<ValidationReport>,
    pub yearly: YearlyAccumulator,
}

/// Bounded concurrent validator
#[derive(Debug, Clone)]
pub struct StreamingProcessor {
    aggregator: Arc<FileAggregator>,
    workers: usize,
    show_progress: bool,
}

impl StreamingProcessor {
    pub fn new(aggregator: FileAggregator, workers: usize) -> Self {
        Self {
            aggregator: Arc::new(aggregator),
            workers: workers.max(1),
            show_progress: true,
        }
    }

    /// Enable or hide the progress bar
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(len as u64);
        if let Ok(style) = ProgressStyle::default_bar().template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
        ) {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb.set_message("Validating files");
        pb
    }

    /// Validate every file and merge the results
    ///
    /// A worker that panics yields an I/O issue for its file rather than
    /// aborting the batch.
    pub async fn process_files(&self, files: &[PathBuf]) -> StreamResult {
        let pb = self.progress_bar(files.len());
        let concurrent_limit = self.workers.min(files.len()).max(1);
        debug!(
            "Validating {} files with {} workers",
            files.len(),
            concurrent_limit
        );

        let mut result = StreamResult::default();
        let outcomes = stream::iter(files.iter().cloned())
            .map(|path| {
                let aggregator = Arc::clone(&self.aggregator);
                let pb = pb.clone();
                async move {
                    if let Some(file_name) = path.file_name() {
                        pb.set_message(format!("Validating: {}", file_name.to_string_lossy()));
                    }

                    let task_path = path.clone();
                    let outcome = task::spawn_blocking(move || aggregator.validate_path(&task_path))
                        .await
                        .unwrap_or_else(|e| {
                            error!("Worker failed on {}: {}", path.display(), e);
                            FileOutcome::failed(&path, e)
                        });
                    pb.inc(1);
                    outcome
                }
            })
            .buffer_unordered(concurrent_limit);
        let mut outcomes = pin!(outcomes);

        // Merges stay on this task, one per completed file
        while let Some(outcome) = outcomes.next().await {
            result.yearly.merge(&outcome.yearly);
            result.reports.push(outcome.report);
        }

        pb.finish_with_message("Validation complete");
        result
    }
}
