//! Batch summary presentation.
//!
//! The processor hands its finished [`BatchOutcome`] to a [`ReportSink`];
//! [`ConsoleReporter`] is the terminal implementation used by the binary.

use crate::processor::BatchOutcome;
use crate::stats::YearValue;

use colored::*;
use std::io::{self, Write};

/// Receiver of a finished batch summary
pub trait ReportSink {
    fn emit_report(&mut self, outcome: &BatchOutcome) -> io::Result<()>;
}

/// Summary rows as `(label, value)` pairs, without styling
pub fn summary_lines(outcome: &BatchOutcome) -> Vec<(&'static str, String)> {
    let totals = &outcome.totals;
    let summary = &outcome.summary;

    vec![
        ("Files scanned:", totals.files_scanned.to_string()),
        ("Files with errors:", totals.files_with_errors.to_string()),
        ("Total errors:", totals.total_errors.to_string()),
        ("Lines processed:", totals.lines_processed.to_string()),
        ("Total values:", totals.total_values.to_string()),
        ("Missing values:", totals.missing_values.to_string()),
        (
            "Missing percentage:",
            format!("{:.2}%", totals.missing_percentage()),
        ),
        ("Total rainfall:", format!("{:.2}", summary.total_rainfall)),
        (
            "Average annual rainfall:",
            format!("{:.2}", summary.average_rainfall),
        ),
        ("Driest year:", format_year(summary.driest_year)),
        ("Wettest year:", format_year(summary.wettest_year)),
        (
            "Corrections proposed:",
            totals.corrections_proposed.to_string(),
        ),
        ("Time elapsed:", format!("{}ms", outcome.processing_time_ms)),
    ]
}

fn format_year(value: Option<YearValue>) -> String {
    match value {
        Some((year, total)) => format!("{} ({:.2})", year, total),
        None => "n/a".to_string(),
    }
}

/// Colored summary panel written to a terminal or any writer
#[derive(Debug)]
pub struct ConsoleReporter<W: Write> {
    out: W,
}

impl ConsoleReporter<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_header(&mut self, outcome: &BatchOutcome) -> io::Result<()> {
        writeln!(self.out, "\n{}", "Validation Summary".bright_green().bold())?;
        writeln!(
            self.out,
            "  {} {}",
            "Directory:".bright_cyan(),
            outcome.directory.display()
        )?;
        writeln!(
            self.out,
            "  {} {}",
            "Log file:".bright_cyan(),
            outcome.log_path.display()
        )
    }

    fn write_format_warnings(&mut self, outcome: &BatchOutcome) -> io::Result<()> {
        let check = &outcome.format_check;
        if !check.is_uniform() {
            writeln!(
                self.out,
                "\n{}",
                "Warning: files do not share one format".bright_yellow().bold()
            )?;
            for (delimiter, columns) in check.distinct_formats() {
                writeln!(
                    self.out,
                    "  {} delimiter, {} columns",
                    delimiter,
                    columns.to_string().bright_white()
                )?;
            }
        }
        if !check.unreadable.is_empty() {
            writeln!(
                self.out,
                "  {} {} files skipped in format check",
                "Unreadable:".bright_yellow(),
                check.unreadable.len()
            )?;
        }
        Ok(())
    }

    fn write_annual_statistics(&mut self, outcome: &BatchOutcome) -> io::Result<()> {
        if outcome.yearly.is_empty() {
            return Ok(());
        }
        writeln!(
            self.out,
            "\n{}",
            "Annual Precipitation Statistics".bright_green().bold()
        )?;
        for (year, stats) in outcome.yearly.annual_statistics() {
            writeln!(
                self.out,
                "  {}: Avg={:.2} Max={:.2} Min={:.2} Std Dev={:.2} Variability Index={:.2}%",
                year.to_string().bright_cyan(),
                stats.mean,
                stats.max,
                stats.min,
                stats.std_dev,
                stats.variability_index
            )?;
        }

        if !outcome.summary.annual_change_rate.is_empty() {
            writeln!(self.out, "\n{}", "Annual Change Rate".bright_green().bold())?;
            for (year, rate) in &outcome.summary.annual_change_rate {
                writeln!(
                    self.out,
                    "  {}: {:+.2}%",
                    year.to_string().bright_cyan(),
                    rate
                )?;
            }
        }
        Ok(())
    }
}

impl<W: Write> ReportSink for ConsoleReporter<W> {
    fn emit_report(&mut self, outcome: &BatchOutcome) -> io::Result<()> {
        self.write_header(outcome)?;

        let has_errors = outcome.totals.total_errors > 0;
        for (label, value) in summary_lines(outcome) {
            let label = match label {
                "Files with errors:" | "Total errors:" if has_errors => label.bright_red(),
                _ => label.bright_cyan(),
            };
            writeln!(self.out, "  {} {}", label, value.bright_white())?;
        }

        self.write_format_warnings(outcome)?;
        self.write_annual_statistics(outcome)?;
        self.out.flush()
    }
}
