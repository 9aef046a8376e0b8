//! Batch counters and derived yearly statistics.
//!
//! [`BatchTotals`] sums per-file report counters; [`DirectorySummary`] is a
//! read-only view over a merged [`YearlyAccumulator`] with averages,
//! extreme years, and year-over-year change.

use crate::models::{ValidationReport, YearlyAccumulator};

/// Sum of every file report's counters across a batch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchTotals {
    pub files_scanned: usize,
    pub files_with_errors: usize,
    pub total_errors: usize,
    pub lines_processed: usize,
    pub total_values: usize,
    pub missing_values: usize,
    pub total_rainfall: f64,
    pub corrections_proposed: usize,
}

impl BatchTotals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one file report into the totals
    pub fn add_report(&mut self, report: &ValidationReport) {
        self.files_scanned += 1;
        if !report.is_valid() {
            self.files_with_errors += 1;
        }
        self.total_errors += report.error_count();
        self.lines_processed += report.lines_processed;
        self.total_values += report.total_values;
        self.missing_values += report.missing_values;
        self.total_rainfall += report.total_rainfall;
        self.corrections_proposed += report.corrections.len();
    }

    /// Share of value slots holding the missing sentinel, as a percentage
    pub fn missing_percentage(&self) -> f64 {
        if self.total_values == 0 {
            0.0
        } else {
            self.missing_values as f64 / self.total_values as f64 * 100.0
        }
    }

    pub fn is_clean(&self) -> bool {
        self.total_errors == 0
    }
}

/// Year with its total rainfall
pub type YearValue = (i32, f64);

/// Directory-wide statistics derived from merged yearly totals
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirectorySummary {
    pub total_years: usize,
    pub total_rainfall: f64,
    /// Mean of the yearly totals
    pub average_rainfall: f64,
    pub driest_year: Option<YearValue>,
    pub wettest_year: Option<YearValue>,
    /// Percentage change from the prior year, for years whose prior total is nonzero
    pub annual_change_rate: Vec<YearValue>,
}

impl DirectorySummary {
    /// Derive the summary from a finished accumulator
    ///
    /// Years missing between the first and last observed year count as zero
    /// when computing the change series, so a gap suppresses the entry after it.
    pub fn from_accumulator(accumulator: &YearlyAccumulator) -> Self {
        let (Some(first), Some(last)) = (accumulator.first_year(), accumulator.last_year()) else {
            return Self::default();
        };

        let total_years = accumulator.len();
        let total_rainfall: f64 = accumulator.iter().map(|(_, t)| t.total_rainfall).sum();
        let average_rainfall = total_rainfall / total_years as f64;

        // Ascending year order: driest keeps the first minimum, wettest the last maximum
        let mut driest: Option<YearValue> = None;
        let mut wettest: Option<YearValue> = None;
        for (year, totals) in accumulator.iter() {
            let value = totals.total_rainfall;
            if driest.is_none_or(|(_, min)| value < min) {
                driest = Some((year, value));
            }
            if wettest.is_none_or(|(_, max)| value >= max) {
                wettest = Some((year, value));
            }
        }

        let total_for = |year: i32| {
            accumulator
                .get(year)
                .map(|t| t.total_rainfall)
                .unwrap_or(0.0)
        };
        let annual_change_rate = (first + 1..=last)
            .filter_map(|year| {
                let previous = total_for(year - 1);
                if previous == 0.0 {
                    return None;
                }
                Some((year, (total_for(year) - previous) / previous * 100.0))
            })
            .collect();

        Self {
            total_years,
            total_rainfall,
            average_rainfall,
            driest_year: driest,
            wettest_year: wettest,
            annual_change_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IssueKind;
    use crate::models::{DataRecord, ValidationIssue};

    fn accumulator(entries: &[(i32, f64)]) -> YearlyAccumulator {
        let mut acc = YearlyAccumulator::new();
        for (year, rainfall) in entries {
            acc.record(&DataRecord {
                station_id: "12345".to_string(),
                year: *year,
                month: 1,
                values: vec![Some(*rainfall)],
            });
        }
        acc
    }

    #[test]
    fn test_missing_percentage() {
        let totals = BatchTotals {
            total_values: 100,
            missing_values: 25,
            ..Default::default()
        };
        assert_eq!(totals.missing_percentage(), 25.0);
        assert_eq!(format!("{:.2}", totals.missing_percentage()), "25.00");

        assert_eq!(BatchTotals::new().missing_percentage(), 0.0);
    }

    #[test]
    fn test_add_report() {
        let mut clean = ValidationReport::new("a.dat");
        clean.lines_processed = 3;
        clean.total_values = 93;
        clean.missing_values = 3;
        clean.total_rainfall = 120.0;

        let mut broken = ValidationReport::new("b.dat");
        broken.issues.push(ValidationIssue::line(4, "x", IssueKind::Parse, "bad"));
        broken.issues.push(ValidationIssue::line(5, "y", IssueKind::Parse, "bad"));
        broken.lines_processed = 1;
        broken.total_values = 31;

        let mut totals = BatchTotals::new();
        totals.add_report(&clean);
        totals.add_report(&broken);

        assert_eq!(totals.files_scanned, 2);
        assert_eq!(totals.files_with_errors, 1);
        assert_eq!(totals.total_errors, 2);
        assert_eq!(totals.lines_processed, 4);
        assert_eq!(totals.total_values, 124);
        assert_eq!(totals.missing_values, 3);
        assert_eq!(totals.total_rainfall, 120.0);
        assert!(!totals.is_clean());
    }

    #[test]
    fn test_summary_of_empty_accumulator() {
        let summary = DirectorySummary::from_accumulator(&YearlyAccumulator::new());
        assert_eq!(summary.total_years, 0);
        assert_eq!(summary.total_rainfall, 0.0);
        assert_eq!(summary.average_rainfall, 0.0);
        assert_eq!(summary.driest_year, None);
        assert_eq!(summary.wettest_year, None);
        assert!(summary.annual_change_rate.is_empty());
    }

    #[test]
    fn test_summary_statistics() {
        let acc = accumulator(&[(2010, 100.0), (2010, 100.0), (2011, 100.0), (2012, 300.0)]);
        let summary = DirectorySummary::from_accumulator(&acc);

        assert_eq!(summary.total_years, 3);
        assert_eq!(summary.total_rainfall, 600.0);
        assert_eq!(summary.average_rainfall, 200.0);
        assert_eq!(summary.driest_year, Some((2011, 100.0)));
        assert_eq!(summary.wettest_year, Some((2012, 300.0)));
        assert_eq!(
            summary.annual_change_rate,
            vec![(2011, -50.0), (2012, 200.0)]
        );
    }

    #[test]
    fn test_change_rate_skips_gaps() {
        let acc = accumulator(&[(2010, 50.0), (2012, 80.0), (2013, 40.0)]);
        let summary = DirectorySummary::from_accumulator(&acc);

        // 2011 is synthesized as zero: 2011 is -100%, 2012 has no entry
        assert_eq!(
            summary.annual_change_rate,
            vec![(2011, -100.0), (2013, -50.0)]
        );
        assert_eq!(summary.total_years, 3);
    }

    #[test]
    fn test_extreme_year_ties() {
        let acc = accumulator(&[(2010, 10.0), (2011, 10.0), (2012, 10.0)]);
        let summary = DirectorySummary::from_accumulator(&acc);
        assert_eq!(summary.driest_year, Some((2010, 10.0)));
        assert_eq!(summary.wettest_year, Some((2012, 10.0)));
    }
}
