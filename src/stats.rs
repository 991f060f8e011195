//! Descriptive statistics per refactoring tool
//!
//! Everything is accumulated in f64: the tables carry three decimals, and
//! rounding follows the half-to-even rule of the spreadsheets' tooling.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::csv_output::{Cell, CsvReport};
use crate::dataset::{Metric, ParticipantRecord};

/// Mean and sample standard deviation of one metric
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MeanStd {
    /// NaN when there are no values
    pub mean: f64,
    /// NaN with fewer than two values
    pub std_dev: f64,
}

/// Summary row for one tool
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolSummary {
    pub tool: String,
    /// Number of records with a time measurement
    pub n: usize,
    pub time_hours: MeanStd,
    pub functional_errors: MeanStd,
    pub design_issues: MeanStd,
}

/// Round to `decimals` places, ties to even (`0.0625` -> `0.062`)
pub fn round_to(value: f64, decimals: i32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

/// Mean and sample standard deviation (ddof = 1)
pub fn mean_std(values: &[f64]) -> MeanStd {
    if values.is_empty() {
        return MeanStd {
            mean: f64::NAN,
            std_dev: f64::NAN,
        };
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let std_dev = if values.len() < 2 {
        f64::NAN
    } else {
        // two-pass: no cancellation for large offsets
        let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
        (ss / (n - 1.0)).sqrt()
    };

    MeanStd { mean, std_dev }
}

/// Quantile of sorted data by linear interpolation between order statistics
///
/// `q` in [0, 1]; NaN for empty input.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let h = (sorted.len() - 1) as f64 * q.clamp(0.0, 1.0);
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(sorted.len() - 1);
    sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
}

fn rounded(stats: MeanStd) -> MeanStd {
    MeanStd {
        mean: round_to(stats.mean, 3),
        std_dev: round_to(stats.std_dev, 3),
    }
}

/// Non-missing values of `metric` in `records`
pub fn metric_values<'a, I>(records: I, metric: Metric) -> Vec<f64>
where
    I: IntoIterator<Item = &'a ParticipantRecord>,
{
    records
        .into_iter()
        .filter_map(|r| metric.value(&r.metrics))
        .collect()
}

/// Group records by tool name (sorted)
pub fn group_by_tool(records: &[ParticipantRecord]) -> BTreeMap<&str, Vec<&ParticipantRecord>> {
    let mut groups: BTreeMap<&str, Vec<&ParticipantRecord>> = BTreeMap::new();
    for record in records {
        groups
            .entry(record.metrics.tool.as_str())
            .or_default()
            .push(record);
    }
    groups
}

/// Descriptive statistics grouped by tool, rounded to 3 decimals
pub fn descriptive_stats(records: &[ParticipantRecord]) -> Vec<ToolSummary> {
    group_by_tool(records)
        .into_iter()
        .map(|(tool, group)| {
            let time = metric_values(group.iter().copied(), Metric::TimeHours);
            let errors = metric_values(group.iter().copied(), Metric::FunctionalErrors);
            let design = metric_values(group.iter().copied(), Metric::DesignIssues);

            ToolSummary {
                tool: tool.to_string(),
                n: time.len(),
                time_hours: rounded(mean_std(&time)),
                functional_errors: rounded(mean_std(&errors)),
                design_issues: rounded(mean_std(&design)),
            }
        })
        .collect()
}

/// Table layout of `descriptive_stats.csv`
pub fn descriptive_table(summaries: &[ToolSummary]) -> CsvReport {
    let mut report = CsvReport::new(&[
        "ferramenta",
        "n",
        "tempo_medio",
        "tempo_dp",
        "erros_medio",
        "erros_dp",
        "design_medio",
        "design_dp",
    ]);
    for s in summaries {
        report.add_row(vec![
            Cell::text(&s.tool),
            Cell::Int(s.n as u64),
            Cell::float(s.time_hours.mean),
            Cell::float(s.time_hours.std_dev),
            Cell::float(s.functional_errors.mean),
            Cell::float(s.functional_errors.std_dev),
            Cell::float(s.design_issues.mean),
            Cell::float(s.design_issues.std_dev),
        ]);
    }
    report
}
