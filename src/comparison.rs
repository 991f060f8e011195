//! Tool comparison: normality-gated hypothesis tests per metric
//!
//! For each outcome metric the SmartRefactor and Tradicional samples are
//! checked with Shapiro-Wilk. When both look normal the means are compared
//! with Welch's t-test and Cohen's d; otherwise Mann-Whitney U with the
//! effect size r = |z| / sqrt(N).

use serde::Serialize;
use statrs::distribution::ContinuousCDF;

use crate::config::AnalysisConfig;
use crate::csv_output::{Cell, CsvReport};
use crate::dataset::{Metric, ParticipantRecord, SMART_REFACTOR, TRADITIONAL};
use crate::error::Result;
use crate::hypothesis::{mann_whitney_u, shapiro_wilk, standard_normal, welch_ttest};
use crate::stats::{metric_values, round_to};

/// Test chosen by the normality gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TestKind {
    WelchT,
    MannWhitney,
}

impl TestKind {
    /// Name written to the results table
    pub fn label(self) -> &'static str {
        match self {
            TestKind::WelchT => "t (Welch)",
            TestKind::MannWhitney => "Mann–Whitney",
        }
    }
}

/// One row of `hypothesis_results.csv`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonResult {
    pub metric: String,
    pub test: TestKind,
    /// Rounded to 3 decimals
    pub statistic: f64,
    /// Rounded to 5 decimals
    pub pvalue: f64,
    pub normal: bool,
    /// Rounded to 3 decimals
    pub effect_size: f64,
}

/// Cohen's d with the average of the two sample variances
pub fn cohens_d(a: &[f64], b: &[f64]) -> f64 {
    let mean = |s: &[f64]| s.iter().sum::<f64>() / s.len() as f64;
    let var = |s: &[f64]| {
        let m = mean(s);
        s.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (s.len() as f64 - 1.0)
    };
    (mean(a) - mean(b)).abs() / ((var(a) + var(b)) / 2.0).sqrt()
}

/// Effect size r = |z| / sqrt(N), with z recovered from the two-sided p-value
pub fn rank_biserial_r(pvalue: f64, n_total: usize) -> Result<f64> {
    let z = standard_normal()?.inverse_cdf(1.0 - pvalue / 2.0);
    Ok(z.abs() / (n_total as f64).sqrt())
}

/// Compare one metric between the two tools
pub fn compare_metric(
    metric: Metric,
    smart: &[f64],
    traditional: &[f64],
    alpha: f64,
) -> Result<ComparisonResult> {
    let p_smart = shapiro_wilk(smart)?.pvalue;
    let p_traditional = shapiro_wilk(traditional)?.pvalue;
    let normal = p_smart > alpha && p_traditional > alpha;

    tracing::debug!(
        "{}: Shapiro-Wilk p = {:.5} (SmartRefactor), {:.5} (Tradicional)",
        metric.key(),
        p_smart,
        p_traditional
    );

    let (test, outcome, effect_size) = if normal {
        let outcome = welch_ttest(smart, traditional)?;
        (TestKind::WelchT, outcome, cohens_d(smart, traditional))
    } else {
        let outcome = mann_whitney_u(smart, traditional)?;
        let r = rank_biserial_r(outcome.pvalue, smart.len() + traditional.len())?;
        (TestKind::MannWhitney, outcome, r)
    };

    Ok(ComparisonResult {
        metric: metric.label().to_string(),
        test,
        statistic: round_to(outcome.statistic, 3),
        pvalue: round_to(outcome.pvalue, 5),
        normal,
        effect_size: round_to(effect_size, 3),
    })
}

/// Hypothesis tests for every metric, SmartRefactor vs Tradicional
///
/// Missing metric values are dropped per metric before testing.
pub fn hypothesis_tests(
    records: &[ParticipantRecord],
    config: &AnalysisConfig,
) -> Result<Vec<ComparisonResult>> {
    let smart: Vec<&ParticipantRecord> = records
        .iter()
        .filter(|r| r.metrics.tool == SMART_REFACTOR)
        .collect();
    let traditional: Vec<&ParticipantRecord> = records
        .iter()
        .filter(|r| r.metrics.tool == TRADITIONAL)
        .collect();

    Metric::ALL
        .iter()
        .map(|&metric| {
            let a = metric_values(smart.iter().copied(), metric);
            let b = metric_values(traditional.iter().copied(), metric);
            compare_metric(metric, &a, &b, config.normality_alpha)
        })
        .collect()
}

/// Table layout of `hypothesis_results.csv`
pub fn hypothesis_table(results: &[ComparisonResult]) -> CsvReport {
    let mut report = CsvReport::new(&[
        "Métrica",
        "Teste",
        "Estatística",
        "p_valor",
        "Normal?",
        "Efeito",
    ]);
    for r in results {
        report.add_row(vec![
            Cell::text(&r.metric),
            Cell::text(r.test.label()),
            Cell::float(r.statistic),
            Cell::float(r.pvalue),
            Cell::Bool(r.normal),
            Cell::float(r.effect_size),
        ]);
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::MetricRecord;

    fn record(tool: &str, time: f64, errors: f64, design: f64) -> ParticipantRecord {
        ParticipantRecord {
            metrics: MetricRecord {
                id: format!("{tool}-{time}"),
                time_hours: Some(time),
                lines_modified: Some(10.0),
                functional_errors: Some(errors),
                design_issues: Some(design),
                tool: tool.to_string(),
            },
            profile: None,
        }
    }

    #[test]
    fn test_cohens_d() {
        // means 2 and 4, variances 1 and 1 -> d = 2
        let d = cohens_d(&[1.0, 2.0, 3.0], &[3.0, 4.0, 5.0]);
        assert!((d - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_effect_r_from_pvalue() {
        // p = 0.05 -> z = 1.959964
        let r = rank_biserial_r(0.05, 16).unwrap();
        assert!((r - 1.959964 / 4.0).abs() < 1e-5);
        assert!(rank_biserial_r(1.0, 16).unwrap() < 1e-9);
    }

    #[test]
    fn test_normal_samples_use_welch() {
        let smart = [1.2, 1.5, 1.1, 1.4, 1.3, 1.6, 1.2, 1.4];
        let traditional = [2.4, 2.9, 2.2, 3.1, 2.6, 2.8, 2.5, 3.0];
        let result = compare_metric(Metric::TimeHours, &smart, &traditional, 0.05).unwrap();
        assert_eq!(result.test, TestKind::WelchT);
        assert!(result.normal);
        assert_eq!(result.metric, "Tempo (h)");
        assert!(result.statistic < 0.0);
        assert!(result.effect_size > 2.0);
    }

    #[test]
    fn test_skewed_samples_use_mann_whitney() {
        let smart = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0];
        let traditional = [1.0, 2.0, 0.0, 3.0, 1.0, 2.0, 4.0, 1.0];
        let result =
            compare_metric(Metric::FunctionalErrors, &smart, &traditional, 0.05).unwrap();
        assert_eq!(result.test, TestKind::MannWhitney);
        assert!(!result.normal);
        assert_eq!(result.statistic, 8.0);
        assert!((result.pvalue - 0.00877).abs() < 1e-4);
        // z = 2.6208, r = z / 4
        assert!((result.effect_size - 0.655).abs() < 2e-3);
    }

    #[test]
    fn test_alpha_changes_gate() {
        let smart = [1.2, 1.5, 1.1, 1.4, 1.3, 1.6, 1.2, 1.4];
        let traditional = [2.4, 2.9, 2.2, 3.1, 2.6, 2.8, 2.5, 3.0];
        // both Shapiro p-values are ~0.86; an alpha above that forces the rank test
        let result = compare_metric(Metric::TimeHours, &smart, &traditional, 0.9).unwrap();
        assert_eq!(result.test, TestKind::MannWhitney);
    }

    #[test]
    fn test_hypothesis_tests_cover_all_metrics() {
        let mut records = Vec::new();
        for (i, t) in [1.0, 1.4, 1.2, 1.6].iter().enumerate() {
            records.push(record(SMART_REFACTOR, *t, i as f64, 1.0 + i as f64));
        }
        for (i, t) in [2.0, 2.6, 2.2, 2.9].iter().enumerate() {
            records.push(record(TRADITIONAL, *t, 2.0 * i as f64, 3.0 - i as f64));
        }
        records.push(record("Outro", 9.0, 9.0, 9.0));

        let results = hypothesis_tests(&records, &AnalysisConfig::default()).unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[1].metric, "Erros Funcionais");
        assert_eq!(results[2].metric, "Problemas de Design");
    }

    #[test]
    fn test_group_too_small_aborts() {
        let records = vec![
            record(SMART_REFACTOR, 1.0, 0.0, 0.0),
            record(TRADITIONAL, 2.0, 0.0, 0.0),
        ];
        assert!(hypothesis_tests(&records, &AnalysisConfig::default()).is_err());
    }

    #[test]
    fn test_hypothesis_table_header() {
        let csv = hypothesis_table(&[]).to_csv();
        assert_eq!(csv, "Métrica,Teste,Estatística,p_valor,Normal?,Efeito\n");
    }
}
