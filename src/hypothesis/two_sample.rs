// Two-sample location tests: Welch's t-test and Mann-Whitney U
//
// Welch's test works in f64 with the Welch-Satterthwaite degrees of freedom
// and a Student t tail from statrs.
// Mann-Whitney follows the usual "auto" rule: the exact null distribution
// when the smaller sample has at most 8 values and there are no ties,
// otherwise the normal approximation with tie and continuity corrections.

use statrs::distribution::{ContinuousCDF, StudentsT};

use super::rank::{rank_average, tie_correction_sum};
use super::{standard_normal, stats_error};
use crate::error::{AnalysisError, Result};

/// Largest smaller-sample size for which the exact U distribution is used
pub const EXACT_MWU_MAX_N: usize = 8;

/// Outcome of a two-sample test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TwoSampleTest {
    pub statistic: f64,
    /// Two-sided p-value
    pub pvalue: f64,
}

impl TwoSampleTest {
    fn undefined() -> Self {
        Self {
            statistic: f64::NAN,
            pvalue: f64::NAN,
        }
    }
}

fn require(what: &str, required: usize, sample: &[f64]) -> Result<()> {
    if sample.len() < required {
        return Err(AnalysisError::InsufficientData {
            what: what.to_string(),
            required,
            actual: sample.len(),
        });
    }
    Ok(())
}

fn mean(sample: &[f64]) -> f64 {
    sample.iter().sum::<f64>() / sample.len() as f64
}

fn sample_variance(sample: &[f64]) -> f64 {
    let n = sample.len() as f64;
    let m = mean(sample);
    sample.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (n - 1.0)
}

/// Welch's unequal-variance t-test (two-sided)
///
/// The statistic is t of `a` minus `b`; the p-value uses the
/// Welch-Satterthwaite degrees of freedom. Both samples constant makes the
/// statistic undefined; the result is NaN rather than an error.
pub fn welch_ttest(a: &[f64], b: &[f64]) -> Result<TwoSampleTest> {
    require("Welch t-test", 2, a)?;
    require("Welch t-test", 2, b)?;

    let (n1, n2) = (a.len() as f64, b.len() as f64);
    let se1 = sample_variance(a) / n1;
    let se2 = sample_variance(b) / n2;
    if se1 + se2 == 0.0 {
        tracing::debug!("Welch t-test on two constant samples is undefined");
        return Ok(TwoSampleTest::undefined());
    }

    let t = (mean(a) - mean(b)) / (se1 + se2).sqrt();
    let df = (se1 + se2).powi(2) / (se1.powi(2) / (n1 - 1.0) + se2.powi(2) / (n2 - 1.0));
    let dist = StudentsT::new(0.0, 1.0, df).map_err(stats_error)?;

    Ok(TwoSampleTest {
        statistic: t,
        pvalue: (2.0 * dist.sf(t.abs())).min(1.0),
    })
}

/// Mann-Whitney U test (two-sided); the statistic is U of the first sample
pub fn mann_whitney_u(a: &[f64], b: &[f64]) -> Result<TwoSampleTest> {
    require("Mann-Whitney U test", 1, a)?;
    require("Mann-Whitney U test", 1, b)?;

    let n1 = a.len();
    let n2 = b.len();
    let pooled: Vec<f64> = a.iter().chain(b).copied().collect();
    let ranks = rank_average(&pooled);

    let rank_sum_a: f64 = ranks[..n1].iter().sum();
    let u1 = rank_sum_a - (n1 * (n1 + 1)) as f64 / 2.0;
    let u2 = (n1 * n2) as f64 - u1;
    let u = u1.max(u2);

    let ties = tie_correction_sum(&pooled);
    let pvalue = if n1.min(n2) <= EXACT_MWU_MAX_N && ties == 0.0 {
        exact_pvalue(u, n1, n2)
    } else {
        asymptotic_pvalue(u, n1, n2, ties)?
    };

    Ok(TwoSampleTest {
        statistic: u1,
        pvalue,
    })
}

/// Counts of arrangements giving each U value, indices 0..=n1*n2
///
/// The counts are the coefficients of the Gaussian binomial [n1+n2 choose n1].
fn u_distribution(n1: usize, n2: usize) -> Vec<f64> {
    let k = n1.min(n2);
    let m = n1.max(n2);
    let max_u = n1 * n2;

    let mut counts = vec![0.0; max_u + 1];
    counts[0] = 1.0;
    for i in 1..=k {
        // multiply by (1 - q^(m+i))
        let shift = m + i;
        for u in (shift..=max_u).rev() {
            counts[u] -= counts[u - shift];
        }
        // divide by (1 - q^i)
        for u in i..=max_u {
            counts[u] += counts[u - i];
        }
    }
    counts
}

fn exact_pvalue(u: f64, n1: usize, n2: usize) -> f64 {
    let counts = u_distribution(n1, n2);
    let total: f64 = counts.iter().sum();
    let threshold = u.round() as usize;
    let tail: f64 = counts.iter().skip(threshold).sum();
    (2.0 * tail / total).min(1.0)
}

fn asymptotic_pvalue(u: f64, n1: usize, n2: usize, ties: f64) -> Result<f64> {
    let (n1, n2) = (n1 as f64, n2 as f64);
    let n = n1 + n2;
    let mean = n1 * n2 / 2.0;
    let sd = (n1 * n2 / 12.0 * ((n + 1.0) - ties / (n * (n - 1.0)))).sqrt();
    if sd == 0.0 {
        return Ok(f64::NAN);
    }
    let z = (u - mean - 0.5) / sd;
    Ok((2.0 * standard_normal()?.sf(z)).min(1.0))
}
