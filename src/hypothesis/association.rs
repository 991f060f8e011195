// Association tests between an ordinal variable and an outcome
//
// - Spearman's rank correlation with a Student-t p-value
// - Kruskal-Wallis H test across independent groups

use statrs::distribution::{ChiSquared, ContinuousCDF, StudentsT};

use super::rank::{rank_average, tie_correction_sum};
use super::stats_error;
use crate::error::Result;

/// Spearman rank correlation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Correlation {
    /// rho in [-1, 1], NaN when undefined
    pub coefficient: f64,
    pub pvalue: f64,
    /// Number of complete pairs used
    pub n: usize,
}

/// Kruskal-Wallis H test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupTest {
    pub statistic: f64,
    pub pvalue: f64,
}

fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len() as f64;
    let mx = x.iter().sum::<f64>() / n;
    let my = y.iter().sum::<f64>() / n;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (a, b) in x.iter().zip(y) {
        sxy += (a - mx) * (b - my);
        sxx += (a - mx) * (a - mx);
        syy += (b - my) * (b - my);
    }
    if sxx == 0.0 || syy == 0.0 {
        return f64::NAN;
    }
    (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0)
}

/// Spearman's rho over complete pairs
///
/// Pairs where either side is missing (`None` or NaN) are omitted. Fewer than
/// three complete pairs or a constant variable give NaN.
pub fn spearman(x: &[Option<f64>], y: &[Option<f64>]) -> Result<Correlation> {
    let (xs, ys): (Vec<f64>, Vec<f64>) = x
        .iter()
        .zip(y)
        .filter_map(|(a, b)| match (a, b) {
            (Some(a), Some(b)) if !a.is_nan() && !b.is_nan() => Some((*a, *b)),
            _ => None,
        })
        .unzip();

    let n = xs.len();
    if n < 3 {
        return Ok(Correlation {
            coefficient: f64::NAN,
            pvalue: f64::NAN,
            n,
        });
    }

    // clamp keeps rounding noise out of the t transform; NaN passes through
    let rho = pearson(&rank_average(&xs), &rank_average(&ys)).clamp(-1.0, 1.0);
    if rho.is_nan() {
        tracing::debug!("Spearman correlation undefined for constant input");
        return Ok(Correlation {
            coefficient: f64::NAN,
            pvalue: f64::NAN,
            n,
        });
    }

    let df = (n - 2) as f64;
    let pvalue = if rho.abs() >= 1.0 {
        0.0
    } else {
        let t = rho * (df / ((1.0 + rho) * (1.0 - rho))).sqrt();
        let dist = StudentsT::new(0.0, 1.0, df).map_err(stats_error)?;
        (2.0 * dist.sf(t.abs())).min(1.0)
    };

    Ok(Correlation {
        coefficient: rho,
        pvalue,
        n,
    })
}

/// Kruskal-Wallis H test with tie correction
///
/// Needs at least two groups. An empty group or a pool of identical values
/// makes H undefined and yields NaN.
pub fn kruskal_wallis(groups: &[Vec<f64>]) -> Result<GroupTest> {
    let undefined = GroupTest {
        statistic: f64::NAN,
        pvalue: f64::NAN,
    };
    if groups.len() < 2 || groups.iter().any(Vec::is_empty) {
        return Ok(undefined);
    }

    let pooled: Vec<f64> = groups.iter().flatten().copied().collect();
    let ranks = rank_average(&pooled);
    let total = pooled.len() as f64;

    let mut offset = 0;
    let mut weighted = 0.0;
    for group in groups {
        let rank_sum: f64 = ranks[offset..offset + group.len()].iter().sum();
        weighted += rank_sum * rank_sum / group.len() as f64;
        offset += group.len();
    }

    let h = 12.0 / (total * (total + 1.0)) * weighted - 3.0 * (total + 1.0);
    let correction = 1.0 - tie_correction_sum(&pooled) / (total.powi(3) - total);
    if correction <= 0.0 {
        tracing::debug!("Kruskal-Wallis undefined: all values identical");
        return Ok(undefined);
    }
    let h = h / correction;

    let dist = ChiSquared::new((groups.len() - 1) as f64).map_err(stats_error)?;
    Ok(GroupTest {
        statistic: h,
        pvalue: dist.sf(h),
    })
}
