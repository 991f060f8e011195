// Statistical routines for comparing the two refactoring tools
//
// Tests built on statrs distributions, computed in f64:
// - Welch's t-test (unequal variances, Welch-Satterthwaite df)
// - Shapiro-Wilk normality test (Royston 1995, AS R94)
// - Mann-Whitney U (exact for small untied samples, normal approximation otherwise)
// - Spearman rank correlation
// - Kruskal-Wallis H
//
// Degenerate inputs (constant data, empty groups) produce NaN results rather
// than errors; only samples too small for a test are rejected.

mod association;
mod normality;
mod rank;
mod two_sample;

pub use association::{kruskal_wallis, spearman, Correlation, GroupTest};
pub use normality::{shapiro_wilk, NormalityTest};
pub use rank::{rank_average, tie_correction_sum, tie_group_sizes};
pub use two_sample::{mann_whitney_u, welch_ttest, TwoSampleTest, EXACT_MWU_MAX_N};

use statrs::distribution::Normal;

use crate::error::AnalysisError;

/// Standard normal distribution N(0, 1)
pub fn standard_normal() -> crate::error::Result<Normal> {
    Normal::new(0.0, 1.0).map_err(stats_error)
}

fn stats_error(e: impl std::fmt::Display) -> AnalysisError {
    AnalysisError::Statistics(e.to_string())
}

#[cfg(test)]
mod tests;
