//! Property-based tests for the statistical routines
//!
//! Invariants that hold for any sample: rank sums, statistic ranges and the
//! symmetry of the two-sample tests.

use proptest::prelude::*;
use refactor_eval::hypothesis::{
    kruskal_wallis, mann_whitney_u, rank_average, shapiro_wilk, spearman,
};

/// Small-integer samples, so ties are common
fn tied_sample(len: std::ops::Range<usize>) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec((0i32..6).prop_map(f64::from), len)
}

fn continuous_sample(len: std::ops::Range<usize>) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-1000.0f64..1000.0, len)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_average_ranks_sum_to_triangular_number(values in tied_sample(1..40)) {
        let n = values.len() as f64;
        let ranks = rank_average(&values);
        let sum: f64 = ranks.iter().sum();
        prop_assert!((sum - n * (n + 1.0) / 2.0).abs() < 1e-9);
        prop_assert!(ranks.iter().all(|&r| (1.0..=n).contains(&r)));
    }

    #[test]
    fn prop_equal_values_share_rank(values in tied_sample(1..30)) {
        let ranks = rank_average(&values);
        for i in 0..values.len() {
            for j in 0..values.len() {
                if values[i] == values[j] {
                    prop_assert_eq!(ranks[i], ranks[j]);
                } else if values[i] < values[j] {
                    prop_assert!(ranks[i] < ranks[j]);
                }
            }
        }
    }

    #[test]
    fn prop_shapiro_w_in_unit_interval(sample in continuous_sample(3..60)) {
        let result = shapiro_wilk(&sample).unwrap();
        prop_assert!(result.statistic > 0.0 && result.statistic <= 1.0, "W = {}", result.statistic);
        prop_assert!((0.0..=1.0).contains(&result.pvalue), "p = {}", result.pvalue);
    }

    #[test]
    fn prop_mann_whitney_u_complement(a in tied_sample(1..15), b in tied_sample(1..15)) {
        let forward = mann_whitney_u(&a, &b).unwrap();
        let backward = mann_whitney_u(&b, &a).unwrap();
        let n1n2 = (a.len() * b.len()) as f64;

        prop_assert!((forward.statistic + backward.statistic - n1n2).abs() < 1e-9);
        prop_assert!((0.0..=n1n2).contains(&forward.statistic));
        if forward.pvalue.is_nan() {
            // every pooled value identical
            prop_assert!(backward.pvalue.is_nan());
        } else {
            prop_assert!((forward.pvalue - backward.pvalue).abs() < 1e-12);
            prop_assert!(forward.pvalue > 0.0 && forward.pvalue <= 1.0);
        }
    }

    #[test]
    fn prop_spearman_in_range(
        pairs in prop::collection::vec(
            (prop::option::of((0i32..4).prop_map(f64::from)), prop::option::of(0.0f64..10.0)),
            0..30,
        )
    ) {
        let (x, y): (Vec<Option<f64>>, Vec<Option<f64>>) = pairs.into_iter().unzip();
        let result = spearman(&x, &y).unwrap();
        let complete = x.iter().zip(&y).filter(|(a, b)| a.is_some() && b.is_some()).count();

        prop_assert_eq!(result.n, complete);
        if !result.coefficient.is_nan() {
            prop_assert!((-1.0..=1.0).contains(&result.coefficient));
            prop_assert!((0.0..=1.0).contains(&result.pvalue));
        }
    }

    #[test]
    fn prop_spearman_symmetric(x in continuous_sample(3..20)) {
        let y: Vec<f64> = x.iter().map(|v| (v * 0.37).sin()).collect();
        let wrap = |v: &[f64]| v.iter().copied().map(Some).collect::<Vec<_>>();
        let xy = spearman(&wrap(&x), &wrap(&y)).unwrap();
        let yx = spearman(&wrap(&y), &wrap(&x)).unwrap();
        if xy.coefficient.is_nan() {
            prop_assert!(yx.coefficient.is_nan());
        } else {
            prop_assert!((xy.coefficient - yx.coefficient).abs() < 1e-12);
        }
    }

    #[test]
    fn prop_kruskal_nonnegative(groups in prop::collection::vec(tied_sample(1..8), 2..5)) {
        let result = kruskal_wallis(&groups).unwrap();
        if !result.statistic.is_nan() {
            prop_assert!(result.statistic >= -1e-9, "H = {}", result.statistic);
            prop_assert!((0.0..=1.0).contains(&result.pvalue));
        }
    }
}
