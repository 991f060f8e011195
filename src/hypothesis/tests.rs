// Scenario tests across the statistical routines
//
// Realistic task-time samples (hours) for the two tools, checking that the
// tests agree with each other on clear and unclear differences.

use super::*;

const SMART_TIMES: [f64; 8] = [1.2, 1.5, 1.1, 1.4, 1.3, 1.6, 1.2, 1.4];
const TRADITIONAL_TIMES: [f64; 8] = [2.4, 2.9, 2.2, 3.1, 2.6, 2.8, 2.5, 3.0];

#[test]
fn test_clear_speedup_detected_by_both_tests() {
    let welch = welch_ttest(&SMART_TIMES, &TRADITIONAL_TIMES).unwrap();
    let mwu = mann_whitney_u(&SMART_TIMES, &TRADITIONAL_TIMES).unwrap();

    assert!(welch.pvalue < 0.001, "welch p = {}", welch.pvalue);
    // complete separation: U1 = 0, but ties present in the pool -> asymptotic
    assert_eq!(mwu.statistic, 0.0);
    assert!(mwu.pvalue < 0.01, "mwu p = {}", mwu.pvalue);
}

#[test]
fn test_time_samples_look_normal() {
    let smart = shapiro_wilk(&SMART_TIMES).unwrap();
    let traditional = shapiro_wilk(&TRADITIONAL_TIMES).unwrap();
    assert!(smart.is_normal(0.05), "p = {}", smart.pvalue);
    assert!(traditional.is_normal(0.05), "p = {}", traditional.pvalue);
}

#[test]
fn test_error_counts_with_many_ties() {
    // functional error counts: mostly zero for one tool
    let smart = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0];
    let traditional = [1.0, 2.0, 0.0, 3.0, 1.0, 2.0, 4.0, 1.0];

    let normality = shapiro_wilk(&smart).unwrap();
    assert!(!normality.is_normal(0.05));

    let mwu = mann_whitney_u(&smart, &traditional).unwrap();
    assert!(mwu.statistic < 32.0);
    assert!(mwu.pvalue < 0.05, "p = {}", mwu.pvalue);
}

#[test]
fn test_swapping_samples_mirrors_u() {
    let forward = mann_whitney_u(&SMART_TIMES, &TRADITIONAL_TIMES).unwrap();
    let backward = mann_whitney_u(&TRADITIONAL_TIMES, &SMART_TIMES).unwrap();
    assert_eq!(forward.statistic + backward.statistic, 64.0);
    assert!((forward.pvalue - backward.pvalue).abs() < 1e-12);
}

#[test]
fn test_experience_levels_kruskal() {
    let groups = vec![
        vec![3.0, 4.0, 2.0],
        vec![2.0, 1.0, 2.0],
        vec![1.0, 0.0],
        vec![0.0, 0.0, 1.0],
    ];
    let result = kruskal_wallis(&groups).unwrap();
    assert!(result.statistic > 0.0);
    assert!(result.pvalue > 0.0 && result.pvalue < 1.0);
}

#[test]
fn test_spearman_sign_follows_direction() {
    let experience: Vec<Option<f64>> = [0.0, 0.0, 1.0, 1.0, 2.0, 2.0, 3.0, 3.0]
        .iter()
        .copied()
        .map(Some)
        .collect();
    let errors: Vec<Option<f64>> = [4.0, 3.0, 3.0, 2.0, 2.0, 1.0, 0.0, 1.0]
        .iter()
        .copied()
        .map(Some)
        .collect();
    let result = spearman(&experience, &errors).unwrap();
    assert!(result.coefficient < -0.8);
    assert!(result.pvalue < 0.05);
}
