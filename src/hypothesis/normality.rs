// Shapiro-Wilk normality test
//
// Royston, P. (1995). Remark AS R94: A remark on algorithm AS 181, the
// W-test for normality. Applied Statistics 44(4), 547-551.
//
// Coefficients come from Royston's polynomial approximations; the p-value
// uses the log-normal (n > 11) or the gamma-transformed (4 <= n <= 11)
// approximation, and the exact distribution for n = 3.

use statrs::distribution::{ContinuousCDF, Normal};

use super::standard_normal;
use crate::error::{AnalysisError, Result};

/// Outcome of a normality test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalityTest {
    /// W statistic in (0, 1]
    pub statistic: f64,
    pub pvalue: f64,
}

impl NormalityTest {
    /// True when normality is not rejected at `alpha`
    pub fn is_normal(&self, alpha: f64) -> bool {
        self.pvalue > alpha
    }
}

const C1: [f64; 6] = [0.0, 0.221157, -0.147981, -2.07119, 4.434685, -2.706056];
const C2: [f64; 6] = [0.0, 0.042981, -0.293762, -1.752461, 5.682633, -3.582633];
const C3: [f64; 4] = [0.544, -0.39978, 0.025054, -6.714e-4];
const C4: [f64; 4] = [1.3822, -0.77857, 0.062767, -0.0020322];
const C5: [f64; 4] = [-1.5861, -0.31082, -0.083751, 0.0038915];
const C6: [f64; 3] = [-0.4803, -0.082676, 0.0030302];
const G: [f64; 2] = [-2.273, 0.459];

const SMALL_RANGE: f64 = 1e-19;
const SIX_OVER_PI: f64 = 1.909_859_317_102_74;
const PI_OVER_THREE: f64 = 1.047_197_551_196_6;

/// Evaluate c0 + c1*x + c2*x^2 + ...
fn poly(coefficients: &[f64], x: f64) -> f64 {
    coefficients
        .iter()
        .rev()
        .fold(0.0, |acc, &c| acc * x + c)
}

/// Half of the antisymmetric Shapiro-Wilk coefficients (largest first)
fn coefficients(n: usize, normal: &Normal) -> Vec<f64> {
    let half = n / 2;
    if n == 3 {
        return vec![std::f64::consts::FRAC_1_SQRT_2];
    }

    let an = n as f64;
    let m: Vec<f64> = (1..=half)
        .map(|i| normal.inverse_cdf((i as f64 - 0.375) / (an + 0.25)))
        .collect();
    let summ2 = 2.0 * m.iter().map(|v| v * v).sum::<f64>();
    let ssumm2 = summ2.sqrt();
    let rsn = 1.0 / an.sqrt();

    let mut a = vec![0.0; half];
    let a1 = poly(&C1, rsn) - m[0] / ssumm2;
    let (first_scaled, fac) = if n > 5 {
        let a2 = -m[1] / ssumm2 + poly(&C2, rsn);
        a[1] = a2;
        let fac = ((summ2 - 2.0 * m[0] * m[0] - 2.0 * m[1] * m[1])
            / (1.0 - 2.0 * a1 * a1 - 2.0 * a2 * a2))
            .sqrt();
        (2, fac)
    } else {
        let fac = ((summ2 - 2.0 * m[0] * m[0]) / (1.0 - 2.0 * a1 * a1)).sqrt();
        (1, fac)
    };
    a[0] = a1;
    for i in first_scaled..half {
        a[i] = -m[i] / fac;
    }
    a
}

/// Shapiro-Wilk W test
///
/// Requires at least 3 observations. Data with zero range is reported as
/// W = 1, p = 1.
pub fn shapiro_wilk(sample: &[f64]) -> Result<NormalityTest> {
    let n = sample.len();
    if n < 3 {
        return Err(AnalysisError::InsufficientData {
            what: "Shapiro-Wilk test".to_string(),
            required: 3,
            actual: n,
        });
    }

    let mut x = sample.to_vec();
    x.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let range = x[n - 1] - x[0];
    if range < SMALL_RANGE {
        tracing::debug!("Shapiro-Wilk input has zero range; reporting W = 1");
        return Ok(NormalityTest {
            statistic: 1.0,
            pvalue: 1.0,
        });
    }

    let normal = standard_normal()?;
    let half_coefficients = coefficients(n, &normal);

    // Full coefficient vector: -a[i] at the low end, +a[i] mirrored at the top
    let mut weights = vec![0.0; n];
    for (i, &a) in half_coefficients.iter().enumerate() {
        weights[i] = -a;
        weights[n - 1 - i] = a;
    }

    // W is the squared correlation between the sorted data and the weights
    let x_mean = x.iter().map(|v| v / range).sum::<f64>() / n as f64;
    let w_mean = weights.iter().sum::<f64>() / n as f64;
    let (mut ssa, mut ssx, mut sax) = (0.0, 0.0, 0.0);
    for (xi, wi) in x.iter().zip(&weights) {
        let dx = xi / range - x_mean;
        let dw = wi - w_mean;
        ssa += dw * dw;
        ssx += dx * dx;
        sax += dw * dx;
    }
    let w = (sax * sax / (ssa * ssx)).min(1.0);

    Ok(NormalityTest {
        statistic: w,
        pvalue: pvalue(w, n, &normal),
    })
}

fn pvalue(w: f64, n: usize, normal: &Normal) -> f64 {
    if n == 3 {
        let p = SIX_OVER_PI * (w.sqrt().asin() - PI_OVER_THREE);
        return p.clamp(0.0, 1.0);
    }

    let an = n as f64;
    let mut y = (1.0 - w).ln();
    let (mean, sd) = if n <= 11 {
        let gamma = poly(&G, an);
        if y >= gamma {
            return 1e-99;
        }
        y = -(gamma - y).ln();
        (poly(&C3, an), poly(&C4, an).exp())
    } else {
        let ln_n = an.ln();
        (poly(&C5, ln_n), poly(&C6, ln_n).exp())
    };

    normal.sf((y - mean) / sd)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poly_evaluates_in_ascending_powers() {
        assert_eq!(poly(&[1.0, 2.0, 3.0], 2.0), 1.0 + 4.0 + 12.0);
        assert_eq!(poly(&[5.0], 10.0), 5.0);
    }

    #[test]
    fn test_shapiro_reference_weights() {
        // Weights of 11 men, the classic Shapiro & Wilk (1965) example
        let weights = [
            148.0, 154.0, 158.0, 160.0, 161.0, 162.0, 166.0, 170.0, 182.0, 195.0, 236.0,
        ];
        let result = shapiro_wilk(&weights).unwrap();
        assert!((result.statistic - 0.78881).abs() < 1e-4, "W = {}", result.statistic);
        assert!((result.pvalue - 0.006704).abs() < 1e-4, "p = {}", result.pvalue);
        assert!(!result.is_normal(0.05));
    }

    #[test]
    fn test_shapiro_uniform_grid_large_n() {
        let grid: Vec<f64> = (1..=15).map(f64::from).collect();
        let result = shapiro_wilk(&grid).unwrap();
        assert!((result.statistic - 0.96359).abs() < 1e-4);
        assert!((result.pvalue - 0.75453).abs() < 1e-3);
        assert!(result.is_normal(0.05));
    }

    #[test]
    fn test_shapiro_small_sample_normal_looking() {
        let sample = [2.1, 2.5, 1.8, 3.0, 2.7, 2.2, 2.9, 2.4];
        let result = shapiro_wilk(&sample).unwrap();
        assert!((result.statistic - 0.97446).abs() < 1e-4);
        assert!((result.pvalue - 0.93055).abs() < 1e-3);
    }

    #[test]
    fn test_shapiro_skewed_small_sample() {
        let sample = [0.0, 0.0, 0.0, 0.0, 1.0, 5.0, 9.0, 20.0];
        let result = shapiro_wilk(&sample).unwrap();
        assert!((result.statistic - 0.71261).abs() < 1e-4);
        assert!(result.pvalue < 0.01);
    }

    #[test]
    fn test_shapiro_n3_exact() {
        let result = shapiro_wilk(&[1.0, 2.0, 3.0]).unwrap();
        assert!((result.statistic - 1.0).abs() < 1e-12);
        assert!((result.pvalue - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_shapiro_constant_input() {
        let result = shapiro_wilk(&[4.0, 4.0, 4.0, 4.0]).unwrap();
        assert_eq!(result.statistic, 1.0);
        assert_eq!(result.pvalue, 1.0);
    }

    #[test]
    fn test_shapiro_needs_three_values() {
        let err = shapiro_wilk(&[1.0, 2.0]).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::InsufficientData { required: 3, actual: 2, .. }
        ));
    }
}
