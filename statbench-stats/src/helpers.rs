//! Helper functions for statistical operations
//!
//! Common utilities for validating inputs and summarising slices.

use statbench_core::StatError;

/// Require at least one value
pub fn require_non_empty(values: &[f64], name: &str) -> Result<(), StatError> {
    if values.is_empty() {
        return Err(StatError::empty_sample(name));
    }
    Ok(())
}

/// Require minimum count
pub fn require_min_count(values: &[f64], min: usize) -> Result<(), StatError> {
    if values.len() < min {
        return Err(StatError::insufficient_data(values.len(), min));
    }
    Ok(())
}

/// Require every value to be finite
pub fn require_finite(values: &[f64], name: &str) -> Result<(), StatError> {
    if let Some(pos) = values.iter().position(|v| !v.is_finite()) {
        return Err(StatError::invalid_input(format!(
            "{} contains a non-finite value at position {}",
            name, pos
        )));
    }
    Ok(())
}

pub fn sum(values: &[f64]) -> f64 {
    values.iter().sum()
}

/// Arithmetic mean; NaN for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    sum(values) / values.len() as f64
}

/// True when every value equals the first
pub fn is_constant(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] == w[1])
}

/// Mean and deviations from it.
///
/// Values are first shifted by the first observation, so an offset that is
/// large next to the spread does not swamp the deviations.
pub fn deviations(values: &[f64]) -> (f64, Vec<f64>) {
    let Some(&origin) = values.first() else {
        return (f64::NAN, Vec::new());
    };
    let shifted: Vec<f64> = values.iter().map(|v| v - origin).collect();
    let shift_mean = mean(&shifted);
    (origin + shift_mean, shifted.iter().map(|d| d - shift_mean).collect())
}

/// Σ(x - mean)²
pub fn sum_squared_deviations(values: &[f64], mean: f64) -> f64 {
    values.iter().map(|v| (v - mean) * (v - mean)).sum()
}

/// Sample standard deviation (divisor n-1); NaN for fewer than two values
pub fn std_dev(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return f64::NAN;
    }
    let (_, dev) = deviations(values);
    (dev.iter().map(|d| d * d).sum::<f64>() / (n - 1) as f64).sqrt()
}

/// Copy and sort ascending
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(|a, b| a.total_cmp(b));
    out
}

/// Linear-interpolation quantile of sorted data, `p` in [0, 1]
pub fn quantile_sorted(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 0 || p.is_nan() {
        return f64::NAN;
    }
    if n == 1 || p <= 0.0 {
        return sorted[0];
    }
    if p >= 1.0 {
        return sorted[n - 1];
    }

    let h = (n - 1) as f64 * p;
    let lower = h.floor() as usize;
    let upper = (lower + 1).min(n - 1);
    let frac = h - lower as f64;

    sorted[lower] + frac * (sorted[upper] - sorted[lower])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_mean_and_std_dev() {
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_abs_diff_eq!(mean(&v), 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(std_dev(&v), (32.0f64 / 7.0).sqrt(), epsilon = 1e-12);
        assert!(mean(&[]).is_nan());
        assert!(std_dev(&[1.0]).is_nan());
    }

    #[test]
    fn test_is_constant_ignores_magnitude() {
        assert!(is_constant(&[0.1, 0.1, 0.1]));
        assert!(is_constant(&[]));
        assert!(!is_constant(&[1.7e9, 1.7e9 + 60.0]));
        assert!(!is_constant(&[1e-6, 2e-6]));
    }

    #[test]
    fn test_deviations_survive_large_offset() {
        let x: Vec<f64> = [0.0, 60.0, 120.0, 180.0, 240.0].iter().map(|d| 1.7e9 + d).collect();
        let (m, dev) = deviations(&x);
        assert_eq!(m, 1.7e9 + 120.0);
        assert_eq!(dev, vec![-120.0, -60.0, 0.0, 60.0, 120.0]);
        assert_abs_diff_eq!(std_dev(&x), 9000.0f64.sqrt(), epsilon = 1e-9);
        assert!(deviations(&[]).0.is_nan());
    }

    #[test]
    fn test_quantile_boundaries() {
        let s = sorted(&[5.0, 1.0, 3.0, 2.0, 4.0]);
        assert_eq!(quantile_sorted(&s, 0.0), 1.0);
        assert_eq!(quantile_sorted(&s, 1.0), 5.0);
        assert_abs_diff_eq!(quantile_sorted(&s, 0.5), 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(quantile_sorted(&s, 0.25), 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(quantile_sorted(&s, 0.1), 1.4, epsilon = 1e-12);
    }

    #[test]
    fn test_require_helpers() {
        assert_eq!(
            require_non_empty(&[], "y").unwrap_err().code,
            statbench_core::codes::EMPTY_SAMPLE
        );
        assert_eq!(
            require_min_count(&[1.0], 2).unwrap_err().code,
            statbench_core::codes::INSUFFICIENT_DATA
        );
        assert!(require_finite(&[1.0, f64::NAN], "x").is_err());
        assert!(require_finite(&[1.0, 2.0], "x").is_ok());
    }
}
