//! Variance decomposition and model-level significance

use crate::regression::FitResult;
use crate::special::f_upper_tail;
use serde::Serialize;

/// One line of the ANOVA table. Total carries no mean square or test.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnovaRow {
    pub sum_of_squares: f64,
    pub df: usize,
    pub mean_square: Option<f64>,
    pub f: Option<f64>,
    pub significance: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Anova {
    pub regression: AnovaRow,
    pub residual: AnovaRow,
    pub total: AnovaRow,
}

fn mean_square(ss: f64, df: usize) -> f64 {
    if df == 0 {
        f64::NAN
    } else {
        ss / df as f64
    }
}

impl Anova {
    pub fn from_fit(fit: &FitResult) -> Self {
        Self::from_parts(fit.ss_regression, fit.ss_residual, fit.n, fit.k)
    }

    /// Decomposition from total SS and R², SSR = SST × R²
    pub fn from_r_squared(ss_total: f64, r_squared: f64, n: usize, k: usize) -> Self {
        let ss_regression = ss_total * r_squared;
        Self::from_parts(ss_regression, ss_total - ss_regression, n, k)
    }

    /// n observations, k predictors excluding the intercept
    pub fn from_parts(ss_regression: f64, ss_residual: f64, n: usize, k: usize) -> Self {
        let df_regression = k;
        let df_residual = n.saturating_sub(k + 1);
        let df_total = n.saturating_sub(1);

        let ms_regression = mean_square(ss_regression, df_regression);
        let ms_residual = mean_square(ss_residual, df_residual);
        let f = ms_regression / ms_residual;
        let significance = f_upper_tail(f, df_regression as f64, df_residual as f64);

        Anova {
            regression: AnovaRow {
                sum_of_squares: ss_regression,
                df: df_regression,
                mean_square: Some(ms_regression),
                f: Some(f),
                significance: Some(significance),
            },
            residual: AnovaRow {
                sum_of_squares: ss_residual,
                df: df_residual,
                mean_square: Some(ms_residual),
                f: None,
                significance: None,
            },
            total: AnovaRow {
                sum_of_squares: ss_regression + ss_residual,
                df: df_total,
                mean_square: None,
                f: None,
                significance: None,
            },
        }
    }

    pub fn f(&self) -> f64 {
        self.regression.f.unwrap_or(f64::NAN)
    }

    pub fn significance(&self) -> f64 {
        self.regression.significance.unwrap_or(f64::NAN)
    }
}

/// Σ(eₜ − eₜ₋₁)² / Σeₜ² over residuals in observation order
pub fn durbin_watson(residuals: &[f64]) -> Option<f64> {
    if residuals.len() < 2 {
        return None;
    }
    let denominator: f64 = residuals.iter().map(|e| e * e).sum();
    if denominator == 0.0 {
        return None;
    }
    let numerator: f64 = residuals.windows(2).map(|w| (w[1] - w[0]) * (w[1] - w[0])).sum();
    Some(numerator / denominator)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSummary {
    pub r: f64,
    pub r_squared: f64,
    pub adj_r_squared: f64,
    pub std_error_estimate: f64,
    pub durbin_watson: Option<f64>,
}

impl ModelSummary {
    /// With one predictor R carries the sign of the slope
    pub fn from_fit(fit: &FitResult) -> Self {
        let magnitude = fit.r_squared.sqrt();
        let r = if fit.k == 1 && fit.slope() < 0.0 { -magnitude } else { magnitude };
        ModelSummary {
            r,
            r_squared: fit.r_squared,
            adj_r_squared: fit.adj_r_squared,
            std_error_estimate: fit.std_error_estimate,
            durbin_watson: fit.durbin_watson,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regression::fit_simple;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_anova_from_fit() {
        let fit = fit_simple(&[1.0, 2.0, 3.0, 4.0, 5.0], &[2.0, 4.0, 5.0, 4.0, 5.0], "x").unwrap();
        let anova = Anova::from_fit(&fit);
        assert_abs_diff_eq!(anova.regression.sum_of_squares, 3.6, epsilon = 1e-12);
        assert_abs_diff_eq!(anova.residual.sum_of_squares, 2.4, epsilon = 1e-12);
        assert_abs_diff_eq!(anova.total.sum_of_squares, 6.0, epsilon = 1e-12);
        assert_eq!((anova.regression.df, anova.residual.df, anova.total.df), (1, 3, 4));
        assert_abs_diff_eq!(anova.residual.mean_square.unwrap(), 0.8, epsilon = 1e-12);
        assert_abs_diff_eq!(anova.f(), 4.5, epsilon = 1e-9);
        assert_abs_diff_eq!(anova.significance(), 0.124, epsilon = 5e-4);
        assert!(anova.total.mean_square.is_none());
        assert!(anova.residual.f.is_none());
    }

    #[test]
    fn test_from_r_squared_matches_fit() {
        let a = Anova::from_r_squared(6.0, 0.6, 5, 1);
        assert_abs_diff_eq!(a.regression.sum_of_squares, 3.6, epsilon = 1e-12);
        assert_abs_diff_eq!(a.residual.sum_of_squares, 2.4, epsilon = 1e-12);
        assert_abs_diff_eq!(a.f(), 4.5, epsilon = 1e-9);
    }

    #[test]
    fn test_zero_residual_df_has_no_significance() {
        let a = Anova::from_parts(2.0, 0.0, 2, 1);
        assert_eq!(a.residual.df, 0);
        assert!(a.f().is_nan());
        assert!(a.significance().is_nan());
    }

    #[test]
    fn test_durbin_watson_is_order_sensitive() {
        assert_abs_diff_eq!(durbin_watson(&[1.0, -1.0, 1.0, -1.0]).unwrap(), 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(durbin_watson(&[1.0, 1.0, -1.0, -1.0]).unwrap(), 1.0, epsilon = 1e-12);
        assert_eq!(durbin_watson(&[0.0, 0.0, 0.0]), None);
        assert_eq!(durbin_watson(&[1.0]), None);
    }

    #[test]
    fn test_model_summary_r_sign_follows_slope() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let up = fit_simple(&x, &[2.0, 4.0, 5.0, 4.0, 5.0], "x").unwrap();
        let down = fit_simple(&x, &[5.0, 4.0, 5.0, 4.0, 2.0], "x").unwrap();
        let up = ModelSummary::from_fit(&up);
        let down = ModelSummary::from_fit(&down);
        assert_abs_diff_eq!(up.r, 0.6f64.sqrt(), epsilon = 1e-12);
        assert!(down.r < 0.0);
        assert_abs_diff_eq!(up.std_error_estimate, 0.8f64.sqrt(), epsilon = 1e-12);
        assert!(up.durbin_watson.is_some());
    }
}
