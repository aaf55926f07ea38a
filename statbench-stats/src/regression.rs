//! Ordinary least squares: closed form for one predictor, normal equations otherwise

use crate::anova::durbin_watson;
use crate::helpers::{deviations, is_constant, mean, require_finite, require_non_empty, std_dev, sum_squared_deviations};
use crate::special::t_two_tailed;
use serde::Serialize;
use statbench_core::StatError;
use statbench_matrix::Matrix;
use tracing::{debug, warn};

/// Row header of the intercept term
pub const CONSTANT: &str = "(Constant)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FitMethod {
    ClosedForm,
    NormalEquations,
}

/// One model term with its test statistic
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Coefficient {
    pub name: String,
    pub estimate: f64,
    pub std_error: f64,
    /// Standardized coefficient; None for the intercept
    pub beta: Option<f64>,
    pub t: f64,
    pub significance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitResult {
    /// Intercept first, then one entry per predictor
    pub coefficients: Vec<Coefficient>,
    pub fitted: Vec<f64>,
    pub residuals: Vec<f64>,
    /// Observations used
    pub n: usize,
    /// Predictors, excluding the intercept
    pub k: usize,
    pub ss_regression: f64,
    pub ss_residual: f64,
    pub ss_total: f64,
    pub df_regression: usize,
    pub df_residual: usize,
    pub df_total: usize,
    pub r_squared: f64,
    pub adj_r_squared: f64,
    pub std_error_estimate: f64,
    pub durbin_watson: Option<f64>,
    pub method: FitMethod,
}

impl FitResult {
    pub fn intercept(&self) -> f64 {
        self.coefficients[0].estimate
    }

    /// First predictor's coefficient, NaN for an intercept-only fit
    pub fn slope(&self) -> f64 {
        self.coefficients.get(1).map_or(f64::NAN, |c| c.estimate)
    }

    pub fn coefficient(&self, name: &str) -> Option<&Coefficient> {
        self.coefficients.iter().find(|c| c.name == name)
    }

    /// SSE / df_residual
    pub fn mean_square_error(&self) -> f64 {
        if self.df_residual == 0 {
            f64::NAN
        } else {
            self.ss_residual / self.df_residual as f64
        }
    }

    /// Estimates in term order
    pub fn estimates(&self) -> Vec<f64> {
        self.coefficients.iter().map(|c| c.estimate).collect()
    }
}

/// Raw output of either fitting path, before statistics are derived
struct Estimates {
    values: Vec<f64>,
    /// MSE multipliers giving each coefficient's sampling variance
    variance_factors: Vec<f64>,
    fitted: Vec<f64>,
}

fn validate(y: &[f64], predictors: &[&[f64]], names: &[&str]) -> Result<(), StatError> {
    require_non_empty(y, "dependent")?;
    if predictors.is_empty() {
        return Err(StatError::invalid_input("regression requires at least one predictor"));
    }
    if names.len() != predictors.len() {
        return Err(StatError::invalid_input(format!(
            "{} predictor names given for {} predictors",
            names.len(),
            predictors.len()
        )));
    }
    require_finite(y, "dependent")?;
    for (x, name) in predictors.iter().zip(names) {
        if x.len() != y.len() {
            return Err(StatError::length_mismatch(name, y.len(), x.len()));
        }
        require_finite(x, name)?;
    }

    let needed = predictors.len() + 1;
    if y.len() < needed {
        return Err(StatError::insufficient_data(y.len(), needed));
    }
    Ok(())
}

/// Least-squares line through (x, y)
pub fn fit_simple(x: &[f64], y: &[f64], name: &str) -> Result<FitResult, StatError> {
    validate(y, &[x], &[name])?;
    let n = y.len();
    debug!(n, k = 1, "closed-form fit");

    let (mean_x, dx) = deviations(x);
    let (mean_y, dy) = deviations(y);
    let sxx: f64 = dx.iter().map(|d| d * d).sum();
    if is_constant(x) || !(sxx > 0.0) {
        return Err(zero_variance(name));
    }

    let sxy: f64 = dx.iter().zip(&dy).map(|(a, b)| a * b).sum();
    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;

    let estimates = Estimates {
        values: vec![intercept, slope],
        variance_factors: vec![1.0 / n as f64 + mean_x * mean_x / sxx, 1.0 / sxx],
        fitted: dx.iter().map(|d| mean_y + slope * d).collect(),
    };

    Ok(assemble(y, &[x], &[name], estimates, FitMethod::ClosedForm))
}

/// Least-squares fit on k predictors via the normal equations.
///
/// Each predictor is centered and scaled to unit length and the intercept
/// column is 1/√n, so ZᵗZ is a correlation matrix bordered by a unit
/// intercept entry. The solution γ and (ZᵗZ)⁻¹ are mapped back to the
/// original units with b = Tγ and Cov(b) ∝ T(ZᵗZ)⁻¹Tᵗ.
pub fn fit_ols(y: &[f64], predictors: &[&[f64]], names: &[&str]) -> Result<FitResult, StatError> {
    validate(y, predictors, names)?;
    let n = y.len();
    let k = predictors.len();
    debug!(n, k, "normal-equations fit");

    if let Some(j) = predictors.iter().position(|x| is_constant(x)) {
        return Err(zero_variance(names[j]));
    }

    let root_n = (n as f64).sqrt();
    let mut means = Vec::with_capacity(k);
    let mut norms = Vec::with_capacity(k);
    let mut columns = Vec::with_capacity(k + 1);
    columns.push(vec![1.0 / root_n; n]);
    for x in predictors {
        let (m, dev) = deviations(x);
        let s = dev.iter().map(|d| d * d).sum::<f64>().sqrt();
        columns.push(dev.iter().map(|d| d / s).collect());
        means.push(m);
        norms.push(s);
    }

    let design = Matrix::from_columns(&columns)?;
    let design_t = design.transpose();
    let ztz = design_t.multiply(&design)?;
    let ztz_inv = ztz.invert().map_err(|e| {
        warn!(n, k, error = %e, "design matrix is singular");
        StatError::from(e)
    })?;

    let gamma = ztz_inv.multiply(&design_t)?.multiply(&Matrix::column_vector(y))?;
    let fitted = design.multiply(&gamma)?;

    let transform = unscaling(root_n, &means, &norms)?;
    let beta = transform.multiply(&gamma)?;
    let covariance = transform.multiply(&ztz_inv)?.multiply(&transform.transpose())?;

    let estimates = Estimates {
        values: beta.as_dmatrix().iter().copied().collect(),
        variance_factors: covariance.diagonal(),
        fitted: fitted.as_dmatrix().iter().copied().collect(),
    };

    Ok(assemble(y, predictors, names, estimates, FitMethod::NormalEquations))
}

/// T with b = Tγ: row 0 is (1/√n, -x̄ⱼ/sⱼ), row j is eⱼ/sⱼ
fn unscaling(root_n: f64, means: &[f64], norms: &[f64]) -> Result<Matrix, StatError> {
    let size = means.len() + 1;
    let mut rows = vec![vec![0.0; size]; size];
    rows[0][0] = 1.0 / root_n;
    for (j, (&m, &s)) in means.iter().zip(norms).enumerate() {
        rows[0][j + 1] = -m / s;
        rows[j + 1][j + 1] = 1.0 / s;
    }
    Matrix::from_rows(rows).map_err(StatError::from)
}

fn zero_variance(name: &str) -> StatError {
    warn!(predictor = name, "predictor has zero variance");
    StatError::singular(format!("{} has zero variance", name))
}

fn assemble(
    y: &[f64],
    predictors: &[&[f64]],
    names: &[&str],
    estimates: Estimates,
    method: FitMethod,
) -> FitResult {
    let n = y.len();
    let k = predictors.len();
    let mean_y = mean(y);

    let residuals: Vec<f64> = y.iter().zip(&estimates.fitted).map(|(yi, fi)| yi - fi).collect();
    let ss_total = sum_squared_deviations(y, mean_y);
    let ss_regression = sum_squared_deviations(&estimates.fitted, mean_y);
    let ss_residual: f64 = residuals.iter().map(|e| e * e).sum();

    let df_regression = k;
    let df_residual = n - k - 1;
    let df_total = n - 1;

    let mse = if df_residual == 0 { f64::NAN } else { ss_residual / df_residual as f64 };
    let r_squared = if ss_total > 0.0 { ss_regression / ss_total } else { f64::NAN };
    let adj_r_squared = if df_residual == 0 {
        f64::NAN
    } else {
        1.0 - (1.0 - r_squared) * df_total as f64 / df_residual as f64
    };

    let sd_y = std_dev(y);
    let coefficients = estimates
        .values
        .iter()
        .zip(&estimates.variance_factors)
        .enumerate()
        .map(|(j, (&estimate, &factor))| {
            let std_error = (mse * factor).sqrt();
            let t = estimate / std_error;
            let (name, beta) = if j == 0 {
                (CONSTANT.to_string(), None)
            } else {
                let beta = estimate * std_dev(predictors[j - 1]) / sd_y;
                (names[j - 1].to_string(), Some(beta))
            };
            Coefficient {
                name,
                estimate,
                std_error,
                beta,
                t,
                significance: t_two_tailed(t, df_residual as f64),
            }
        })
        .collect();

    let fit = FitResult {
        coefficients,
        durbin_watson: durbin_watson(&residuals),
        fitted: estimates.fitted,
        residuals,
        n,
        k,
        ss_regression,
        ss_residual,
        ss_total,
        df_regression,
        df_residual,
        df_total,
        r_squared,
        adj_r_squared,
        std_error_estimate: mse.sqrt(),
        method,
    };
    debug!(n, k, r_squared = fit.r_squared, "fit complete");
    fit
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use proptest::prelude::*;
    use statbench_core::codes;

    const X: [f64; 5] = [1.0, 2.0, 3.0, 4.0, 5.0];
    const Y: [f64; 5] = [2.0, 4.0, 5.0, 4.0, 5.0];

    #[test]
    fn test_simple_fit_known_values() {
        let fit = fit_simple(&X, &Y, "x").unwrap();
        assert_abs_diff_eq!(fit.slope(), 0.6, epsilon = 1e-12);
        assert_abs_diff_eq!(fit.intercept(), 2.2, epsilon = 1e-12);
        assert_abs_diff_eq!(fit.r_squared, 0.6, epsilon = 1e-12);
        assert_abs_diff_eq!(fit.ss_total, 6.0, epsilon = 1e-12);
        assert_abs_diff_eq!(fit.ss_regression, 3.6, epsilon = 1e-12);
        assert_abs_diff_eq!(fit.ss_residual, 2.4, epsilon = 1e-12);
        assert_eq!((fit.df_regression, fit.df_residual, fit.df_total), (1, 3, 4));
        assert_abs_diff_eq!(fit.adj_r_squared, 0.4667, epsilon = 1e-4);
        assert_abs_diff_eq!(fit.std_error_estimate, 0.8f64.sqrt(), epsilon = 1e-12);
        assert_eq!(fit.method, FitMethod::ClosedForm);

        let b1 = fit.coefficient("x").unwrap();
        assert_abs_diff_eq!(b1.std_error, 0.08f64.sqrt(), epsilon = 1e-12);
        assert_abs_diff_eq!(b1.t, 2.1213, epsilon = 1e-4);
        assert_abs_diff_eq!(b1.significance, 0.124, epsilon = 5e-4);
        assert_abs_diff_eq!(b1.beta.unwrap(), 0.6f64.sqrt(), epsilon = 1e-12);
        assert_eq!(fit.coefficients[0].name, CONSTANT);
        assert!(fit.coefficients[0].beta.is_none());
    }

    #[test]
    fn test_matrix_path_matches_closed_form() {
        let simple = fit_simple(&X, &Y, "x").unwrap();
        let matrix = fit_ols(&Y, &[&X[..]], &["x"]).unwrap();
        assert_eq!(matrix.method, FitMethod::NormalEquations);
        assert_abs_diff_eq!(matrix.slope(), simple.slope(), epsilon = 1e-9);
        assert_abs_diff_eq!(matrix.intercept(), simple.intercept(), epsilon = 1e-9);
        assert_abs_diff_eq!(matrix.coefficients[0].std_error, simple.coefficients[0].std_error, epsilon = 1e-9);
        assert_abs_diff_eq!(matrix.coefficients[1].std_error, simple.coefficients[1].std_error, epsilon = 1e-9);
    }

    #[test]
    fn test_two_predictor_fit_recovers_plane() {
        // y = 1 + 2a - b, exactly
        let a = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let b = [2.0, 1.0, 4.0, 3.0, 6.0, 5.0];
        let y: Vec<f64> = a.iter().zip(&b).map(|(a, b)| 1.0 + 2.0 * a - b).collect();
        let fit = fit_ols(&y, &[&a[..], &b[..]], &["a", "b"]).unwrap();
        assert_abs_diff_eq!(fit.intercept(), 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(fit.coefficient("a").unwrap().estimate, 2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(fit.coefficient("b").unwrap().estimate, -1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(fit.r_squared, 1.0, epsilon = 1e-9);
        assert_eq!(fit.df_residual, 3);
    }

    #[test]
    fn test_validation_errors() {
        assert_eq!(fit_simple(&[], &[], "x").unwrap_err().code, codes::EMPTY_SAMPLE);
        assert_eq!(
            fit_simple(&[1.0, 2.0], &[1.0, 2.0, 3.0], "x").unwrap_err().code,
            codes::LENGTH_MISMATCH
        );
        assert_eq!(fit_simple(&[1.0], &[1.0], "x").unwrap_err().code, codes::INSUFFICIENT_DATA);
        assert_eq!(
            fit_ols(&[1.0, 2.0, 3.0], &[&[1.0, 2.0, 3.0]], &["x", "z"]).unwrap_err().code,
            codes::INVALID_INPUT
        );
        assert_eq!(
            fit_ols(&[1.0, f64::INFINITY, 3.0], &[&[1.0, 2.0, 3.0]], &["x"]).unwrap_err().code,
            codes::INVALID_INPUT
        );
    }

    #[test]
    fn test_constant_predictor_is_singular_on_both_paths() {
        let x = [3.0, 3.0, 3.0, 3.0];
        let y = [1.0, 2.0, 3.0, 4.0];
        assert!(fit_simple(&x, &y, "x").unwrap_err().is_singular());
        assert!(fit_ols(&y, &[&x[..]], &["x"]).unwrap_err().is_singular());
    }

    #[test]
    fn test_exact_fit_degrades_to_nan() {
        let fit = fit_simple(&[1.0, 2.0], &[3.0, 5.0], "x").unwrap();
        assert_abs_diff_eq!(fit.slope(), 2.0, epsilon = 1e-12);
        assert_eq!(fit.df_residual, 0);
        assert!(fit.std_error_estimate.is_nan());
        assert!(fit.adj_r_squared.is_nan());
        assert!(fit.coefficients[1].significance.is_nan());
    }

    #[test]
    fn test_constant_dependent_has_nan_r_squared() {
        let fit = fit_simple(&X, &[4.0; 5], "x").unwrap();
        assert!(fit.r_squared.is_nan());
        assert_abs_diff_eq!(fit.slope(), 0.0, epsilon = 1e-12);
        assert!(fit.durbin_watson.is_none());
    }

    #[test]
    fn test_sum_of_squares_identity() {
        let x = [1.0, 3.0, 4.0, 7.0, 8.0, 10.0];
        let z = [0.5, 0.1, 0.9, 0.3, 0.8, 0.2];
        let y = [2.1, 3.9, 6.2, 7.1, 9.8, 12.0];
        let fit = fit_ols(&y, &[&x[..], &z[..]], &["x", "z"]).unwrap();
        assert_abs_diff_eq!(fit.ss_total, fit.ss_regression + fit.ss_residual, epsilon = 1e-9);
    }

    #[test]
    fn test_small_unit_predictor_fits_on_both_paths() {
        let x: Vec<f64> = X.iter().map(|v| v * 1e-6).collect();
        let simple = fit_simple(&x, &Y, "x").unwrap();
        let matrix = fit_ols(&Y, &[&x[..]], &["x"]).unwrap();
        assert_relative_eq!(simple.slope(), 600000.0, max_relative = 1e-9);
        assert_relative_eq!(matrix.slope(), 600000.0, max_relative = 1e-9);
        assert_abs_diff_eq!(matrix.intercept(), 2.2, epsilon = 1e-9);
        assert_abs_diff_eq!(matrix.r_squared, 0.6, epsilon = 1e-9);
        assert_relative_eq!(
            matrix.coefficients[1].std_error,
            simple.coefficients[1].std_error,
            max_relative = 1e-9
        );
    }

    #[test]
    fn test_offset_predictor_is_not_constant() {
        // epoch seconds a minute apart
        let x: Vec<f64> = [0.0, 60.0, 120.0, 180.0, 240.0].iter().map(|d| 1.7e9 + d).collect();
        let simple = fit_simple(&x, &Y, "t").unwrap();
        assert_abs_diff_eq!(simple.slope(), 0.01, epsilon = 1e-12);
        assert_abs_diff_eq!(simple.r_squared, 0.6, epsilon = 1e-9);
        assert_abs_diff_eq!(simple.coefficients[1].t, 2.1213, epsilon = 1e-4);
        for (fitted, expected) in simple.fitted.iter().zip([2.8, 3.4, 4.0, 4.6, 5.2]) {
            assert_abs_diff_eq!(*fitted, expected, epsilon = 1e-6);
        }

        let matrix = fit_ols(&Y, &[&x[..]], &["t"]).unwrap();
        assert_relative_eq!(matrix.slope(), 0.01, max_relative = 1e-9);
        assert_relative_eq!(matrix.intercept(), simple.intercept(), max_relative = 1e-12);
        assert_abs_diff_eq!(matrix.r_squared, 0.6, epsilon = 1e-9);
    }

    #[test]
    fn test_collinear_predictors_are_singular() {
        let a = [1.0, 2.0, 3.0, 4.0, 5.0];
        let b: Vec<f64> = a.iter().map(|v| 2.0 * v + 1.0).collect();
        assert!(fit_ols(&Y, &[&a[..], &b[..]], &["a", "b"]).unwrap_err().is_singular());
    }

    #[test]
    fn test_constant_predictor_error_names_it() {
        let err = fit_ols(&Y, &[&X[..], &[7.0; 5][..]], &["x", "w"]).unwrap_err();
        assert!(err.message.contains("w has zero variance"));
    }

    fn scaled_points() -> impl Strategy<Value = (Vec<f64>, Vec<f64>)> {
        (
            prop::collection::vec((-10.0f64..10.0, -10.0f64..10.0), 3..20),
            prop_oneof![Just(1e-6), Just(1.0), Just(1e6)],
            prop_oneof![Just(0.0), Just(1e9)],
        )
            .prop_map(|(points, scale, offset)| {
                let x = points.iter().map(|p| p.0 * scale + offset).collect();
                let y = points.iter().map(|p| p.1).collect();
                (x, y)
            })
    }

    proptest! {
        #[test]
        fn prop_paths_agree_for_one_predictor((x, y) in scaled_points()) {
            // rounding at the offset can leave a single distinct value
            prop_assume!(!is_constant(&x));
            let (mean_x, dx) = deviations(&x);

            let simple = fit_simple(&x, &y, "x").unwrap();
            let matrix = fit_ols(&y, &[&x[..]], &["x"]).unwrap();

            let sxx: f64 = dx.iter().map(|d| d * d).sum();
            let syy = sum_squared_deviations(&y, mean(&y));
            let slope_scale = simple.slope().abs() + (syy / sxx).sqrt();
            prop_assert!((simple.slope() - matrix.slope()).abs() <= 1e-8 * slope_scale);

            let intercept_scale = 1.0 + (slope_scale * mean_x).abs();
            prop_assert!((simple.intercept() - matrix.intercept()).abs() <= 1e-8 * intercept_scale);

            for (a, b) in simple.fitted.iter().zip(&matrix.fitted) {
                prop_assert!((a - b).abs() <= 1e-8 * (1.0 + syy.sqrt()));
            }
            prop_assert!((matrix.ss_total - matrix.ss_regression - matrix.ss_residual).abs() <= 1e-8 * (1.0 + syy));
        }
    }
}
