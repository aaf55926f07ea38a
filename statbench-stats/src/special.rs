//! Special functions behind the significance values
//!
//! These routines never fail. Arguments outside their domain produce NaN,
//! which the table layer renders as a blank "no significance claim".

use tracing::trace;

/// Iteration cap for the continued fraction
pub const MAX_ITERATIONS: usize = 100;

/// Relative change at which the continued fraction is considered converged
pub const EPSILON: f64 = 3e-7;

const FPMIN: f64 = 1e-30;

const LANCZOS_G: f64 = 7.0;

const LANCZOS_COEFFS: [f64; 8] = [
    676.5203681218851,
    -1259.1392167224028,
    771.32342877765313,
    -176.61502916214059,
    12.507343278686905,
    -0.13857109526572012,
    9.9843695780195716e-6,
    1.5056327351493116e-7,
];

/// ln Γ(x) by the Lanczos approximation, valid for x > 0
pub fn log_gamma(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    if x <= 0.0 {
        return f64::INFINITY;
    }

    let z = x - 1.0;
    let mut sum = 0.99999999999980993;
    for (i, &c) in LANCZOS_COEFFS.iter().enumerate() {
        sum += c / (z + i as f64 + 1.0);
    }

    let t = z + LANCZOS_G + 0.5;
    0.5 * (2.0 * std::f64::consts::PI).ln() + (z + 0.5) * t.ln() - t + sum.ln()
}

/// Continued fraction for the incomplete beta function (modified Lentz).
///
/// Returns the current estimate if the iteration cap is reached.
pub fn beta_continued_fraction(x: f64, a: f64, b: f64) -> f64 {
    let qab = a + b;
    let qap = a + 1.0;
    let qam = a - 1.0;

    let mut c = 1.0;
    let mut d = 1.0 - qab * x / qap;
    if d.abs() < FPMIN {
        d = FPMIN;
    }
    d = 1.0 / d;
    let mut h = d;

    for m in 1..=MAX_ITERATIONS {
        let m = m as f64;
        let m2 = 2.0 * m;

        // Even step
        let aa = m * (b - m) * x / ((qam + m2) * (a + m2));
        d = 1.0 + aa * d;
        if d.abs() < FPMIN {
            d = FPMIN;
        }
        c = 1.0 + aa / c;
        if c.abs() < FPMIN {
            c = FPMIN;
        }
        d = 1.0 / d;
        h *= d * c;

        // Odd step
        let aa = -(a + m) * (qab + m) * x / ((a + m2) * (qap + m2));
        d = 1.0 + aa * d;
        if d.abs() < FPMIN {
            d = FPMIN;
        }
        c = 1.0 + aa / c;
        if c.abs() < FPMIN {
            c = FPMIN;
        }
        d = 1.0 / d;
        let del = d * c;
        h *= del;

        if (del - 1.0).abs() < EPSILON {
            return h;
        }
    }

    trace!(x, a, b, "incomplete beta continued fraction hit the iteration cap");
    h
}

/// Regularized incomplete beta I_x(a, b)
pub fn regularized_incomplete_beta(x: f64, a: f64, b: f64) -> f64 {
    if x.is_nan() || !(0.0..=1.0).contains(&x) || !(a > 0.0) || !(b > 0.0) {
        return f64::NAN;
    }
    if x == 0.0 {
        return 0.0;
    }
    if x == 1.0 {
        return 1.0;
    }

    let front = (log_gamma(a + b) - log_gamma(a) - log_gamma(b) + a * x.ln() + b * (1.0 - x).ln()).exp();

    if x < (a + 1.0) / (a + b + 2.0) {
        front * beta_continued_fraction(x, a, b) / a
    } else {
        1.0 - front * beta_continued_fraction(1.0 - x, b, a) / b
    }
}

fn valid_df(df: f64) -> bool {
    df > 0.0 && df.is_finite()
}

/// P(F > f) for the F distribution with (df1, df2) degrees of freedom
pub fn f_upper_tail(f: f64, df1: f64, df2: f64) -> f64 {
    if f.is_nan() || !valid_df(df1) || !valid_df(df2) {
        return f64::NAN;
    }
    if f <= 0.0 {
        return 1.0;
    }
    if f.is_infinite() {
        return 0.0;
    }

    let x = df2 / (df2 + df1 * f);
    regularized_incomplete_beta(x, df2 / 2.0, df1 / 2.0)
}

/// P(F ≤ f)
pub fn f_cdf(f: f64, df1: f64, df2: f64) -> f64 {
    1.0 - f_upper_tail(f, df1, df2)
}

/// Two-tailed p-value of a t statistic, P(|T| ≥ |t|)
pub fn t_two_tailed(t: f64, df: f64) -> f64 {
    if t.is_nan() || !valid_df(df) {
        return f64::NAN;
    }
    if t.is_infinite() {
        return 0.0;
    }

    let x = df / (df + t * t);
    regularized_incomplete_beta(x, df / 2.0, 0.5)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_log_gamma_factorials() {
        // Γ(n) = (n-1)!
        assert_abs_diff_eq!(log_gamma(1.0), 0.0, epsilon = 1e-10);
        assert_abs_diff_eq!(log_gamma(2.0), 0.0, epsilon = 1e-10);
        assert_abs_diff_eq!(log_gamma(5.0), 24f64.ln(), epsilon = 1e-10);
        assert_abs_diff_eq!(log_gamma(0.5), std::f64::consts::PI.sqrt().ln(), epsilon = 1e-10);
        assert_eq!(log_gamma(0.0), f64::INFINITY);
    }

    #[test]
    fn test_incomplete_beta_closed_forms() {
        // I_x(1, 1) = x, I_x(a, 1) = x^a
        assert_abs_diff_eq!(regularized_incomplete_beta(0.3, 1.0, 1.0), 0.3, epsilon = 1e-6);
        assert_abs_diff_eq!(regularized_incomplete_beta(0.5, 2.0, 1.0), 0.25, epsilon = 1e-6);
        assert_abs_diff_eq!(regularized_incomplete_beta(0.9, 3.0, 1.0), 0.729, epsilon = 1e-6);
        assert_eq!(regularized_incomplete_beta(0.0, 2.0, 3.0), 0.0);
        assert_eq!(regularized_incomplete_beta(1.0, 2.0, 3.0), 1.0);
    }

    #[test]
    fn test_incomplete_beta_symmetry() {
        let (x, a, b) = (0.35, 2.5, 4.0);
        let lhs = regularized_incomplete_beta(x, a, b);
        let rhs = 1.0 - regularized_incomplete_beta(1.0 - x, b, a);
        assert_abs_diff_eq!(lhs, rhs, epsilon = 1e-6);
    }

    #[test]
    fn test_incomplete_beta_domain_falls_back_to_nan() {
        assert!(regularized_incomplete_beta(-0.1, 1.0, 1.0).is_nan());
        assert!(regularized_incomplete_beta(1.1, 1.0, 1.0).is_nan());
        assert!(regularized_incomplete_beta(0.5, 0.0, 1.0).is_nan());
        assert!(regularized_incomplete_beta(0.5, 1.0, -2.0).is_nan());
        assert!(regularized_incomplete_beta(f64::NAN, 1.0, 1.0).is_nan());
    }

    #[test]
    fn test_f_upper_tail_known_values() {
        // F(1, 3) = 4.5 is the slope test of y = [2,4,5,4,5] on x = 1..5
        assert_abs_diff_eq!(f_upper_tail(4.5, 1.0, 3.0), 0.124, epsilon = 5e-4);
        // 5% critical value of F(2, 10) is 4.10
        assert_abs_diff_eq!(f_upper_tail(4.10, 2.0, 10.0), 0.05, epsilon = 5e-4);
        assert_abs_diff_eq!(f_cdf(4.10, 2.0, 10.0), 0.95, epsilon = 5e-4);
    }

    #[test]
    fn test_f_upper_tail_edges() {
        assert_eq!(f_upper_tail(0.0, 1.0, 3.0), 1.0);
        assert_eq!(f_upper_tail(f64::INFINITY, 1.0, 3.0), 0.0);
        assert!(f_upper_tail(f64::NAN, 1.0, 3.0).is_nan());
        assert!(f_upper_tail(2.0, 1.0, 0.0).is_nan());
    }

    #[test]
    fn test_t_two_tailed() {
        assert_abs_diff_eq!(t_two_tailed(0.0, 10.0), 1.0, epsilon = 1e-12);
        // 5% two-sided critical value for df = 10 is 2.228
        assert_abs_diff_eq!(t_two_tailed(2.228, 10.0), 0.05, epsilon = 5e-4);
        assert_abs_diff_eq!(t_two_tailed(-2.228, 10.0), 0.05, epsilon = 5e-4);
        assert_eq!(t_two_tailed(f64::NEG_INFINITY, 4.0), 0.0);
        assert!(t_two_tailed(1.0, 0.0).is_nan());
    }

    #[test]
    fn test_t_squared_matches_f() {
        // t² with df ~ F(1, df)
        let t: f64 = 2.1213203435596424;
        assert_abs_diff_eq!(t_two_tailed(t, 3.0), f_upper_tail(t * t, 1.0, 3.0), epsilon = 1e-6);
    }
}
