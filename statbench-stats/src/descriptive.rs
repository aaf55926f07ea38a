//! Univariate summary statistics over the valid values of a sample

use crate::helpers::{mean, quantile_sorted, sorted, sum, sum_squared_deviations};
use serde::Serialize;
use statbench_core::{Sample, StatError};

/// Default percentile cut points
pub const DEFAULT_PERCENTILES: [f64; 11] = [10.0, 20.0, 25.0, 30.0, 40.0, 50.0, 60.0, 70.0, 75.0, 80.0, 90.0];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Percentile {
    pub percent: f64,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Descriptives {
    pub variable: String,
    pub valid: usize,
    pub missing: usize,
    pub mean: f64,
    pub se_mean: f64,
    pub median: f64,
    /// Smallest of the most frequent values
    pub mode: f64,
    pub multiple_modes: bool,
    pub std_dev: f64,
    pub variance: f64,
    pub skewness: f64,
    pub se_skewness: f64,
    pub kurtosis: f64,
    pub se_kurtosis: f64,
    pub range: f64,
    pub minimum: f64,
    pub maximum: f64,
    pub sum: f64,
    pub percentiles: Vec<Percentile>,
}

impl Descriptives {
    pub fn compute(sample: &Sample, cut_points: &[f64]) -> Result<Self, StatError> {
        validate_cut_points(cut_points)?;

        let values = sample.valid();
        if values.is_empty() {
            return Err(StatError::empty_sample(sample.name()));
        }

        let n = values.len();
        let nf = n as f64;
        let sorted = sorted(&values);
        let m = mean(&values);

        let variance = if n < 2 { f64::NAN } else { sum_squared_deviations(&values, m) / (nf - 1.0) };
        let std_dev = variance.sqrt();

        let (mode, multiple_modes) = mode(&sorted);
        let minimum = sorted[0];
        let maximum = sorted[n - 1];

        let percentiles = cut_points
            .iter()
            .map(|&percent| Percentile { percent, value: quantile_sorted(&sorted, percent / 100.0) })
            .collect();

        Ok(Descriptives {
            variable: sample.name().to_string(),
            valid: n,
            missing: sample.missing_count(),
            mean: m,
            se_mean: std_dev / nf.sqrt(),
            median: quantile_sorted(&sorted, 0.5),
            mode,
            multiple_modes,
            std_dev,
            variance,
            skewness: skewness(&values, m, std_dev),
            se_skewness: se_skewness(n),
            kurtosis: kurtosis(&values, m, std_dev),
            se_kurtosis: se_kurtosis(n),
            range: maximum - minimum,
            minimum,
            maximum,
            sum: sum(&values),
            percentiles,
        })
    }

    pub fn percentile(&self, percent: f64) -> Option<f64> {
        self.percentiles.iter().find(|p| p.percent == percent).map(|p| p.value)
    }
}

fn validate_cut_points(cut_points: &[f64]) -> Result<(), StatError> {
    match cut_points.iter().find(|p| !(0.0..=100.0).contains(*p)) {
        Some(bad) => Err(StatError::invalid_input(format!(
            "percentile {} is outside [0, 100]",
            bad
        ))),
        None => Ok(()),
    }
}

/// Most frequent value of sorted data, and whether it is shared
fn mode(sorted: &[f64]) -> (f64, bool) {
    let mut best_value = sorted[0];
    let mut best_count = 0;
    let mut ties = false;

    let mut i = 0;
    while i < sorted.len() {
        let mut j = i + 1;
        while j < sorted.len() && sorted[j] == sorted[i] {
            j += 1;
        }
        let count = j - i;
        if count > best_count {
            best_value = sorted[i];
            best_count = count;
            ties = false;
        } else if count == best_count {
            ties = true;
        }
        i = j;
    }

    (best_value, ties)
}

fn standardized_moment_sum(values: &[f64], mean: f64, sd: f64, power: i32) -> f64 {
    values.iter().map(|v| ((v - mean) / sd).powi(power)).sum()
}

/// Adjusted Fisher–Pearson G1
fn skewness(values: &[f64], mean: f64, sd: f64) -> f64 {
    let n = values.len() as f64;
    if values.len() < 3 || !(sd > 0.0) {
        return f64::NAN;
    }
    n / ((n - 1.0) * (n - 2.0)) * standardized_moment_sum(values, mean, sd, 3)
}

/// Excess kurtosis G2
fn kurtosis(values: &[f64], mean: f64, sd: f64) -> f64 {
    let n = values.len() as f64;
    if values.len() < 4 || !(sd > 0.0) {
        return f64::NAN;
    }
    let m4 = standardized_moment_sum(values, mean, sd, 4);
    n * (n + 1.0) / ((n - 1.0) * (n - 2.0) * (n - 3.0)) * m4
        - 3.0 * (n - 1.0) * (n - 1.0) / ((n - 2.0) * (n - 3.0))
}

fn se_skewness(n: usize) -> f64 {
    if n < 3 {
        return f64::NAN;
    }
    let n = n as f64;
    (6.0 * n * (n - 1.0) / ((n - 2.0) * (n + 1.0) * (n + 3.0))).sqrt()
}

fn se_kurtosis(n: usize) -> f64 {
    if n < 4 {
        return f64::NAN;
    }
    let nf = n as f64;
    2.0 * se_skewness(n) * ((nf * nf - 1.0) / ((nf - 3.0) * (nf + 5.0))).sqrt()
}
