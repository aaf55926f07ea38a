//! Eigenvalue-based collinearity diagnostics for an intercept plus one predictor
//!
//! The design columns are scaled to unit length, so the cross-product matrix
//! is [[1, r], [r, 1]] with eigenvalues 1 ± |r|.

use crate::regression::CONSTANT;
use serde::Serialize;
use statbench_core::StatError;
use statbench_matrix::Matrix;

/// Eigenvalue at or below which the design is treated as singular
const EIGEN_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollinearityDimension {
    /// 1-based, by descending eigenvalue
    pub dimension: usize,
    pub eigenvalue: f64,
    pub condition_index: f64,
    /// One share per design term, in term order
    pub variance_proportions: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollinearityDiagnostics {
    pub terms: Vec<String>,
    pub dimensions: Vec<CollinearityDimension>,
}

impl CollinearityDiagnostics {
    pub fn max_condition_index(&self) -> f64 {
        self.dimensions.iter().map(|d| d.condition_index).fold(f64::NAN, f64::max)
    }
}

/// Diagnostics for a two-column design matrix
pub fn collinearity_diagnostics(design: &Matrix, terms: &[&str]) -> Result<CollinearityDiagnostics, StatError> {
    if design.cols() != 2 {
        return Err(StatError::unsupported(format!(
            "collinearity diagnostics need exactly 2 design columns, got {}",
            design.cols()
        )));
    }
    if terms.len() != design.cols() {
        return Err(StatError::invalid_input(format!(
            "{} term names given for {} design columns",
            terms.len(),
            design.cols()
        )));
    }

    let rows = design.to_rows();
    let (mut ss0, mut ss1, mut cross) = (0.0, 0.0, 0.0);
    for row in &rows {
        ss0 += row[0] * row[0];
        ss1 += row[1] * row[1];
        cross += row[0] * row[1];
    }

    let (s0, s1) = (ss0.sqrt(), ss1.sqrt());
    if s0 == 0.0 || s1 == 0.0 {
        let term = if s0 == 0.0 { terms[0] } else { terms[1] };
        return Err(StatError::singular(format!("{} is identically zero", term)));
    }

    let r = cross / (s0 * s1);
    let eigenvalues = [1.0 + r.abs(), 1.0 - r.abs()];
    if eigenvalues[1] <= EIGEN_EPSILON {
        return Err(StatError::singular("the predictor is collinear with the constant"));
    }

    // Every eigenvector component is ±1/√2, so v² = 1/2 throughout
    let phi: Vec<f64> = eigenvalues.iter().map(|l| 0.5 / l).collect();
    let phi_total: f64 = phi.iter().sum();

    let dimensions = eigenvalues
        .iter()
        .zip(&phi)
        .enumerate()
        .map(|(j, (&eigenvalue, &p))| CollinearityDimension {
            dimension: j + 1,
            eigenvalue,
            condition_index: (eigenvalues[0] / eigenvalue).sqrt(),
            variance_proportions: vec![p / phi_total; terms.len()],
        })
        .collect();

    Ok(CollinearityDiagnostics {
        terms: terms.iter().map(|t| t.to_string()).collect(),
        dimensions,
    })
}

/// Diagnostics for the design [1, x]
pub fn from_predictor(x: &[f64], name: &str) -> Result<CollinearityDiagnostics, StatError> {
    let design = Matrix::from_columns(&[vec![1.0; x.len()], x.to_vec()])?;
    collinearity_diagnostics(&design, &[CONSTANT, name])
}
