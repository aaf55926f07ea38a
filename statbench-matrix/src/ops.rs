//! Basic operations: multiply, transpose

use crate::error::MatrixError;
use crate::types::Matrix;

/// A (m×n) · B (n×p) → m×p
pub fn multiply(a: &Matrix, b: &Matrix) -> Result<Matrix, MatrixError> {
    if a.cols() != b.rows() {
        return Err(MatrixError::DimensionMismatch {
            left_rows: a.rows(),
            left_cols: a.cols(),
            right_rows: b.rows(),
            right_cols: b.cols(),
        });
    }
    Ok(Matrix::from_dmatrix(&a.data * &b.data))
}

pub fn transpose(a: &Matrix) -> Matrix {
    Matrix::from_dmatrix(a.data.transpose())
}

impl Matrix {
    pub fn multiply(&self, other: &Matrix) -> Result<Matrix, MatrixError> {
        multiply(self, other)
    }

    pub fn transpose(&self) -> Matrix {
        transpose(self)
    }
}
