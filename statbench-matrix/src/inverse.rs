//! Gauss–Jordan inversion with partial pivoting

use crate::error::MatrixError;
use crate::types::Matrix;
use nalgebra::DMatrix;

/// Smallest pivot accepted, relative to the largest entry magnitude of the input
pub const PIVOT_EPSILON: f64 = 1e-10;

/// Invert a square matrix.
///
/// For each column the largest-magnitude entry at or below the diagonal is
/// swapped into the pivot position, the pivot row is normalised, and the
/// column is eliminated from every other row. The same row operations applied
/// to the identity yield the inverse. A pivot smaller than `PIVOT_EPSILON`
/// times the largest entry magnitude marks the matrix singular, so the test
/// does not depend on the units of the entries.
pub fn invert(a: &Matrix) -> Result<Matrix, MatrixError> {
    if !a.is_square() {
        return Err(MatrixError::NotSquare { rows: a.rows(), cols: a.cols() });
    }

    let n = a.rows();
    let scale = a.data.iter().fold(0.0f64, |acc, v| acc.max(v.abs()));
    if n > 0 && !(scale > 0.0 && scale.is_finite()) {
        return Err(MatrixError::Singular { column: 0 });
    }
    let threshold = PIVOT_EPSILON * scale;
    let mut work = a.data.clone();
    let mut inv = DMatrix::<f64>::identity(n, n);

    for col in 0..n {
        let mut pivot_row = col;
        let mut best = work[(col, col)].abs();
        for r in (col + 1)..n {
            let candidate = work[(r, col)].abs();
            if candidate > best {
                best = candidate;
                pivot_row = r;
            }
        }

        // NaN fails this comparison too
        if !(best >= threshold) {
            return Err(MatrixError::Singular { column: col });
        }

        if pivot_row != col {
            work.swap_rows(col, pivot_row);
            inv.swap_rows(col, pivot_row);
        }

        let pivot = work[(col, col)];
        for j in 0..n {
            work[(col, j)] /= pivot;
            inv[(col, j)] /= pivot;
        }

        for r in 0..n {
            if r == col {
                continue;
            }
            let factor = work[(r, col)];
            if factor == 0.0 {
                continue;
            }
            for j in 0..n {
                let w = work[(col, j)];
                let v = inv[(col, j)];
                work[(r, j)] -= factor * w;
                inv[(r, j)] -= factor * v;
            }
        }
    }

    Ok(Matrix::from_dmatrix(inv))
}

impl Matrix {
    pub fn invert(&self) -> Result<Matrix, MatrixError> {
        invert(self)
    }
}
