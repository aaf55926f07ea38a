//! Dense matrix type

use crate::error::MatrixError;
use nalgebra::DMatrix;
use std::fmt;
use std::ops::Index;

/// Dense row/column matrix of f64 backed by nalgebra storage
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    pub(crate) data: DMatrix<f64>,
}

impl Matrix {
    /// Build from a list of rows. All rows must have the same length.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, MatrixError> {
        let nrows = rows.len();
        let ncols = rows.first().map_or(0, |r| r.len());
        if nrows == 0 || ncols == 0 {
            return Err(MatrixError::Empty);
        }

        for (i, row) in rows.iter().enumerate() {
            if row.len() != ncols {
                return Err(MatrixError::Ragged { row: i, got: row.len(), expected: ncols });
            }
        }

        let data = DMatrix::from_row_iterator(nrows, ncols, rows.iter().flat_map(|r| r.iter().copied()));
        Ok(Self { data })
    }

    /// Build from a list of equal-length columns
    pub fn from_columns(columns: &[Vec<f64>]) -> Result<Self, MatrixError> {
        let ncols = columns.len();
        let nrows = columns.first().map_or(0, |c| c.len());
        if nrows == 0 || ncols == 0 {
            return Err(MatrixError::Empty);
        }

        for (j, col) in columns.iter().enumerate() {
            if col.len() != nrows {
                // reported in row terms of the transposed input
                return Err(MatrixError::Ragged { row: j, got: col.len(), expected: nrows });
            }
        }

        let data = DMatrix::from_iterator(nrows, ncols, columns.iter().flat_map(|c| c.iter().copied()));
        Ok(Self { data })
    }

    /// n×1 matrix
    pub fn column_vector(values: &[f64]) -> Self {
        Self { data: DMatrix::from_column_slice(values.len(), 1, values) }
    }

    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self { data: DMatrix::zeros(rows, cols) }
    }

    pub fn identity(n: usize) -> Self {
        Self { data: DMatrix::identity(n, n) }
    }

    pub fn from_dmatrix(data: DMatrix<f64>) -> Self {
        Self { data }
    }

    pub fn as_dmatrix(&self) -> &DMatrix<f64> {
        &self.data
    }

    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    pub fn is_square(&self) -> bool {
        self.rows() == self.cols()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.data.get((row, col)).copied()
    }

    pub fn row(&self, row: usize) -> Option<Vec<f64>> {
        (row < self.rows()).then(|| self.data.row(row).iter().copied().collect())
    }

    pub fn column(&self, col: usize) -> Option<Vec<f64>> {
        (col < self.cols()).then(|| self.data.column(col).iter().copied().collect())
    }

    pub fn diagonal(&self) -> Vec<f64> {
        self.data.diagonal().iter().copied().collect()
    }

    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        (0..self.rows())
            .map(|i| self.data.row(i).iter().copied().collect())
            .collect()
    }

    /// Element-wise comparison with an absolute tolerance
    pub fn approx_eq(&self, other: &Matrix, tolerance: f64) -> bool {
        self.data.shape() == other.data.shape()
            && self
                .data
                .iter()
                .zip(other.data.iter())
                .all(|(a, b)| (a - b).abs() <= tolerance)
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, index: (usize, usize)) -> &f64 {
        &self.data[index]
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for i in 0..self.rows() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "[")?;
            for j in 0..self.cols() {
                if j > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{:.4}", self.data[(i, j)])?;
            }
            write!(f, "]")?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_creation() {
        let m = Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(m.rows(), 2);
        assert_eq!(m.cols(), 2);
        assert!(m.is_square());
        assert_eq!(m[(0, 1)], 2.0);
        assert_eq!(m.get(1, 0), Some(3.0));
        assert_eq!(m.get(2, 2), None);
    }

    #[test]
    fn test_from_columns_matches_rows() {
        let by_cols = Matrix::from_columns(&[vec![1.0, 1.0, 1.0], vec![1.0, 2.0, 3.0]]).unwrap();
        let by_rows = Matrix::from_rows(vec![vec![1.0, 1.0], vec![1.0, 2.0], vec![1.0, 3.0]]).unwrap();
        assert_eq!(by_cols, by_rows);
        assert_eq!(by_cols.column(1), Some(vec![1.0, 2.0, 3.0]));
        assert_eq!(by_cols.row(2), Some(vec![1.0, 3.0]));
    }

    #[test]
    fn test_ragged_and_empty_rejected() {
        assert_eq!(Matrix::from_rows(vec![]), Err(MatrixError::Empty));
        assert_eq!(
            Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0]]),
            Err(MatrixError::Ragged { row: 1, got: 1, expected: 2 })
        );
    }

    #[test]
    fn test_display() {
        let m = Matrix::from_rows(vec![vec![1.0, 0.5]]).unwrap();
        assert_eq!(m.to_string(), "[[1.0000, 0.5000]]");
    }
}
