//! Matrix kernel errors

use statbench_core::StatError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatrixError {
    #[error("matrix has no rows or no columns")]
    Empty,

    #[error("row {row} has {got} columns, expected {expected}")]
    Ragged { row: usize, got: usize, expected: usize },

    #[error("cannot multiply {left_rows}x{left_cols} by {right_rows}x{right_cols}")]
    DimensionMismatch {
        left_rows: usize,
        left_cols: usize,
        right_rows: usize,
        right_cols: usize,
    },

    #[error("inversion requires a square matrix, got {rows}x{cols}")]
    NotSquare { rows: usize, cols: usize },

    /// No pivot above the threshold was found in `column`
    #[error("matrix is singular: no usable pivot in column {column}")]
    Singular { column: usize },
}

impl From<MatrixError> for StatError {
    fn from(err: MatrixError) -> Self {
        match err {
            MatrixError::Singular { .. } => StatError::singular(err.to_string()),
            MatrixError::Empty | MatrixError::Ragged { .. } => StatError::invalid_input(err.to_string()),
            MatrixError::DimensionMismatch { .. } | MatrixError::NotSquare { .. } => {
                StatError::dimension_mismatch(err.to_string())
            }
        }
    }
}
