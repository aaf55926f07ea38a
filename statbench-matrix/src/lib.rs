//! statbench matrix - dense linear algebra kernel
//!
//! Provides only what the model fitters need:
//! - Matrix construction (from rows, from columns, zeros, identity)
//! - Multiply and transpose
//! - Gauss–Jordan inversion with partial pivoting
//!
//! Singular input is reported as `MatrixError::Singular`, never as a matrix
//! full of NaN.

mod error;
mod inverse;
mod ops;
mod types;

pub use error::MatrixError;
pub use inverse::{invert, PIVOT_EPSILON};
pub use ops::{multiply, transpose};
pub use types::Matrix;
