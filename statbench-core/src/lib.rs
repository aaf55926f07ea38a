//! statbench core - fundamental types
//!
//! This crate provides the types shared by every statbench crate:
//! - `Sample`: one variable's observations with missing values resolved
//! - `ResultTable`: hierarchical table description returned by analyses
//! - `StatError`: structured errors

mod error;
mod sample;
mod table;

pub use error::{codes, ErrorKind, Result, Severity, StatError};
pub use sample::{complete_cases, Cell, Sample};
pub use table::{round_to, ColumnHeader, GroupRow, LeafRow, ResultRow, ResultTable, TableValue};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::codes;
    pub use crate::{
        ColumnHeader, LeafRow, Result, ResultRow, ResultTable, Sample, Severity, StatError, TableValue,
    };
}
