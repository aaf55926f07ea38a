//! statbench statistics
//!
//! Numeric routines behind the analyses: special functions for significance,
//! least-squares fits and curve estimation, ANOVA, descriptive and frequency
//! statistics, and collinearity diagnostics.
//! Degenerate numerics fall back to NaN; invalid input is a `StatError`.

mod helpers;

pub mod anova;
pub mod collinearity;
pub mod curve;
pub mod descriptive;
pub mod frequency;
pub mod regression;
pub mod special;

pub use anova::{durbin_watson, Anova, AnovaRow, ModelSummary};
pub use collinearity::{collinearity_diagnostics, CollinearityDiagnostics, CollinearityDimension};
pub use curve::{estimate_curves, CurveEstimation, CurveFit, CurveModel, SkippedModel};
pub use descriptive::{Descriptives, Percentile, DEFAULT_PERCENTILES};
pub use frequency::{FrequencyOrder, FrequencyRow, FrequencyTable};
pub use regression::{fit_ols, fit_simple, Coefficient, FitMethod, FitResult, CONSTANT};
