//! Standard analyses
//!
//! Each analysis validates its request, calls into `statbench-stats` and lays
//! the results out as classical statistical-package tables.

mod curve;
mod descriptives;
mod frequencies;
mod regression;

pub use curve::CurveEstimationAnalysis;
pub use descriptives::DescriptivesAnalysis;
pub use frequencies::FrequenciesAnalysis;
pub use regression::LinearRegression;

use crate::registry::AnalysisRegistry;

/// Registry with every standard analysis
pub fn standard_registry() -> AnalysisRegistry {
    load_standard_analyses(AnalysisRegistry::new())
}

pub fn load_standard_analyses(registry: AnalysisRegistry) -> AnalysisRegistry {
    registry
        .with_analysis(LinearRegression)
        .with_analysis(CurveEstimationAnalysis)
        .with_analysis(DescriptivesAnalysis)
        .with_analysis(FrequenciesAnalysis)
}

/// Row header for a data value, "3" rather than "3.0"
pub(crate) fn value_label(value: f64) -> String {
    format!("{}", value)
}
