//! Analysis requests

use serde::{Deserialize, Serialize};
use statbench_core::{Sample, StatError};
use statbench_stats::FrequencyOrder;

/// Per-request overrides of the engine defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub durbin_watson: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collinearity: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentiles: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_order: Option<FrequencyOrder>,
}

/// Variables and parameters for one analysis run.
///
/// Paired analyses read `dependent` and `independents`; univariate analyses
/// read `variables`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependent: Option<Sample>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub independents: Vec<Sample>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub variables: Vec<Sample>,
    /// Curve model names
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub models: Vec<String>,
    pub options: AnalysisOptions,
}

impl AnalysisRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dependent(mut self, sample: Sample) -> Self {
        self.dependent = Some(sample);
        self
    }

    pub fn with_independent(mut self, sample: Sample) -> Self {
        self.independents.push(sample);
        self
    }

    pub fn with_variable(mut self, sample: Sample) -> Self {
        self.variables.push(sample);
        self
    }

    pub fn with_models<S: Into<String>>(mut self, models: impl IntoIterator<Item = S>) -> Self {
        self.models.extend(models.into_iter().map(Into::into));
        self
    }

    pub fn with_options(mut self, options: AnalysisOptions) -> Self {
        self.options = options;
        self
    }

    pub fn require_dependent(&self) -> Result<&Sample, StatError> {
        self.dependent
            .as_ref()
            .ok_or_else(|| StatError::invalid_input("a dependent variable is required"))
    }

    pub fn require_independents(&self) -> Result<&[Sample], StatError> {
        if self.independents.is_empty() {
            return Err(StatError::invalid_input("at least one independent variable is required"));
        }
        Ok(&self.independents)
    }

    pub fn require_variables(&self) -> Result<&[Sample], StatError> {
        if self.variables.is_empty() {
            return Err(StatError::invalid_input("at least one variable is required"));
        }
        Ok(&self.variables)
    }
}
