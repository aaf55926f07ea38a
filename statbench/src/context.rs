//! Analysis context

use crate::config::EngineConfig;
use crate::request::AnalysisRequest;
use statbench_core::TableValue;
use statbench_stats::FrequencyOrder;
use std::sync::Arc;

/// Read-only state passed to every analysis
#[derive(Debug, Clone)]
pub struct AnalysisContext {
    pub config: Arc<EngineConfig>,
}

impl AnalysisContext {
    pub fn new(config: Arc<EngineConfig>) -> Self {
        Self { config }
    }

    /// A statistic at the configured precision
    pub fn stat(&self, value: f64) -> TableValue {
        TableValue::number(value, self.config.decimals.statistic)
    }

    pub fn std_error_estimate(&self, value: f64) -> TableValue {
        TableValue::number(value, self.config.decimals.std_error_estimate)
    }

    pub fn percent(&self, value: f64) -> TableValue {
        TableValue::number(value, self.config.decimals.percent)
    }

    pub fn optional_stat(&self, value: Option<f64>) -> TableValue {
        value.map_or(TableValue::Empty, |v| self.stat(v))
    }

    pub fn durbin_watson(&self, request: &AnalysisRequest) -> bool {
        request.options.durbin_watson.unwrap_or(self.config.durbin_watson)
    }

    pub fn collinearity(&self, request: &AnalysisRequest) -> bool {
        request.options.collinearity.unwrap_or(self.config.collinearity)
    }

    pub fn percentiles<'a>(&'a self, request: &'a AnalysisRequest) -> &'a [f64] {
        request.options.percentiles.as_deref().unwrap_or(&self.config.percentiles)
    }

    pub fn frequency_order(&self, request: &AnalysisRequest) -> FrequencyOrder {
        request.options.frequency_order.unwrap_or(self.config.frequency_order)
    }
}

impl Default for AnalysisContext {
    fn default() -> Self {
        Self::new(Arc::new(EngineConfig::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::AnalysisOptions;

    #[test]
    fn test_request_overrides_config() {
        let ctx = AnalysisContext::default();
        let plain = AnalysisRequest::new();
        assert!(!ctx.durbin_watson(&plain));
        assert_eq!(ctx.percentiles(&plain).len(), 11);

        let req = AnalysisRequest::new().with_options(AnalysisOptions {
            durbin_watson: Some(true),
            percentiles: Some(vec![50.0]),
            frequency_order: Some(FrequencyOrder::Ascending),
            ..Default::default()
        });
        assert!(ctx.durbin_watson(&req));
        assert_eq!(ctx.percentiles(&req), &[50.0]);
        assert_eq!(ctx.frequency_order(&req), FrequencyOrder::Ascending);
    }

    #[test]
    fn test_value_precision() {
        let ctx = AnalysisContext::default();
        assert_eq!(ctx.stat(0.123456).to_string(), "0.123");
        assert_eq!(ctx.std_error_estimate(0.894427191).to_string(), "0.89443");
        assert!(ctx.stat(f64::NAN).is_empty());
        assert!(ctx.optional_stat(None).is_empty());
    }
}
