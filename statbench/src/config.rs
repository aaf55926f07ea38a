//! Engine configuration
//!
//! Loaded once at startup and shared read-only by every analysis.

use serde::{Deserialize, Serialize};
use statbench_core::StatError;
use statbench_stats::{FrequencyOrder, DEFAULT_PERCENTILES};
use std::fs;

/// Path of an optional JSON config file
pub const CONFIG_ENV: &str = "STATBENCH_CONFIG";

/// Overrides `workers`
pub const WORKERS_ENV: &str = "STATBENCH_WORKERS";

const MAX_DECIMALS: u32 = 15;

/// Display precision per kind of value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Decimals {
    pub statistic: u32,
    pub std_error_estimate: u32,
    pub percent: u32,
}

impl Default for Decimals {
    fn default() -> Self {
        Self { statistic: 3, std_error_estimate: 5, percent: 3 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub decimals: Decimals,
    /// Default cut points for the frequencies analysis
    pub percentiles: Vec<f64>,
    pub frequency_order: FrequencyOrder,
    /// Concurrent analyses in a batch
    pub workers: usize,
    /// Add Durbin-Watson to the Model Summary unless a request says otherwise
    pub durbin_watson: bool,
    /// Add Collinearity Diagnostics unless a request says otherwise
    pub collinearity: bool,
}

fn default_workers() -> usize {
    std::thread::available_parallelism().map_or(1, |n| n.get())
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            decimals: Decimals::default(),
            percentiles: DEFAULT_PERCENTILES.to_vec(),
            frequency_order: FrequencyOrder::default(),
            workers: default_workers(),
            durbin_watson: false,
            collinearity: false,
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self, StatError> {
        let config: EngineConfig =
            serde_json::from_str(json).map_err(|e| StatError::config(format!("invalid config JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Configuration from the process environment
    pub fn from_env() -> Result<Self, StatError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Configuration from an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, StatError> {
        let mut config = match lookup(CONFIG_ENV) {
            Some(path) => {
                let json = fs::read_to_string(&path)
                    .map_err(|e| StatError::config(format!("cannot read {}: {}", path, e)))?;
                Self::from_json(&json)?
            }
            None => Self::default(),
        };

        if let Some(raw) = lookup(WORKERS_ENV) {
            config.workers = raw
                .trim()
                .parse()
                .map_err(|_| StatError::config(format!("{} must be a positive integer, got '{}'", WORKERS_ENV, raw)))?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), StatError> {
        if self.workers == 0 {
            return Err(StatError::config("workers must be at least 1"));
        }
        if let Some(p) = self.percentiles.iter().find(|p| !(0.0..=100.0).contains(*p)) {
            return Err(StatError::config(format!("percentile {} is outside [0, 100]", p)));
        }
        let d = &self.decimals;
        if d.statistic.max(d.std_error_estimate).max(d.percent) > MAX_DECIMALS {
            return Err(StatError::config(format!("decimals may not exceed {}", MAX_DECIMALS)));
        }
        Ok(())
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use statbench_core::codes;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let c = EngineConfig::default();
        assert_eq!(c.decimals, Decimals { statistic: 3, std_error_estimate: 5, percent: 3 });
        assert_eq!(c.percentiles.len(), 11);
        assert_eq!(c.frequency_order, FrequencyOrder::FirstSeen);
        assert!(c.workers >= 1);
        assert!(!c.durbin_watson);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let c = EngineConfig::from_json(r#"{"decimals": {"statistic": 2}, "durbin_watson": true}"#).unwrap();
        assert_eq!(c.decimals.statistic, 2);
        assert_eq!(c.decimals.std_error_estimate, 5);
        assert!(c.durbin_watson);
        assert_eq!(c.percentiles, DEFAULT_PERCENTILES.to_vec());

        let c = EngineConfig::from_json(r#"{"frequency_order": "ascending"}"#).unwrap();
        assert_eq!(c.frequency_order, FrequencyOrder::Ascending);
    }

    #[test]
    fn test_invalid_config_is_config_error() {
        for json in [
            r#"{"workers": 0}"#,
            r#"{"percentiles": [50, 120]}"#,
            r#"{"unknown": 1}"#,
            r#"{"decimals": {"statistic": 40}}"#,
            "not json",
        ] {
            let err = EngineConfig::from_json(json).unwrap_err();
            assert_eq!(err.code, codes::CONFIG_ERROR, "{}", json);
        }
    }

    #[test]
    fn test_workers_override() {
        let vars: HashMap<&str, &str> = [(WORKERS_ENV, "3")].into_iter().collect();
        let c = EngineConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(c.workers, 3);

        let err = EngineConfig::from_lookup(|k| (k == WORKERS_ENV).then(|| "many".to_string())).unwrap_err();
        assert_eq!(err.code, codes::CONFIG_ERROR);
    }

    #[test]
    fn test_missing_config_file() {
        let err = EngineConfig::from_lookup(|k| (k == CONFIG_ENV).then(|| "/nonexistent/statbench.json".to_string()))
            .unwrap_err();
        assert_eq!(err.code, codes::CONFIG_ERROR);
    }
}
