//! Frequency tables over the distinct valid values of a sample

use serde::{Deserialize, Serialize};
use statbench_core::Sample;
use std::collections::HashMap;

/// Order of the value rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrequencyOrder {
    #[default]
    FirstSeen,
    Ascending,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyRow {
    /// None marks the Total row
    pub value: Option<f64>,
    pub frequency: usize,
    /// Percent of valid observations
    pub percent: f64,
    pub cumulative_percent: Option<f64>,
}

impl FrequencyRow {
    pub fn is_total(&self) -> bool {
        self.value.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyTable {
    pub variable: String,
    pub valid: usize,
    pub missing: usize,
    /// Value rows followed by the Total row
    pub rows: Vec<FrequencyRow>,
}

impl FrequencyTable {
    pub fn tabulate(sample: &Sample, order: FrequencyOrder) -> Self {
        let mut counts: Vec<(f64, usize)> = Vec::new();
        let mut index: HashMap<u64, usize> = HashMap::new();

        for value in sample.valid() {
            // -0.0 and 0.0 share a bucket
            let value = if value == 0.0 { 0.0 } else { value };
            match index.get(&value.to_bits()) {
                Some(&i) => counts[i].1 += 1,
                None => {
                    index.insert(value.to_bits(), counts.len());
                    counts.push((value, 1));
                }
            }
        }

        if order == FrequencyOrder::Ascending {
            counts.sort_by(|a, b| a.0.total_cmp(&b.0));
        }

        let valid: usize = counts.iter().map(|(_, c)| c).sum();
        let percent_of = |count: usize| {
            if valid == 0 {
                0.0
            } else {
                count as f64 / valid as f64 * 100.0
            }
        };

        let mut cumulative = 0;
        let mut rows: Vec<FrequencyRow> = counts
            .iter()
            .map(|&(value, frequency)| {
                cumulative += frequency;
                FrequencyRow {
                    value: Some(value),
                    frequency,
                    percent: percent_of(frequency),
                    cumulative_percent: Some(percent_of(cumulative)),
                }
            })
            .collect();

        rows.push(FrequencyRow {
            value: None,
            frequency: valid,
            percent: if valid == 0 { 0.0 } else { 100.0 },
            cumulative_percent: None,
        });

        FrequencyTable {
            variable: sample.name().to_string(),
            valid,
            missing: sample.missing_count(),
            rows,
        }
    }

    /// Rows for distinct values, without Total
    pub fn value_rows(&self) -> &[FrequencyRow] {
        &self.rows[..self.rows.len() - 1]
    }

    pub fn total(&self) -> &FrequencyRow {
        &self.rows[self.rows.len() - 1]
    }

    pub fn frequency_of(&self, value: f64) -> usize {
        self.value_rows()
            .iter()
            .find(|r| r.value == Some(value))
            .map_or(0, |r| r.frequency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    #[test]
    fn test_first_seen_order() {
        let s = Sample::from_values("v", &[3.0, 1.0, 3.0, 2.0, 1.0, 3.0]);
        let t = FrequencyTable::tabulate(&s, FrequencyOrder::FirstSeen);
        let values: Vec<f64> = t.value_rows().iter().filter_map(|r| r.value).collect();
        assert_eq!(values, vec![3.0, 1.0, 2.0]);
        assert_eq!(t.frequency_of(3.0), 3);
        assert_abs_diff_eq!(t.value_rows()[0].percent, 50.0, epsilon = 1e-12);
        assert_abs_diff_eq!(t.value_rows()[1].cumulative_percent.unwrap(), 100.0 * 5.0 / 6.0, epsilon = 1e-12);
        assert!(t.total().is_total());
        assert_eq!(t.total().frequency, 6);
        assert_eq!(t.total().cumulative_percent, None);
    }

    #[test]
    fn test_ascending_order() {
        let s = Sample::from_values("v", &[3.0, 1.0, 3.0, 2.0]);
        let t = FrequencyTable::tabulate(&s, FrequencyOrder::Ascending);
        let values: Vec<f64> = t.value_rows().iter().filter_map(|r| r.value).collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_missing_excluded_from_percent() {
        let s = Sample::new("v", vec![Some(1.0), None, Some(1.0), Some(2.0), None]);
        let t = FrequencyTable::tabulate(&s, FrequencyOrder::FirstSeen);
        assert_eq!((t.valid, t.missing), (3, 2));
        assert_abs_diff_eq!(t.value_rows()[0].percent, 200.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_negative_zero_groups_with_zero() {
        let s = Sample::from_values("v", &[0.0, -0.0, 1.0]);
        let t = FrequencyTable::tabulate(&s, FrequencyOrder::FirstSeen);
        assert_eq!(t.value_rows().len(), 2);
        assert_eq!(t.frequency_of(0.0), 2);
    }

    #[test]
    fn test_all_missing() {
        let s = Sample::new("v", vec![None::<f64>, None]);
        let t = FrequencyTable::tabulate(&s, FrequencyOrder::FirstSeen);
        assert!(t.value_rows().is_empty());
        assert_eq!(t.total().frequency, 0);
        assert_eq!(t.missing, 2);
    }

    proptest! {
        #[test]
        fn prop_percents_sum_to_100(values in prop::collection::vec(0i32..6, 1..50)) {
            let values: Vec<f64> = values.into_iter().map(f64::from).collect();
            let t = FrequencyTable::tabulate(&Sample::from_values("v", &values), FrequencyOrder::FirstSeen);

            let total: f64 = t.value_rows().iter().map(|r| r.percent).sum();
            prop_assert!((total - 100.0).abs() < 1e-9);

            let cumulative: Vec<f64> = t.value_rows().iter().filter_map(|r| r.cumulative_percent).collect();
            prop_assert!(cumulative.windows(2).all(|w| w[1] >= w[0]));
            prop_assert!((cumulative[cumulative.len() - 1] - 100.0).abs() < 1e-9);
        }
    }
}
