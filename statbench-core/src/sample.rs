//! Input model: cells and samples
//!
//! Grid cells arrive as numbers, blanks or unparsed strings. They are
//! resolved once into a `Sample`, after which numeric code only sees
//! `Option<f64>`.

use crate::error::{Result, StatError};
use serde::{Deserialize, Serialize};

/// One raw observation as supplied by the data grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Missing,
    Raw(String),
}

impl Cell {
    /// Resolve to a usable numeric value. Non-finite numbers and strings that
    /// do not parse are treated as missing.
    pub fn resolve(&self) -> Option<f64> {
        match self {
            Cell::Number(v) if v.is_finite() => Some(*v),
            Cell::Number(_) | Cell::Missing => None,
            Cell::Raw(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        }
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Number(v)
    }
}

impl From<Option<f64>> for Cell {
    fn from(v: Option<f64>) -> Self {
        v.map_or(Cell::Missing, Cell::Number)
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Raw(s.to_string())
    }
}

#[derive(Deserialize)]
struct SampleInput {
    name: String,
    values: Vec<Cell>,
}

impl From<SampleInput> for Sample {
    fn from(input: SampleInput) -> Self {
        Sample::new(input.name, input.values)
    }
}

/// Ordered observations for one variable, with missing values marked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "SampleInput")]
pub struct Sample {
    name: String,
    values: Vec<Option<f64>>,
}

impl Sample {
    pub fn new<C: Into<Cell>>(name: impl Into<String>, cells: impl IntoIterator<Item = C>) -> Self {
        Self {
            name: name.into(),
            values: cells.into_iter().map(|c| c.into().resolve()).collect(),
        }
    }

    /// Sample without missing values
    pub fn from_values(name: impl Into<String>, values: &[f64]) -> Self {
        Self::new(name, values.iter().copied())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Total number of observations, missing included
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied().flatten()
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    /// Valid values in observation order
    pub fn valid(&self) -> Vec<f64> {
        self.values.iter().flatten().copied().collect()
    }

    pub fn valid_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    pub fn missing_count(&self) -> usize {
        self.len() - self.valid_count()
    }
}

/// Align several samples for a paired analysis.
///
/// All samples must have the same length. Rows where any sample is missing
/// are dropped; the remaining rows keep their original order. Returns one
/// column per input sample.
pub fn complete_cases(samples: &[&Sample]) -> Result<Vec<Vec<f64>>> {
    let first = match samples.first() {
        Some(s) => s,
        None => return Err(StatError::invalid_input("no variables supplied")),
    };

    let n = first.len();
    for s in &samples[1..] {
        if s.len() != n {
            return Err(StatError::length_mismatch(s.name(), n, s.len()));
        }
    }

    let mut columns: Vec<Vec<f64>> = vec![Vec::with_capacity(n); samples.len()];
    for row in 0..n {
        let cells: Option<Vec<f64>> = samples.iter().map(|s| s.get(row)).collect();
        if let Some(cells) = cells {
            for (column, v) in columns.iter_mut().zip(cells) {
                column.push(v);
            }
        }
    }

    Ok(columns)
}
