//! Result tables
//!
//! Every analysis returns one or more `ResultTable`s. Column headers and rows
//! are both recursive: a group header spans its children and owns no data
//! column, a group row holds child rows and owns no values. Renderers walk the
//! two trees; nothing here knows about HTML or PDF.

use crate::error::{Result, StatError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// Round to a fixed number of decimals. Negative zero is normalised.
/// Values too large to scale are returned unchanged.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    let scaled = value * factor;
    if !scaled.is_finite() {
        return value;
    }
    let rounded = scaled.round() / factor;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// A single table cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum TableValue {
    /// Rounded number that keeps its display precision
    Number { value: f64, decimals: u32 },
    Integer(i64),
    Text(String),
    Empty,
}

impl TableValue {
    /// Round `value` to `decimals`. Non-finite values become `Empty`.
    pub fn number(value: f64, decimals: u32) -> Self {
        if value.is_finite() {
            TableValue::Number { value: round_to(value, decimals), decimals }
        } else {
            TableValue::Empty
        }
    }

    pub fn integer(value: usize) -> Self {
        TableValue::Integer(value as i64)
    }

    pub fn text(value: impl Into<String>) -> Self {
        TableValue::Text(value.into())
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            TableValue::Number { value, .. } => Some(*value),
            TableValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, TableValue::Empty)
    }
}

impl fmt::Display for TableValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableValue::Number { value, decimals } => write!(f, "{:.*}", *decimals as usize, value),
            TableValue::Integer(i) => write!(f, "{}", i),
            TableValue::Text(s) => write!(f, "{}", s),
            TableValue::Empty => Ok(()),
        }
    }
}

/// Column header: a keyed leaf, or a group spanning child headers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ColumnHeader {
    Leaf { key: String, label: String },
    Group { label: String, children: Vec<ColumnHeader> },
}

impl ColumnHeader {
    pub fn leaf(key: impl Into<String>, label: impl Into<String>) -> Self {
        ColumnHeader::Leaf { key: key.into(), label: label.into() }
    }

    pub fn group(label: impl Into<String>, children: Vec<ColumnHeader>) -> Self {
        ColumnHeader::Group { label: label.into(), children }
    }

    pub fn label(&self) -> &str {
        match self {
            ColumnHeader::Leaf { label, .. } | ColumnHeader::Group { label, .. } => label,
        }
    }

    /// Number of data columns this header spans
    pub fn span(&self) -> usize {
        match self {
            ColumnHeader::Leaf { .. } => 1,
            ColumnHeader::Group { children, .. } => children.iter().map(|c| c.span()).sum(),
        }
    }

    /// Header nesting depth (a leaf is 1)
    pub fn depth(&self) -> usize {
        match self {
            ColumnHeader::Leaf { .. } => 1,
            ColumnHeader::Group { children, .. } => {
                1 + children.iter().map(|c| c.depth()).max().unwrap_or(0)
            }
        }
    }

    fn collect_leaves<'a>(&'a self, path: &mut Vec<&'a str>, out: &mut Vec<(Vec<&'a str>, &'a str)>) {
        match self {
            ColumnHeader::Leaf { key, label } => {
                path.push(label);
                out.push((path.clone(), key.as_str()));
                path.pop();
            }
            ColumnHeader::Group { label, children } => {
                path.push(label);
                for child in children {
                    child.collect_leaves(path, out);
                }
                path.pop();
            }
        }
    }
}

/// Row holding values keyed by leaf column key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeafRow {
    pub header: String,
    pub values: BTreeMap<String, TableValue>,
}

impl LeafRow {
    pub fn new(header: impl Into<String>) -> Self {
        Self { header: header.into(), values: BTreeMap::new() }
    }

    pub fn with(mut self, key: &str, value: TableValue) -> Self {
        self.values.insert(key.to_string(), value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&TableValue> {
        self.values.get(key)
    }
}

/// Row group, rendered as a spanning row header over its children
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupRow {
    pub header: String,
    pub children: Vec<ResultRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ResultRow {
    Leaf(LeafRow),
    Group(GroupRow),
}

impl ResultRow {
    pub fn group(header: impl Into<String>, children: Vec<ResultRow>) -> Self {
        ResultRow::Group(GroupRow { header: header.into(), children })
    }

    pub fn header(&self) -> &str {
        match self {
            ResultRow::Leaf(r) => &r.header,
            ResultRow::Group(g) => &g.header,
        }
    }

    fn collect_leaves<'a>(&'a self, path: &mut Vec<&'a str>, out: &mut Vec<(Vec<&'a str>, &'a LeafRow)>) {
        match self {
            ResultRow::Leaf(row) => {
                path.push(&row.header);
                out.push((path.clone(), row));
                path.pop();
            }
            ResultRow::Group(group) => {
                path.push(&group.header);
                for child in &group.children {
                    child.collect_leaves(path, out);
                }
                path.pop();
            }
        }
    }
}

impl From<LeafRow> for ResultRow {
    fn from(row: LeafRow) -> Self {
        ResultRow::Leaf(row)
    }
}

/// A titled, hierarchical result table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultTable {
    pub title: String,
    pub columns: Vec<ColumnHeader>,
    pub rows: Vec<ResultRow>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub footnotes: Vec<String>,
}

impl ResultTable {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            columns: Vec::new(),
            rows: Vec::new(),
            footnotes: Vec::new(),
        }
    }

    pub fn with_columns(mut self, columns: Vec<ColumnHeader>) -> Self {
        self.columns = columns;
        self
    }

    pub fn with_footnote(mut self, note: impl Into<String>) -> Self {
        self.footnotes.push(note.into());
        self
    }

    pub fn push_row(&mut self, row: impl Into<ResultRow>) {
        self.rows.push(row.into());
    }

    /// Single-row table explaining why an analysis produced no output
    pub fn error(title: impl Into<String>, err: &StatError) -> Self {
        let mut table = Self::new(title).with_columns(vec![
            ColumnHeader::leaf("code", "Code"),
            ColumnHeader::leaf("message", "Message"),
        ]);
        table.push_row(
            LeafRow::new("Error")
                .with("code", TableValue::text(err.code.clone()))
                .with("message", TableValue::text(err.message.clone())),
        );
        if let Some(ref suggestion) = err.suggestion {
            table.footnotes.push(suggestion.clone());
        }
        table
    }

    /// Code of a table built by `ResultTable::error`
    pub fn error_code(&self) -> Option<&str> {
        if self.leaf_keys() != ["code", "message"] {
            return None;
        }
        match self.value(&["Error"], "code") {
            Some(TableValue::Text(code)) => Some(code.as_str()),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.error_code().is_some()
    }

    /// Leaf columns in display order, each with its label path and key
    pub fn leaf_columns(&self) -> Vec<(Vec<&str>, &str)> {
        let mut out = Vec::new();
        let mut path = Vec::new();
        for column in &self.columns {
            column.collect_leaves(&mut path, &mut out);
        }
        out
    }

    pub fn leaf_keys(&self) -> Vec<&str> {
        self.leaf_columns().into_iter().map(|(_, key)| key).collect()
    }

    /// Leaf rows in display order, each with its row-header path
    pub fn leaf_rows(&self) -> Vec<(Vec<&str>, &LeafRow)> {
        let mut out = Vec::new();
        let mut path = Vec::new();
        for row in &self.rows {
            row.collect_leaves(&mut path, &mut out);
        }
        out
    }

    /// Find a leaf row by its full header path, e.g. `["1", "Residual"]`
    pub fn row(&self, path: &[&str]) -> Option<&LeafRow> {
        self.leaf_rows()
            .into_iter()
            .find(|(p, _)| p.as_slice() == path)
            .map(|(_, row)| row)
    }

    pub fn value(&self, path: &[&str], key: &str) -> Option<&TableValue> {
        self.row(path).and_then(|row| row.get(key))
    }

    /// Check that leaf keys are unique and that rows address only those keys
    pub fn validate(&self) -> Result<()> {
        let keys = self.leaf_keys();
        let mut seen = HashSet::new();
        for key in &keys {
            if !seen.insert(*key) {
                return Err(StatError::internal(format!(
                    "table '{}' has duplicate column key '{}'",
                    self.title, key
                )));
            }
        }

        for (path, row) in self.leaf_rows() {
            for key in row.values.keys() {
                if !seen.contains(key.as_str()) {
                    return Err(StatError::internal(format!(
                        "table '{}' row '{}' addresses unknown column '{}'",
                        self.title,
                        path.join(" / "),
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}
