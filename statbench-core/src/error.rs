//! Structured errors
//!
//! Every fatal condition the engine can hit is a `StatError` value with a
//! machine-readable code. Callers branch on [`StatError::kind`] to tell bad
//! input apart from a model that cannot be fitted.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Standard error codes (machine-readable)
pub mod codes {
    pub const INVALID_INPUT: &str = "INVALID_INPUT";
    pub const LENGTH_MISMATCH: &str = "LENGTH_MISMATCH";
    pub const EMPTY_SAMPLE: &str = "EMPTY_SAMPLE";
    pub const INSUFFICIENT_DATA: &str = "INSUFFICIENT_DATA";
    pub const UNKNOWN_ANALYSIS: &str = "UNKNOWN_ANALYSIS";
    pub const UNKNOWN_MODEL: &str = "UNKNOWN_MODEL";
    pub const SINGULAR_MATRIX: &str = "SINGULAR_MATRIX";
    pub const DIMENSION_MISMATCH: &str = "DIMENSION_MISMATCH";
    pub const UNSUPPORTED: &str = "UNSUPPORTED";
    pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
    pub const INTERNAL: &str = "INTERNAL";
}

/// Broad class of a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// The caller supplied unusable input
    Validation,
    /// The design matrix is rank deficient; the model cannot be fitted
    Singular,
    /// The request is well formed but outside what the engine computes
    Unsupported,
    /// Configuration could not be loaded
    Config,
    /// A bug inside the engine
    Internal,
}

/// Severity level of an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Computation continued with degraded result
    Warning,
    /// The requested computation failed
    Error,
    /// The engine cannot continue
    Fatal,
}

/// Structured error surfaced to callers
#[derive(Debug, Clone, Serialize, Deserialize, Error)]
#[error("[{code}] {message}{}", suggestion_suffix(.suggestion))]
pub struct StatError {
    /// Machine-readable error code
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Suggestion for fixing the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,

    /// Propagation notes
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub notes: Vec<String>,

    /// Severity level
    pub severity: Severity,
}

fn suggestion_suffix(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!(" (suggestion: {})", s),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, StatError>;

impl StatError {
    /// Create a new error
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            suggestion: None,
            notes: Vec::new(),
            severity: Severity::Error,
        }
    }

    /// Builder: add suggestion
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Builder: add propagation note
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Builder: set severity
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn kind(&self) -> ErrorKind {
        match self.code.as_str() {
            codes::SINGULAR_MATRIX => ErrorKind::Singular,
            codes::UNSUPPORTED => ErrorKind::Unsupported,
            codes::CONFIG_ERROR => ErrorKind::Config,
            codes::INTERNAL | codes::DIMENSION_MISMATCH => ErrorKind::Internal,
            _ => ErrorKind::Validation,
        }
    }

    pub fn is_singular(&self) -> bool {
        self.kind() == ErrorKind::Singular
    }

    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }

    // ========== Common Error Constructors ==========

    pub fn invalid_input(details: impl Into<String>) -> Self {
        Self::new(codes::INVALID_INPUT, format!("Invalid input: {}", details.into()))
    }

    pub fn length_mismatch(what: &str, expected: usize, got: usize) -> Self {
        Self::new(
            codes::LENGTH_MISMATCH,
            format!("{} has {} observations, expected {}", what, got, expected),
        )
        .with_suggestion("All variables in a paired analysis must have the same number of rows")
    }

    pub fn empty_sample(name: &str) -> Self {
        Self::new(codes::EMPTY_SAMPLE, format!("Variable '{}' has no valid values", name))
            .with_suggestion("Check that the variable is numeric and not entirely missing")
    }

    pub fn insufficient_data(n: usize, needed: usize) -> Self {
        Self::new(
            codes::INSUFFICIENT_DATA,
            format!("{} valid observations, at least {} required", n, needed),
        )
    }

    pub fn unknown_analysis(name: &str) -> Self {
        Self::new(codes::UNKNOWN_ANALYSIS, format!("Unknown analysis: {}", name))
            .with_suggestion("Use list_analyses to see what is available")
    }

    pub fn unknown_model(name: &str) -> Self {
        Self::new(codes::UNKNOWN_MODEL, format!("Unknown curve model: {}", name))
    }

    pub fn singular(details: impl Into<String>) -> Self {
        Self::new(codes::SINGULAR_MATRIX, format!("Cannot fit model: {}", details.into()))
            .with_suggestion("Remove predictors that are constant or perfectly collinear")
    }

    pub fn dimension_mismatch(details: impl Into<String>) -> Self {
        Self::new(codes::DIMENSION_MISMATCH, format!("Dimension mismatch: {}", details.into()))
    }

    pub fn unsupported(details: impl Into<String>) -> Self {
        Self::new(codes::UNSUPPORTED, format!("Unsupported: {}", details.into()))
    }

    pub fn config(details: impl Into<String>) -> Self {
        Self::new(codes::CONFIG_ERROR, format!("Configuration error: {}", details.into()))
            .with_severity(Severity::Fatal)
    }

    pub fn internal(details: impl Into<String>) -> Self {
        Self::new(codes::INTERNAL, format!("Internal error: {}", details.into()))
            .with_suggestion("This is a bug, please report it")
            .with_severity(Severity::Fatal)
    }
}
