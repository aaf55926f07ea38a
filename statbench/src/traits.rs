//! Analysis plugin traits

use crate::context::AnalysisContext;
use crate::request::AnalysisRequest;
use serde::Serialize;
use statbench_core::{ResultTable, StatError};

/// Metadata about a request field an analysis reads
#[derive(Debug, Clone, Serialize)]
pub struct ArgMeta {
    pub name: &'static str,
    pub typ: &'static str,
    pub description: &'static str,
    pub optional: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<&'static str>,
}

impl ArgMeta {
    pub const fn required(name: &'static str, typ: &'static str, description: &'static str) -> Self {
        Self { name, typ, description, optional: false, default: None }
    }

    pub const fn optional(name: &'static str, typ: &'static str, description: &'static str, default: &'static str) -> Self {
        Self { name, typ, description, optional: true, default: Some(default) }
    }
}

/// Metadata for an analysis plugin
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisMeta {
    pub name: &'static str,
    /// Display title, also used for error tables
    pub title: &'static str,
    pub description: &'static str,
    pub args: &'static [ArgMeta],
    /// Titles of the tables produced, in order
    pub tables: &'static [&'static str],
    pub category: &'static str,
    pub related: &'static [&'static str],
}

/// Pure analysis over the samples of one request
pub trait AnalysisPlugin: Send + Sync {
    fn meta(&self) -> AnalysisMeta;
    fn run(&self, request: &AnalysisRequest, ctx: &AnalysisContext) -> Result<Vec<ResultTable>, StatError>;
}
