//! statbench - statistical workbench engine
//!
//! Analyses are plugins over typed requests. The registry resolves them by
//! name, the workbench runs them concurrently and `render` turns their tables
//! into markdown.

pub mod analyses;
mod config;
mod context;
mod engine;
mod registry;
pub mod render;
mod request;
mod traits;

pub use analyses::{load_standard_analyses, standard_registry};
pub use config::{Decimals, EngineConfig, CONFIG_ENV, WORKERS_ENV};
pub use context::AnalysisContext;
pub use engine::{Job, Workbench};
pub use registry::AnalysisRegistry;
pub use request::{AnalysisOptions, AnalysisRequest};
pub use traits::{AnalysisMeta, AnalysisPlugin, ArgMeta};

use serde_json::Value as JsonValue;
use statbench_core::{ResultTable, StatError};
use std::sync::Arc;

/// Main statbench engine
pub struct Statbench {
    registry: Arc<AnalysisRegistry>,
    ctx: AnalysisContext,
}

impl Statbench {
    pub fn new(registry: AnalysisRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            ctx: AnalysisContext::default(),
        }
    }

    pub fn with_standard_library() -> Self {
        Self::new(standard_registry())
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.ctx = AnalysisContext::new(Arc::new(config));
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.ctx.config
    }

    pub fn run(&self, analysis: &str, request: &AnalysisRequest) -> Result<Vec<ResultTable>, StatError> {
        self.registry.run(analysis, request, &self.ctx)
    }

    /// Like `run`, with failures reported as an error table
    pub fn run_tables(&self, analysis: &str, request: &AnalysisRequest) -> Vec<ResultTable> {
        self.registry.run_tables(analysis, request, &self.ctx)
    }

    pub fn help(&self, name: Option<&str>) -> Result<JsonValue, StatError> {
        self.registry.help(name)
    }

    pub fn list_analyses(&self) -> Vec<AnalysisMeta> {
        self.registry.list()
    }

    /// Task pool sharing this engine's registry and configuration
    pub fn workbench(&self) -> Workbench {
        Workbench::from_shared(Arc::clone(&self.registry), Arc::clone(&self.ctx.config))
    }
}

impl Default for Statbench {
    fn default() -> Self {
        Self::with_standard_library()
    }
}
