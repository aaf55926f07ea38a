//! Task pool
//!
//! Analyses are synchronous and CPU-bound. `Workbench` runs each job on a
//! tokio blocking thread, at most `workers` at a time, and hands back the
//! tables in submission order.

use crate::config::EngineConfig;
use crate::context::AnalysisContext;
use crate::registry::AnalysisRegistry;
use crate::request::AnalysisRequest;
use serde::{Deserialize, Serialize};
use statbench_core::{ResultTable, StatError};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, error};

/// One analysis to run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub analysis: String,
    #[serde(default)]
    pub request: AnalysisRequest,
}

impl Job {
    pub fn new(analysis: impl Into<String>, request: AnalysisRequest) -> Self {
        Self { analysis: analysis.into(), request }
    }
}

#[derive(Clone)]
pub struct Workbench {
    registry: Arc<AnalysisRegistry>,
    ctx: AnalysisContext,
    permits: Arc<Semaphore>,
}

impl Workbench {
    pub fn new(registry: AnalysisRegistry, config: EngineConfig) -> Self {
        Self::from_shared(Arc::new(registry), Arc::new(config))
    }

    pub fn from_shared(registry: Arc<AnalysisRegistry>, config: Arc<EngineConfig>) -> Self {
        let permits = Arc::new(Semaphore::new(config.workers.max(1)));
        Self { registry, ctx: AnalysisContext::new(config), permits }
    }

    pub fn registry(&self) -> &AnalysisRegistry {
        &self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.ctx.config
    }

    /// Run one job. Failures, panics included, come back as error tables.
    pub async fn run(&self, job: Job) -> Vec<ResultTable> {
        let permit = match self.permits.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(e) => return failed(&job.analysis, StatError::internal(e.to_string())),
        };

        let registry = Arc::clone(&self.registry);
        let ctx = self.ctx.clone();
        let name = job.analysis.clone();
        debug!(analysis = %name, "job dispatched");

        let handle = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            registry.run_tables(&job.analysis, &job.request, &ctx)
        });

        match handle.await {
            Ok(tables) => tables,
            Err(e) => {
                error!(analysis = %name, error = %e, "job panicked");
                failed(&name, StatError::internal(format!("analysis '{}' aborted: {}", name, e)))
            }
        }
    }

    /// Run jobs concurrently; results keep the order of `jobs`
    pub async fn run_batch(&self, jobs: Vec<Job>) -> Vec<Vec<ResultTable>> {
        let handles: Vec<_> = jobs
            .into_iter()
            .map(|job| {
                let bench = self.clone();
                let name = job.analysis.clone();
                (name, tokio::spawn(async move { bench.run(job).await }))
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for (name, handle) in handles {
            results.push(match handle.await {
                Ok(tables) => tables,
                Err(e) => failed(&name, StatError::internal(e.to_string())),
            });
        }
        results
    }
}

fn failed(analysis: &str, err: StatError) -> Vec<ResultTable> {
    vec![ResultTable::error(analysis, &err)]
}
