//! Analysis Registry

use crate::context::AnalysisContext;
use crate::request::AnalysisRequest;
use crate::traits::{AnalysisMeta, AnalysisPlugin};
use serde_json::{json, Value as JsonValue};
use statbench_core::{ResultTable, StatError};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Central analysis registry
pub struct AnalysisRegistry {
    analyses: HashMap<String, Arc<dyn AnalysisPlugin>>,
}

impl AnalysisRegistry {
    pub fn new() -> Self {
        Self { analyses: HashMap::new() }
    }

    pub fn with_analysis<A: AnalysisPlugin + 'static>(mut self, a: A) -> Self {
        let name = a.meta().name.to_lowercase();
        self.analyses.insert(name, Arc::new(a));
        self
    }

    pub fn get(&self, name: &str) -> Option<&dyn AnalysisPlugin> {
        self.analyses.get(&name.to_lowercase()).map(|a| a.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.analyses.contains_key(&name.to_lowercase())
    }

    /// Run an analysis by name
    pub fn run(&self, name: &str, request: &AnalysisRequest, ctx: &AnalysisContext) -> Result<Vec<ResultTable>, StatError> {
        let analysis = self.get(name).ok_or_else(|| self.unknown(name))?;

        let started = Instant::now();
        let result = analysis.run(request, ctx);
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        match &result {
            Ok(tables) => info!(analysis = name, tables = tables.len(), elapsed_ms, "analysis complete"),
            Err(e) => warn!(analysis = name, code = %e.code, elapsed_ms, "analysis failed"),
        }
        result
    }

    /// Run an analysis, turning a failure into a single explanatory table
    pub fn run_tables(&self, name: &str, request: &AnalysisRequest, ctx: &AnalysisContext) -> Vec<ResultTable> {
        match self.run(name, request, ctx) {
            Ok(tables) => tables,
            Err(e) => {
                let title = self.get(name).map_or("Error", |a| a.meta().title);
                vec![ResultTable::error(title, &e)]
            }
        }
    }

    fn unknown(&self, name: &str) -> StatError {
        let similar = self.find_similar_analyses(name);
        let mut err = StatError::unknown_analysis(name);
        if !similar.is_empty() {
            let suggestions: Vec<&str> = similar.iter().take(3).map(|s| s.as_str()).collect();
            err = err.with_suggestion(format!(
                "Similar: {}. Use list_analyses for full list.",
                suggestions.join(", ")
            ));
        }
        err
    }

    /// Find analysis names similar to the given name (for error suggestions)
    fn find_similar_analyses(&self, name: &str) -> Vec<String> {
        let name_lower = name.to_lowercase();
        let mut matches: Vec<(String, usize)> = self
            .analyses
            .keys()
            .filter_map(|candidate| {
                let score = Self::similarity_score(&name_lower, candidate);
                (score > 0).then(|| (candidate.clone(), score))
            })
            .collect();

        // Higher score first, then alphabetical for a stable order
        matches.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        matches.into_iter().map(|(name, _)| name).collect()
    }

    fn similarity_score(query: &str, candidate: &str) -> usize {
        let mut score = 0;

        if candidate.starts_with(query) {
            score += 100;
        } else if candidate.contains(query) {
            score += 50;
        } else if query.contains(candidate) {
            score += 30;
        }

        let query_chars: HashSet<char> = query.chars().collect();
        let candidate_chars: HashSet<char> = candidate.chars().collect();
        let common = query_chars.intersection(&candidate_chars).count();
        // weak character overlap alone is not a suggestion
        if score == 0 && common * 2 < candidate_chars.len() {
            return 0;
        }
        score += common * 2;

        let len_diff = query.len().abs_diff(candidate.len());
        if len_diff < 5 {
            score += 5 - len_diff;
        }

        score
    }

    /// Metadata for every analysis, sorted by name
    pub fn list(&self) -> Vec<AnalysisMeta> {
        let mut metas: Vec<AnalysisMeta> = self.analyses.values().map(|a| a.meta()).collect();
        metas.sort_by_key(|m| m.name);
        metas
    }

    pub fn help(&self, name: Option<&str>) -> Result<JsonValue, StatError> {
        match name {
            Some(n) => self.help_for(n),
            None => Ok(self.general_help()),
        }
    }

    fn help_for(&self, name: &str) -> Result<JsonValue, StatError> {
        let analysis = self.get(name).ok_or_else(|| self.unknown(name))?;
        serde_json::to_value(analysis.meta()).map_err(|e| StatError::internal(e.to_string()))
    }

    fn general_help(&self) -> JsonValue {
        let mut by_category: HashMap<&str, Vec<&str>> = HashMap::new();
        for meta in self.list() {
            by_category.entry(meta.category).or_default().push(meta.name);
        }
        json!({
            "analyses": by_category,
            "usage": "Call help with an analysis name for its request fields and output tables."
        })
    }
}

impl Default for AnalysisRegistry {
    fn default() -> Self {
        Self::new()
    }
}
