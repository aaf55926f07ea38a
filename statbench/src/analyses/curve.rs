//! Curve Estimation

use crate::context::AnalysisContext;
use crate::request::AnalysisRequest;
use crate::traits::{AnalysisMeta, AnalysisPlugin, ArgMeta};
use statbench_core::{complete_cases, ColumnHeader, LeafRow, ResultTable, StatError, TableValue};
use statbench_stats::{estimate_curves, Anova, CurveFit, CurveModel};

pub struct CurveEstimationAnalysis;

static CURVE_ARGS: [ArgMeta; 3] = [
    ArgMeta::required("dependent", "Sample", "Dependent variable"),
    ArgMeta::required("independents", "Sample[]", "Exactly one independent variable"),
    ArgMeta::optional("models", "string[]", "Model names, e.g. linear, quadratic, s-curve", "all"),
];

static CURVE_TABLES: [&str; 1] = ["Model Summary and Parameter Estimates"];

static CURVE_RELATED: [&str; 1] = ["regression"];

impl AnalysisPlugin for CurveEstimationAnalysis {
    fn meta(&self) -> AnalysisMeta {
        AnalysisMeta {
            name: "curve_estimation",
            title: "Curve Estimation",
            description: "Fit linear, polynomial and linearizable curve models of one predictor",
            args: &CURVE_ARGS,
            tables: &CURVE_TABLES,
            category: "regression",
            related: &CURVE_RELATED,
        }
    }

    fn run(&self, request: &AnalysisRequest, ctx: &AnalysisContext) -> Result<Vec<ResultTable>, StatError> {
        let dependent = request.require_dependent()?;
        let independents = request.require_independents()?;
        if independents.len() != 1 {
            return Err(StatError::invalid_input(format!(
                "curve estimation takes exactly one independent variable, got {}",
                independents.len()
            )));
        }
        let independent = &independents[0];
        let models = requested_models(&request.models)?;

        let columns = complete_cases(&[dependent, independent])?;
        let (y, x) = (&columns[0], &columns[1]);
        let estimation = estimate_curves(x, y, independent.name(), &models)?;

        let mut table = ResultTable::new("Model Summary and Parameter Estimates")
            .with_columns(vec![
                ColumnHeader::group(
                    "Model Summary",
                    vec![
                        ColumnHeader::leaf("r_square", "R Square"),
                        ColumnHeader::leaf("f", "F"),
                        ColumnHeader::leaf("df1", "df1"),
                        ColumnHeader::leaf("df2", "df2"),
                        ColumnHeader::leaf("sig", "Sig."),
                    ],
                ),
                ColumnHeader::group(
                    "Parameter Estimates",
                    vec![
                        ColumnHeader::leaf("constant", "Constant"),
                        ColumnHeader::leaf("b1", "b1"),
                        ColumnHeader::leaf("b2", "b2"),
                        ColumnHeader::leaf("b3", "b3"),
                    ],
                ),
            ])
            .with_footnote(format!("Dependent Variable: {}", dependent.name()))
            .with_footnote(format!("The independent variable is {}.", independent.name()));

        for fit in &estimation.fits {
            table.push_row(curve_row(fit, ctx));
        }
        for skipped in &estimation.skipped {
            table = table.with_footnote(format!("{}: {}", skipped.model, skipped.reason));
        }
        if let Some(best) = estimation.best() {
            table = table.with_footnote(format!("Best fit by R Square: {}", best.model));
        }

        Ok(vec![table])
    }
}

/// Parse model names, all models when none are given
fn requested_models(names: &[String]) -> Result<Vec<CurveModel>, StatError> {
    if names.is_empty() {
        return Ok(CurveModel::ALL.to_vec());
    }
    names.iter().map(|n| n.parse::<CurveModel>()).collect()
}

fn curve_row(fit: &CurveFit, ctx: &AnalysisContext) -> LeafRow {
    let anova = Anova::from_fit(&fit.fit);
    LeafRow::new(fit.model.name())
        .with("r_square", ctx.stat(fit.r_squared()))
        .with("f", ctx.stat(anova.f()))
        .with("df1", TableValue::integer(fit.fit.df_regression))
        .with("df2", TableValue::integer(fit.fit.df_residual))
        .with("sig", ctx.stat(anova.significance()))
        .with("constant", ctx.stat(fit.constant))
        .with("b1", ctx.stat(fit.b1))
        .with("b2", ctx.optional_stat(fit.b2))
        .with("b3", ctx.optional_stat(fit.b3))
}
