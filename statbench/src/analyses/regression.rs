//! Linear Regression: Model Summary, ANOVA, Coefficients, Collinearity Diagnostics

use crate::context::AnalysisContext;
use crate::request::AnalysisRequest;
use crate::traits::{AnalysisMeta, AnalysisPlugin, ArgMeta};
use statbench_core::{complete_cases, ColumnHeader, LeafRow, ResultRow, ResultTable, Sample, StatError, TableValue};
use statbench_stats::collinearity::from_predictor;
use statbench_stats::{fit_ols, fit_simple, Anova, AnovaRow, CollinearityDiagnostics, FitResult, ModelSummary};

/// Row-group header of the single model
const MODEL: &str = "1";

pub struct LinearRegression;

static REGRESSION_ARGS: [ArgMeta; 4] = [
    ArgMeta::required("dependent", "Sample", "Dependent variable"),
    ArgMeta::required("independents", "Sample[]", "One or more predictors"),
    ArgMeta::optional("options.durbin_watson", "bool", "Add Durbin-Watson to the Model Summary", "false"),
    ArgMeta::optional("options.collinearity", "bool", "Add Collinearity Diagnostics (one predictor)", "false"),
];

static REGRESSION_TABLES: [&str; 4] = ["Model Summary", "ANOVA", "Coefficients", "Collinearity Diagnostics"];

static REGRESSION_RELATED: [&str; 1] = ["curve_estimation"];

impl AnalysisPlugin for LinearRegression {
    fn meta(&self) -> AnalysisMeta {
        AnalysisMeta {
            name: "regression",
            title: "Linear Regression",
            description: "Ordinary least squares regression of one dependent variable on one or more predictors",
            args: &REGRESSION_ARGS,
            tables: &REGRESSION_TABLES,
            category: "regression",
            related: &REGRESSION_RELATED,
        }
    }

    fn run(&self, request: &AnalysisRequest, ctx: &AnalysisContext) -> Result<Vec<ResultTable>, StatError> {
        let dependent = request.require_dependent()?;
        let independents = request.require_independents()?;

        let mut samples: Vec<&Sample> = vec![dependent];
        samples.extend(independents.iter());
        let mut columns = complete_cases(&samples)?;
        let y = columns.remove(0);
        let names: Vec<&str> = independents.iter().map(|s| s.name()).collect();

        let fit = if columns.len() == 1 {
            fit_simple(&columns[0], &y, names[0])?
        } else {
            let predictors: Vec<&[f64]> = columns.iter().map(|c| c.as_slice()).collect();
            fit_ols(&y, &predictors, &names)?
        };

        let footnotes = Footnotes::new(dependent.name(), &names);
        let mut tables = vec![
            model_summary(&fit, ctx, ctx.durbin_watson(request), &footnotes),
            anova_table(&Anova::from_fit(&fit), ctx, &footnotes),
            coefficients_table(&fit, ctx, &footnotes),
        ];

        if ctx.collinearity(request) {
            let diagnostics = if columns.len() == 1 {
                from_predictor(&columns[0], names[0])
            } else {
                Err(StatError::unsupported(format!(
                    "collinearity diagnostics need a single predictor, got {}",
                    columns.len()
                )))
            };
            tables.push(match diagnostics {
                Ok(d) => collinearity_table(&d, ctx, &footnotes),
                Err(e) => ResultTable::error("Collinearity Diagnostics", &e),
            });
        }

        Ok(tables)
    }
}

struct Footnotes {
    predictors: String,
    dependent: String,
}

impl Footnotes {
    fn new(dependent: &str, predictors: &[&str]) -> Self {
        Self {
            predictors: format!("Predictors: (Constant), {}", predictors.join(", ")),
            dependent: format!("Dependent Variable: {}", dependent),
        }
    }
}

fn model_summary(fit: &FitResult, ctx: &AnalysisContext, with_dw: bool, notes: &Footnotes) -> ResultTable {
    let summary = ModelSummary::from_fit(fit);

    let mut columns = vec![
        ColumnHeader::leaf("r", "R"),
        ColumnHeader::leaf("r_square", "R Square"),
        ColumnHeader::leaf("adj_r_square", "Adjusted R Square"),
        ColumnHeader::leaf("se_estimate", "Std. Error of the Estimate"),
    ];
    let mut row = LeafRow::new(MODEL)
        .with("r", ctx.stat(summary.r))
        .with("r_square", ctx.stat(summary.r_squared))
        .with("adj_r_square", ctx.stat(summary.adj_r_squared))
        .with("se_estimate", ctx.std_error_estimate(summary.std_error_estimate));
    if with_dw {
        columns.push(ColumnHeader::leaf("durbin_watson", "Durbin-Watson"));
        row = row.with("durbin_watson", ctx.optional_stat(summary.durbin_watson));
    }

    let mut table = ResultTable::new("Model Summary")
        .with_columns(columns)
        .with_footnote(notes.predictors.clone());
    if with_dw {
        table = table.with_footnote(notes.dependent.clone());
    }
    table.push_row(row);
    table
}

fn anova_row(header: &str, row: &AnovaRow, ctx: &AnalysisContext) -> ResultRow {
    LeafRow::new(header)
        .with("ss", ctx.stat(row.sum_of_squares))
        .with("df", TableValue::integer(row.df))
        .with("ms", ctx.optional_stat(row.mean_square))
        .with("f", ctx.optional_stat(row.f))
        .with("sig", ctx.optional_stat(row.significance))
        .into()
}

fn anova_table(anova: &Anova, ctx: &AnalysisContext, notes: &Footnotes) -> ResultTable {
    let mut table = ResultTable::new("ANOVA")
        .with_columns(vec![
            ColumnHeader::leaf("ss", "Sum of Squares"),
            ColumnHeader::leaf("df", "df"),
            ColumnHeader::leaf("ms", "Mean Square"),
            ColumnHeader::leaf("f", "F"),
            ColumnHeader::leaf("sig", "Sig."),
        ])
        .with_footnote(notes.dependent.clone())
        .with_footnote(notes.predictors.clone());
    table.push_row(ResultRow::group(
        MODEL,
        vec![
            anova_row("Regression", &anova.regression, ctx),
            anova_row("Residual", &anova.residual, ctx),
            anova_row("Total", &anova.total, ctx),
        ],
    ));
    table
}

fn coefficients_table(fit: &FitResult, ctx: &AnalysisContext, notes: &Footnotes) -> ResultTable {
    let mut table = ResultTable::new("Coefficients")
        .with_columns(vec![
            ColumnHeader::group(
                "Unstandardized Coefficients",
                vec![ColumnHeader::leaf("b", "B"), ColumnHeader::leaf("se", "Std. Error")],
            ),
            ColumnHeader::group("Standardized Coefficients", vec![ColumnHeader::leaf("beta", "Beta")]),
            ColumnHeader::leaf("t", "t"),
            ColumnHeader::leaf("sig", "Sig."),
        ])
        .with_footnote(notes.dependent.clone());

    let rows = fit
        .coefficients
        .iter()
        .map(|c| {
            LeafRow::new(c.name.clone())
                .with("b", ctx.stat(c.estimate))
                .with("se", ctx.stat(c.std_error))
                .with("beta", ctx.optional_stat(c.beta))
                .with("t", ctx.stat(c.t))
                .with("sig", ctx.stat(c.significance))
                .into()
        })
        .collect();
    table.push_row(ResultRow::group(MODEL, rows));
    table
}

fn collinearity_table(d: &CollinearityDiagnostics, ctx: &AnalysisContext, notes: &Footnotes) -> ResultTable {
    let proportions = d
        .terms
        .iter()
        .enumerate()
        .map(|(i, term)| ColumnHeader::leaf(format!("vp_{}", i), term.clone()))
        .collect();

    let mut table = ResultTable::new("Collinearity Diagnostics")
        .with_columns(vec![
            ColumnHeader::leaf("dimension", "Dimension"),
            ColumnHeader::leaf("eigenvalue", "Eigenvalue"),
            ColumnHeader::leaf("condition_index", "Condition Index"),
            ColumnHeader::group("Variance Proportions", proportions),
        ])
        .with_footnote(notes.dependent.clone());

    let rows = d
        .dimensions
        .iter()
        .map(|dim| {
            let mut row = LeafRow::new(dim.dimension.to_string())
                .with("dimension", TableValue::integer(dim.dimension))
                .with("eigenvalue", ctx.stat(dim.eigenvalue))
                .with("condition_index", ctx.stat(dim.condition_index));
            for (i, p) in dim.variance_proportions.iter().enumerate() {
                row = row.with(&format!("vp_{}", i), ctx.stat(*p));
            }
            row.into()
        })
        .collect();
    table.push_row(ResultRow::group(MODEL, rows));
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::AnalysisOptions;
    use approx::assert_abs_diff_eq;
    use statbench_core::codes;

    fn request() -> AnalysisRequest {
        AnalysisRequest::new()
            .with_dependent(Sample::from_values("y", &[2.0, 4.0, 5.0, 4.0, 5.0]))
            .with_independent(Sample::from_values("x", &[1.0, 2.0, 3.0, 4.0, 5.0]))
    }

    fn num(table: &ResultTable, path: &[&str], key: &str) -> f64 {
        table.value(path, key).and_then(|v| v.as_f64()).unwrap()
    }

    #[test]
    fn test_simple_regression_tables() {
        let tables = LinearRegression.run(&request(), &AnalysisContext::default()).unwrap();
        let titles: Vec<&str> = tables.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Model Summary", "ANOVA", "Coefficients"]);
        for t in &tables {
            t.validate().unwrap();
        }

        let summary = &tables[0];
        assert_eq!(num(summary, &["1"], "r"), 0.775);
        assert_eq!(num(summary, &["1"], "r_square"), 0.6);
        assert_eq!(num(summary, &["1"], "adj_r_square"), 0.467);
        assert_eq!(num(summary, &["1"], "se_estimate"), 0.89443);
        assert_eq!(summary.footnotes, vec!["Predictors: (Constant), x"]);

        let anova = &tables[1];
        assert_eq!(num(anova, &["1", "Regression"], "ss"), 3.6);
        assert_eq!(num(anova, &["1", "Residual"], "df"), 3.0);
        assert_eq!(num(anova, &["1", "Regression"], "f"), 4.5);
        assert_eq!(num(anova, &["1", "Regression"], "sig"), 0.124);
        assert!(anova.value(&["1", "Total"], "ms").unwrap().is_empty());

        let coefficients = &tables[2];
        assert_eq!(num(coefficients, &["1", "(Constant)"], "b"), 2.2);
        assert_eq!(num(coefficients, &["1", "x"], "b"), 0.6);
        assert_eq!(num(coefficients, &["1", "x"], "se"), 0.283);
        assert_eq!(num(coefficients, &["1", "x"], "beta"), 0.775);
        assert_eq!(num(coefficients, &["1", "x"], "t"), 2.121);
        assert!(coefficients.value(&["1", "(Constant)"], "beta").unwrap().is_empty());
    }

    #[test]
    fn test_optional_tables() {
        let req = request().with_options(AnalysisOptions {
            durbin_watson: Some(true),
            collinearity: Some(true),
            ..Default::default()
        });
        let tables = LinearRegression.run(&req, &AnalysisContext::default()).unwrap();
        assert_eq!(tables.len(), 4);
        assert!(tables[0].value(&["1"], "durbin_watson").unwrap().as_f64().is_some());

        let diagnostics = &tables[3];
        diagnostics.validate().unwrap();
        assert_eq!(num(diagnostics, &["1", "2"], "condition_index"), 4.467);
        assert_eq!(num(diagnostics, &["1", "1"], "eigenvalue"), 1.905);
        assert_eq!(diagnostics.leaf_columns()[3].0, vec!["Variance Proportions", "(Constant)"]);
    }

    #[test]
    fn test_multiple_predictors_collinearity_unsupported() {
        let req = request()
            .with_independent(Sample::from_values("z", &[0.5, 0.1, 0.9, 0.3, 0.8]))
            .with_options(AnalysisOptions { collinearity: Some(true), ..Default::default() });
        let tables = LinearRegression.run(&req, &AnalysisContext::default()).unwrap();
        assert_eq!(tables.len(), 4);
        assert_eq!(tables[3].error_code(), Some(codes::UNSUPPORTED));
        assert!(tables[2].row(&["1", "z"]).is_some());
        assert_abs_diff_eq!(
            num(&tables[1], &["1", "Total"], "ss"),
            num(&tables[1], &["1", "Regression"], "ss") + num(&tables[1], &["1", "Residual"], "ss"),
            epsilon = 2e-3
        );
    }

    #[test]
    fn test_listwise_deletion() {
        let req = AnalysisRequest::new()
            .with_dependent(Sample::new("y", vec![Some(2.0), Some(4.0), None, Some(5.0), Some(4.0), Some(5.0)]))
            .with_independent(Sample::new("x", vec![Some(1.0), Some(2.0), Some(9.0), Some(3.0), Some(4.0), Some(5.0)]));
        let tables = LinearRegression.run(&req, &AnalysisContext::default()).unwrap();
        assert_eq!(num(&tables[2], &["1", "x"], "b"), 0.6);
        assert_eq!(num(&tables[1], &["1", "Total"], "df"), 4.0);
    }

    #[test]
    fn test_errors() {
        let ctx = AnalysisContext::default();
        let missing = AnalysisRequest::new().with_independent(Sample::from_values("x", &[1.0]));
        assert_eq!(LinearRegression.run(&missing, &ctx).unwrap_err().code, codes::INVALID_INPUT);

        let mismatch = AnalysisRequest::new()
            .with_dependent(Sample::from_values("y", &[1.0, 2.0, 3.0]))
            .with_independent(Sample::from_values("x", &[1.0, 2.0]));
        assert_eq!(LinearRegression.run(&mismatch, &ctx).unwrap_err().code, codes::LENGTH_MISMATCH);

        let constant = AnalysisRequest::new()
            .with_dependent(Sample::from_values("y", &[1.0, 2.0, 3.0]))
            .with_independent(Sample::from_values("x", &[2.0, 2.0, 2.0]));
        assert!(LinearRegression.run(&constant, &ctx).unwrap_err().is_singular());
    }
}
