//! Descriptives

use crate::context::AnalysisContext;
use crate::request::AnalysisRequest;
use crate::traits::{AnalysisMeta, AnalysisPlugin, ArgMeta};
use statbench_core::{complete_cases, ColumnHeader, LeafRow, ResultTable, Sample, StatError, TableValue};
use statbench_stats::Descriptives;

pub struct DescriptivesAnalysis;

static DESCRIPTIVES_ARGS: [ArgMeta; 1] = [ArgMeta::required("variables", "Sample[]", "Variables to summarize")];

static DESCRIPTIVES_TABLES: [&str; 1] = ["Descriptive Statistics"];

static DESCRIPTIVES_RELATED: [&str; 1] = ["frequencies"];

impl AnalysisPlugin for DescriptivesAnalysis {
    fn meta(&self) -> AnalysisMeta {
        AnalysisMeta {
            name: "descriptives",
            title: "Descriptives",
            description: "N, range, sum, mean, dispersion and shape of each variable",
            args: &DESCRIPTIVES_ARGS,
            tables: &DESCRIPTIVES_TABLES,
            category: "descriptive",
            related: &DESCRIPTIVES_RELATED,
        }
    }

    fn run(&self, request: &AnalysisRequest, ctx: &AnalysisContext) -> Result<Vec<ResultTable>, StatError> {
        let variables = request.require_variables()?;

        let mut table = ResultTable::new("Descriptive Statistics").with_columns(vec![
            ColumnHeader::leaf("n", "N"),
            ColumnHeader::leaf("minimum", "Minimum"),
            ColumnHeader::leaf("maximum", "Maximum"),
            ColumnHeader::leaf("sum", "Sum"),
            ColumnHeader::leaf("mean", "Mean"),
            ColumnHeader::leaf("std_dev", "Std. Deviation"),
            ColumnHeader::leaf("variance", "Variance"),
            ColumnHeader::group(
                "Skewness",
                vec![ColumnHeader::leaf("skewness", "Statistic"), ColumnHeader::leaf("se_skewness", "Std. Error")],
            ),
            ColumnHeader::group(
                "Kurtosis",
                vec![ColumnHeader::leaf("kurtosis", "Statistic"), ColumnHeader::leaf("se_kurtosis", "Std. Error")],
            ),
        ]);

        for sample in variables {
            let d = Descriptives::compute(sample, &[])?;
            table.push_row(
                LeafRow::new(d.variable.clone())
                    .with("n", TableValue::integer(d.valid))
                    .with("minimum", ctx.stat(d.minimum))
                    .with("maximum", ctx.stat(d.maximum))
                    .with("sum", ctx.stat(d.sum))
                    .with("mean", ctx.stat(d.mean))
                    .with("std_dev", ctx.stat(d.std_dev))
                    .with("variance", ctx.stat(d.variance))
                    .with("skewness", ctx.stat(d.skewness))
                    .with("se_skewness", ctx.stat(d.se_skewness))
                    .with("kurtosis", ctx.stat(d.kurtosis))
                    .with("se_kurtosis", ctx.stat(d.se_kurtosis)),
            );
        }

        if let Some(n) = listwise_n(variables) {
            table.push_row(LeafRow::new("Valid N (listwise)").with("n", TableValue::integer(n)));
        }

        Ok(vec![table])
    }
}

/// Rows valid in every variable; None when the variables differ in length
fn listwise_n(variables: &[Sample]) -> Option<usize> {
    let refs: Vec<&Sample> = variables.iter().collect();
    complete_cases(&refs).ok().map(|columns| columns.first().map_or(0, Vec::len))
}
