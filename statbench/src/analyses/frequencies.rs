//! Frequencies: a Statistics table plus one frequency table per variable

use super::value_label;
use crate::context::AnalysisContext;
use crate::request::AnalysisRequest;
use crate::traits::{AnalysisMeta, AnalysisPlugin, ArgMeta};
use statbench_core::{codes, ColumnHeader, LeafRow, ResultRow, ResultTable, StatError, TableValue};
use statbench_stats::{Descriptives, FrequencyTable};

const MULTIPLE_MODES: &str = "Multiple modes exist. The smallest value is shown.";

pub struct FrequenciesAnalysis;

static FREQUENCIES_ARGS: [ArgMeta; 3] = [
    ArgMeta::required("variables", "Sample[]", "Variables to tabulate"),
    ArgMeta::optional("options.percentiles", "number[]", "Percentile cut points in [0, 100]", "10, 20, 25, 30, 40, 50, 60, 70, 75, 80, 90"),
    ArgMeta::optional("options.frequency_order", "string", "first_seen or ascending", "first_seen"),
];

static FREQUENCIES_TABLES: [&str; 2] = ["Statistics", "<variable>"];

static FREQUENCIES_RELATED: [&str; 1] = ["descriptives"];

impl AnalysisPlugin for FrequenciesAnalysis {
    fn meta(&self) -> AnalysisMeta {
        AnalysisMeta {
            name: "frequencies",
            title: "Frequencies",
            description: "Summary statistics, percentiles and a frequency table for each variable",
            args: &FREQUENCIES_ARGS,
            tables: &FREQUENCIES_TABLES,
            category: "descriptive",
            related: &FREQUENCIES_RELATED,
        }
    }

    fn run(&self, request: &AnalysisRequest, ctx: &AnalysisContext) -> Result<Vec<ResultTable>, StatError> {
        let variables = request.require_variables()?;
        let cut_points = ctx.percentiles(request);

        let mut summaries = Vec::with_capacity(variables.len());
        for sample in variables {
            // a variable with no valid values still reports its N
            match Descriptives::compute(sample, cut_points) {
                Ok(d) => summaries.push(Some(d)),
                Err(e) if e.code == codes::EMPTY_SAMPLE => summaries.push(None),
                Err(e) => return Err(e),
            }
        }

        let order = ctx.frequency_order(request);
        let frequency_tables: Vec<FrequencyTable> =
            variables.iter().map(|s| FrequencyTable::tabulate(s, order)).collect();

        let mut tables = vec![statistics_table(&frequency_tables, &summaries, cut_points, ctx)];
        tables.extend(frequency_tables.iter().map(|f| frequency_table(f, ctx)));
        Ok(tables)
    }
}

fn statistics_table(
    counts: &[FrequencyTable],
    summaries: &[Option<Descriptives>],
    cut_points: &[f64],
    ctx: &AnalysisContext,
) -> ResultTable {
    let keys: Vec<String> = (0..counts.len()).map(|i| format!("v{}", i)).collect();
    let columns = keys
        .iter()
        .zip(counts)
        .map(|(key, f)| ColumnHeader::leaf(key.clone(), f.variable.clone()))
        .collect();

    let row = |header: &str, cells: Vec<TableValue>| -> ResultRow {
        keys.iter()
            .zip(cells)
            .fold(LeafRow::new(header), |row, (key, value)| row.with(key, value))
            .into()
    };
    let stat_row = |header: &str, pick: fn(&Descriptives) -> f64| -> ResultRow {
        row(header, summaries.iter().map(|d| ctx.optional_stat(d.as_ref().map(pick))).collect())
    };

    let mut table = ResultTable::new("Statistics").with_columns(columns);
    table.push_row(ResultRow::group(
        "N",
        vec![
            row("Valid", counts.iter().map(|f| TableValue::integer(f.valid)).collect()),
            row("Missing", counts.iter().map(|f| TableValue::integer(f.missing)).collect()),
        ],
    ));
    table.push_row(stat_row("Mean", |d| d.mean));
    table.push_row(stat_row("Std. Error of Mean", |d| d.se_mean));
    table.push_row(stat_row("Median", |d| d.median));
    table.push_row(stat_row("Mode", |d| d.mode));
    table.push_row(stat_row("Std. Deviation", |d| d.std_dev));
    table.push_row(stat_row("Variance", |d| d.variance));
    table.push_row(stat_row("Skewness", |d| d.skewness));
    table.push_row(stat_row("Std. Error of Skewness", |d| d.se_skewness));
    table.push_row(stat_row("Kurtosis", |d| d.kurtosis));
    table.push_row(stat_row("Std. Error of Kurtosis", |d| d.se_kurtosis));
    table.push_row(stat_row("Range", |d| d.range));
    table.push_row(stat_row("Minimum", |d| d.minimum));
    table.push_row(stat_row("Maximum", |d| d.maximum));
    table.push_row(stat_row("Sum", |d| d.sum));

    if !cut_points.is_empty() {
        let percentiles = cut_points
            .iter()
            .enumerate()
            .map(|(i, &p)| {
                let cells = summaries
                    .iter()
                    .map(|d| ctx.optional_stat(d.as_ref().and_then(|d| d.percentiles.get(i)).map(|q| q.value)))
                    .collect();
                row(&value_label(p), cells)
            })
            .collect();
        table.push_row(ResultRow::group("Percentiles", percentiles));
    }

    if summaries.iter().flatten().any(|d| d.multiple_modes) {
        table = table.with_footnote(MULTIPLE_MODES);
    }
    table
}

fn frequency_table(freq: &FrequencyTable, ctx: &AnalysisContext) -> ResultTable {
    let mut table = ResultTable::new(freq.variable.clone()).with_columns(vec![
        ColumnHeader::leaf("frequency", "Frequency"),
        ColumnHeader::leaf("percent", "Percent"),
        ColumnHeader::leaf("cumulative", "Cumulative Percent"),
    ]);

    let valid = freq
        .rows
        .iter()
        .map(|r| {
            let header = r.value.map_or_else(|| "Total".to_string(), value_label);
            LeafRow::new(header)
                .with("frequency", TableValue::integer(r.frequency))
                .with("percent", ctx.percent(r.percent))
                .with("cumulative", r.cumulative_percent.map_or(TableValue::Empty, |c| ctx.percent(c)))
                .into()
        })
        .collect();
    table.push_row(ResultRow::group("Valid", valid));

    if freq.missing > 0 {
        table.push_row(
            LeafRow::new("Missing")
                .with("frequency", TableValue::integer(freq.missing))
                .with("percent", TableValue::Empty)
                .with("cumulative", TableValue::Empty),
        );
    }
    table
}
