//! Terminal and JSON rendering of command results.

use evqa_rag::Answer;
use evqa_rag::document::{Record, fields};
use evqa_rag::insights::{
    CorrelationMatrix, Histogram, LinearRegression, NumericSummary, RegressionMetrics,
    correlation_matrix, histogram, numeric_columns, summarize, top_n, value_counts,
};
use serde::Serialize;

/// Dataset overview printed by `evqa inspect`.
#[derive(Debug, Serialize)]
pub struct Inspection {
    pub record_count: usize,
    pub drive_configs: Vec<(String, usize)>,
    pub top_makes: Vec<(String, usize)>,
    pub range: Option<NumericSummary>,
    pub price: Option<NumericSummary>,
    pub range_histogram: Option<Histogram>,
    pub price_histogram: Option<Histogram>,
    pub correlations: CorrelationMatrix,
}

impl Inspection {
    pub fn of(records: &[Record], top: usize, bins: usize) -> evqa_rag::Result<Self> {
        let columns = numeric_columns(records);
        let columns: Vec<&str> = columns.iter().map(String::as_str).collect();
        Ok(Self {
            record_count: records.len(),
            drive_configs: value_counts(records, fields::DRIVE_CONFIG),
            top_makes: top_n(records, fields::MAKE, top),
            range: summarize(records, fields::RANGE),
            price: summarize(records, fields::PRICE),
            range_histogram: histogram(records, fields::RANGE, bins)?,
            price_histogram: histogram(records, fields::PRICE, bins)?,
            correlations: correlation_matrix(records, &columns),
        })
    }
}

/// The model `evqa regress` fitted.
#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FittedModel {
    Linear(LinearRegression),
    Forest { trees: u16 },
}

/// Result of `evqa regress`.
#[derive(Debug, Serialize)]
pub struct RegressionReport {
    pub features: Vec<String>,
    pub target: String,
    pub train_rows: usize,
    pub test_rows: usize,
    pub model: FittedModel,
    pub metrics: RegressionMetrics,
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_answer(answer: &Answer, json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(answer);
    }

    println!("{}", answer.answer);
    if !answer.sources.is_empty() {
        println!("\nSources:");
        for source in &answer.sources {
            println!(
                "  [row {}, score {:.3}] {}",
                source.segment.record_index, source.score, source.segment.text
            );
        }
    }
    Ok(())
}

pub fn print_history(history: &[(String, String)]) {
    if history.is_empty() {
        println!("(no questions yet)");
    }
    for (i, (question, answer)) in history.iter().enumerate() {
        println!("{}. Q: {question}\n   A: {answer}", i + 1);
    }
}

fn print_summary(name: &str, summary: Option<&NumericSummary>) {
    match summary {
        Some(s) => println!(
            "{name:>6}: n={} mean={:.1} std={:.1} min={:.1} max={:.1}",
            s.count, s.mean, s.std, s.min, s.max
        ),
        None => println!("{name:>6}: no numeric values"),
    }
}

pub fn print_inspection(inspection: &Inspection, json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(inspection);
    }

    println!("Records: {}", inspection.record_count);

    println!("\nDrive configurations:");
    for (drive, count) in &inspection.drive_configs {
        println!("  {drive:<12} {count}");
    }

    println!("\nTop makes:");
    for (make, count) in &inspection.top_makes {
        println!("  {make:<20} {count}");
    }

    println!();
    print_summary("range", inspection.range.as_ref());
    print_summary("price", inspection.price.as_ref());

    print_histogram("range", inspection.range_histogram.as_ref());
    print_histogram("price", inspection.price_histogram.as_ref());
    print_correlations(&inspection.correlations);
    Ok(())
}

const BAR_WIDTH: usize = 40;

fn print_histogram(name: &str, histogram: Option<&Histogram>) {
    let Some(histogram) = histogram else {
        return;
    };
    println!("\n{name} distribution:");
    let peak = histogram.counts.iter().copied().max().unwrap_or(0).max(1);
    for (count, low) in histogram.counts.iter().zip(histogram.edges()) {
        let bar = "#".repeat(count * BAR_WIDTH / peak);
        println!("  {low:>10.1} {count:>5} {bar}");
    }
}

fn print_correlations(matrix: &CorrelationMatrix) {
    if matrix.columns.is_empty() {
        return;
    }
    println!("\nCorrelations:");
    print!("  {:<12}", "");
    for column in &matrix.columns {
        print!(" {column:>12}");
    }
    println!();
    for (column, row) in matrix.columns.iter().zip(&matrix.values) {
        print!("  {column:<12}");
        for value in row {
            match value {
                Some(r) => print!(" {r:>12.3}"),
                None => print!(" {:>12}", "n/a"),
            }
        }
        println!();
    }
}

pub fn print_regression(report: &RegressionReport, json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(report);
    }

    match &report.model {
        FittedModel::Linear(model) => {
            let terms: Vec<String> = model
                .coefficients
                .iter()
                .zip(&report.features)
                .map(|(b, feature)| format!("{b:.3} * {feature}"))
                .collect();
            println!("{} = {} + {:.3}", report.target, terms.join(" + "), model.intercept);
        }
        FittedModel::Forest { trees } => println!(
            "{} ~ random forest of {trees} trees over {}",
            report.target,
            report.features.join(", ")
        ),
    }
    println!("Trained on {} rows, scored on {}.", report.train_rows, report.test_rows);
    let m = &report.metrics;
    println!("MSE  {:.3}\nMAE  {:.3}\nRMSE {:.3}\nR²   {:.4}", m.mse, m.mae, m.rmse, m.r2);
    Ok(())
}
