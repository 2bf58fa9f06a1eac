//! `evqa`: ask questions about the electric-vehicle dataset from a terminal.

mod report;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use evqa_rag::insights::{
    LinearRegression, RandomForest, Regressor, feature_rows, train_test_split,
};
use evqa_rag::openai::api_key_from_env;
use evqa_rag::{
    ColumnMapping, Dataset, OpenAIChatModel, OpenAIEmbeddingProvider, QaConfig, QaOrchestrator,
};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::report::{FittedModel, Inspection, RegressionReport};

#[derive(Parser)]
#[command(name = "evqa", version, about = "Question answering over an electric-vehicle dataset")]
struct Cli {
    /// CSV export to load.
    #[arg(long, global = true, default_value = "ev_raw_data.csv")]
    data: PathBuf,

    /// Print machine-readable JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    /// Log at debug level (overrides RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Answer a single question and exit
    Ask {
        /// The question, e.g. "Which car has the longest range?"
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },
    /// Interactive question session
    Chat,
    /// Summarize the dataset
    Inspect {
        /// Number of makes to list
        #[arg(long, default_value_t = 10)]
        top: usize,
        /// Histogram bins for range and price
        #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u16).range(1..))]
        bins: u16,
    },
    /// Fit a regression model and score it on held-out rows
    Regress {
        /// Column to predict
        #[arg(long, default_value = "price")]
        target: String,
        /// Column to predict from; repeat for several
        #[arg(long = "feature", default_value = "range")]
        features: Vec<String>,
        /// Model family
        #[arg(long, value_enum, default_value_t = ModelKind::Linear)]
        model: ModelKind,
        /// Trees in the random forest
        #[arg(long, default_value_t = RandomForest::DEFAULT_TREES)]
        trees: u16,
        /// Fraction of rows held out for scoring
        #[arg(long, default_value_t = 0.2)]
        test_size: f64,
        /// Shuffle seed
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModelKind {
    /// Ordinary least squares
    Linear,
    /// Bagged regression trees
    Forest,
}

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env is fine; the environment may already be set.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let dataset = Dataset::from_csv_path(&cli.data, &ColumnMapping::default())
        .with_context(|| format!("failed to load {}", cli.data.display()))?;

    match cli.command {
        Command::Ask { question } => {
            let qa = build_orchestrator(&dataset).await?;
            let answer = qa.ask(&question.join(" ")).await?;
            report::print_answer(&answer, cli.json)
        }
        Command::Chat => {
            let qa = build_orchestrator(&dataset).await?;
            chat(&qa, cli.json).await
        }
        Command::Inspect { top, bins } => {
            let inspection = Inspection::of(dataset.records(), top, bins.into())?;
            report::print_inspection(&inspection, cli.json)
        }
        Command::Regress { target, features, model, trees, test_size, seed } => {
            let columns: Vec<&str> = features.iter().map(String::as_str).collect();
            let rows = feature_rows(dataset.records(), &columns, &target);
            let split = train_test_split(&rows, test_size, seed).with_context(|| {
                format!("cannot split {} rows with numeric {features:?} and {target}", rows.len())
            })?;

            let (model, metrics) = match model {
                ModelKind::Linear => {
                    let linear = LinearRegression::fit(&split.train)?;
                    let metrics = linear.evaluate(&split.test)?;
                    (FittedModel::Linear(linear), metrics)
                }
                ModelKind::Forest => {
                    let forest = RandomForest::fit(&split.train, trees, seed)?;
                    (FittedModel::Forest { trees }, forest.evaluate(&split.test)?)
                }
            };

            let regression = RegressionReport {
                features,
                target,
                train_rows: split.train.len(),
                test_rows: split.test.len(),
                model,
                metrics,
            };
            report::print_regression(&regression, cli.json)
        }
    }
}

/// Construct the orchestrator from the environment and index `dataset`.
///
/// Credentials are checked before any embedding call is made.
async fn build_orchestrator(dataset: &Dataset) -> anyhow::Result<QaOrchestrator> {
    let config = QaConfig::from_env()?;
    let api_key = api_key_from_env()?;
    let embedder = OpenAIEmbeddingProvider::from_config(&config, &api_key)?;
    let model = OpenAIChatModel::from_config(&config, api_key)?;

    let mut qa = QaOrchestrator::builder()
        .config(config)
        .embedding_provider(Arc::new(embedder))
        .completion_model(Arc::new(model))
        .build()?;

    eprintln!("Indexing {} vehicles...", dataset.len());
    let report = qa.build(dataset.records()).await.context("failed to build the index")?;
    info!(segment_count = report.segment_count, dimensions = report.dimensions, "ready");
    Ok(qa)
}

async fn chat(qa: &QaOrchestrator, json: bool) -> anyhow::Result<()> {
    let mut editor = DefaultEditor::new()?;
    // Display only; every question reaches the orchestrator on its own.
    let mut history: Vec<(String, String)> = Vec::new();

    println!("Ask about the vehicles. /history lists this session, /quit leaves.");
    loop {
        let line = match editor.readline("evqa> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };

        let question = line.trim();
        match question {
            "" => continue,
            "/quit" | "/exit" => break,
            "/history" => {
                report::print_history(&history);
                continue;
            }
            _ => {}
        }
        editor.add_history_entry(question)?;

        match qa.ask(question).await {
            Ok(answer) => {
                report::print_answer(&answer, json)?;
                history.push((question.to_string(), answer.answer));
            }
            Err(e) => eprintln!("error: {e}"),
        }
    }
    Ok(())
}
