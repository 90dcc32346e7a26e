use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use bosque_io::{
    DelimitedReader, EvaluationSettings, ResultWriter, SweepReport, ValidationReport, render_tree,
};
use bosque_tree::{
    CrossValidation, Dataset, DecisionTree, DecisionTreeConfig, MaxFeatures, RandomForestConfig,
};

#[derive(Parser)]
#[command(name = "bosque")]
#[command(about = "Information-gain decision trees and bootstrap ensembles over delimited data")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// RNG seed for reproducibility
    #[arg(long, default_value_t = 42, global = true)]
    seed: u64,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for parallel classification (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

/// Input file options shared by every subcommand.
#[derive(Args, Debug, Clone)]
struct DataArgs {
    /// Path to the delimited input file (header row required)
    #[arg(long)]
    data: PathBuf,

    /// Field separator, a single character ("tab" for tabs)
    #[arg(long, default_value = ";")]
    separator: String,

    /// Name of the class label column
    #[arg(long, default_value = "Joga")]
    label: String,
}

/// Optional artifact output.
#[derive(Args, Debug, Clone)]
struct OutputArgs {
    /// Experiment name for output files (must match [a-zA-Z0-9_-]+)
    #[arg(long)]
    experiment: Option<String>,

    /// Output directory for result files
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,
}

#[derive(Subcommand)]
enum Command {
    /// Induce a single decision tree on every row and print it
    Tree {
        #[command(flatten)]
        input: DataArgs,

        /// Candidate attributes per split: "sqrt", "all", or a count
        #[arg(long, default_value = "all")]
        max_features: String,

        /// Maximum tree depth (unlimited if not set)
        #[arg(long)]
        max_depth: Option<usize>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Cross-validate bootstrap ensembles for a sweep of tree counts
    Evaluate {
        #[command(flatten)]
        input: DataArgs,

        /// Ensemble sizes to evaluate, comma-separated
        #[arg(long, value_delimiter = ',', default_value = "1,5,10,25,50")]
        trees: Vec<usize>,

        /// Number of cross-validation folds
        #[arg(long, default_value_t = 10)]
        folds: usize,

        /// Candidate attributes per split: "sqrt", "all", or a count
        #[arg(long, default_value = "sqrt")]
        max_features: String,

        /// Share of training rows drawn (with replacement) for each tree
        #[arg(long, default_value_t = RandomForestConfig::DEFAULT_BOOTSTRAP_FRACTION)]
        bootstrap_fraction: f64,

        /// Maximum tree depth (unlimited if not set)
        #[arg(long)]
        max_depth: Option<usize>,

        #[command(flatten)]
        output: OutputArgs,
    },
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct TreeOutput {
    label: String,
    n_rows: usize,
    n_attributes: usize,
    n_classes: usize,
    n_nodes: usize,
    n_leaves: usize,
    depth: usize,
    training_accuracy: f64,
    artifact: Option<PathBuf>,
}

#[derive(Serialize)]
struct EvaluateOutput {
    n_rows: usize,
    n_folds: usize,
    best_n_trees: Option<usize>,
    best_accuracy: Option<f64>,
    elapsed_secs: f64,
    artifact: Option<PathBuf>,
}

fn parse_separator(s: &str) -> Result<u8> {
    match s {
        "tab" | "\\t" => Ok(b'\t'),
        _ if s.len() == 1 && s.is_ascii() => Ok(s.as_bytes()[0]),
        other => {
            anyhow::bail!("invalid separator: {other:?} (expected one ASCII character or \"tab\")")
        }
    }
}

fn parse_max_features(s: &str) -> Result<MaxFeatures> {
    match s {
        "sqrt" => Ok(MaxFeatures::Sqrt),
        "all" => Ok(MaxFeatures::All),
        other => match other.parse::<usize>() {
            Ok(n) => Ok(MaxFeatures::Fixed(n)),
            Err(_) => {
                anyhow::bail!("unknown max features: {other} (expected sqrt, all or a count)")
            }
        },
    }
}

fn read_dataset(input: &DataArgs) -> Result<Dataset> {
    let separator = parse_separator(&input.separator)?;
    DelimitedReader::new(&input.data)
        .with_separator(separator)
        .read(&input.label)
        .context("failed to read input data")
}

fn open_writer(output: &OutputArgs) -> Result<Option<ResultWriter>> {
    let Some(experiment) = &output.experiment else {
        return Ok(None);
    };
    let writer = ResultWriter::new(&output.output_dir, experiment)
        .context("failed to prepare output directory")?;
    Ok(Some(writer))
}

/// Share of `dataset` rows whose predicted label matches their own.
fn training_accuracy(tree: &DecisionTree, dataset: &Dataset) -> f64 {
    if dataset.n_rows() == 0 {
        return 0.0;
    }
    let agreeing = (0..dataset.n_rows())
        .filter(|&r| {
            let truth = dataset.classes()[dataset.class_of(r)].as_str();
            tree.classify_label(dataset.row(r)) == Some(truth)
        })
        .count();
    agreeing as f64 / dataset.n_rows() as f64
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Configure Rayon thread pool
    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    match cli.command {
        Command::Tree {
            input,
            max_features,
            max_depth,
            output,
        } => {
            let max_features = parse_max_features(&max_features)?;
            let writer = open_writer(&output)?;
            let dataset = read_dataset(&input)?;

            let n_candidates = dataset.candidate_attributes().len();
            let tree = DecisionTreeConfig::new()
                .with_max_features(Some(max_features.resolve(n_candidates)?))
                .with_max_depth(max_depth)
                .with_seed(cli.seed)
                .fit(&dataset)
                .context("tree induction failed")?;

            print!("{}", render_tree(&tree));

            let artifact = match &writer {
                Some(w) => Some(w.write_tree(&tree)?),
                None => None,
            };

            let summary = TreeOutput {
                label: tree.label_name().to_string(),
                n_rows: dataset.n_rows(),
                n_attributes: n_candidates,
                n_classes: dataset.n_classes(),
                n_nodes: tree.n_nodes(),
                n_leaves: tree.n_leaves(),
                depth: tree.depth(),
                training_accuracy: training_accuracy(&tree, &dataset),
                artifact,
            };
            info!(summary = %serde_json::to_string(&summary)?, "tree complete");
        }

        Command::Evaluate {
            input,
            trees,
            folds,
            max_features,
            bootstrap_fraction,
            max_depth,
            output,
        } => {
            if trees.is_empty() {
                anyhow::bail!("--trees must list at least one ensemble size");
            }
            let max_features_strategy = parse_max_features(&max_features)?;
            let writer = open_writer(&output)?;
            let dataset = read_dataset(&input)?;

            let cv = CrossValidation::new(folds)?.with_seed(cli.seed);

            let started = Instant::now();
            let mut entries = Vec::with_capacity(trees.len());
            for &n_trees in &trees {
                let config = RandomForestConfig::new(n_trees)?
                    .with_max_features(max_features_strategy)
                    .with_max_depth(max_depth)
                    .with_bootstrap_fraction(bootstrap_fraction)
                    .with_seed(cli.seed);

                let result = cv
                    .evaluate(&config, &dataset)
                    .with_context(|| format!("cross-validation with {n_trees} trees failed"))?;
                info!(
                    n_trees,
                    correct = result.correct,
                    incorrect = result.incorrect,
                    accuracy = result.accuracy(),
                    "ensemble size evaluated"
                );
                entries.push(ValidationReport::new(n_trees, &result));
            }
            let sweep = SweepReport {
                entries,
                elapsed: started.elapsed(),
            };

            print!("{sweep}");

            let artifact = match &writer {
                Some(w) => {
                    let settings = EvaluationSettings {
                        n_folds: folds,
                        max_features,
                        max_depth,
                        bootstrap_fraction,
                        seed: cli.seed,
                    };
                    Some(w.write_evaluation(
                        &input.label,
                        dataset.classes(),
                        dataset.n_rows(),
                        &settings,
                        &sweep,
                    )?)
                }
                None => None,
            };

            // Ties keep the smaller ensemble.
            let best = sweep.entries.iter().fold(None::<&ValidationReport>, |best, e| match best {
                Some(b) if b.correct >= e.correct => Some(b),
                _ => Some(e),
            });
            let summary = EvaluateOutput {
                n_rows: dataset.n_rows(),
                n_folds: folds,
                best_n_trees: best.map(|b| b.n_trees),
                best_accuracy: best.map(|b| b.correct_percent() / 100.0),
                elapsed_secs: sweep.elapsed.as_secs_f64(),
                artifact,
            };
            info!(summary = %serde_json::to_string(&summary)?, "evaluation complete");
        }
    }

    Ok(())
}
