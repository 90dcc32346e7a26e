//! Result artifact writer for tree dumps and evaluation sweeps.

use std::fs;
use std::path::{Path, PathBuf};

use bosque_tree::DecisionTree;
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::IoError;
use crate::render::render_tree;
use crate::report::{SweepReport, ValidationReport};

/// Writes tree dumps and evaluation results to an output directory.
///
/// Creates the output directory on construction if it does not exist.
/// Output files are named `{experiment}_tree.txt` and
/// `{experiment}_evaluation.json`, so the experiment name is limited to
/// `[a-zA-Z0-9_-]+`.
pub struct ResultWriter {
    output_dir: PathBuf,
    experiment: String,
}

/// Settings an evaluation sweep ran with, recorded next to its results.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationSettings {
    /// Number of cross-validation folds.
    pub n_folds: usize,
    /// Candidate attributes per split, as given on the command line.
    pub max_features: String,
    /// Maximum tree depth, if any.
    pub max_depth: Option<usize>,
    /// Share of training rows drawn for each tree.
    pub bootstrap_fraction: f64,
    /// Master random seed.
    pub seed: u64,
}

#[derive(Serialize)]
struct EvaluationArtifact<'a> {
    experiment: &'a str,
    label: &'a str,
    classes: &'a [String],
    n_rows: usize,
    settings: &'a EvaluationSettings,
    elapsed_secs: f64,
    results: &'a [ValidationReport],
}

impl ResultWriter {
    /// Create a new writer targeting the given directory and experiment name.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::InvalidExperimentName`] | `experiment` does not match `[a-zA-Z0-9_-]+` |
    /// | [`IoError::OutputDirCreate`] | The directory cannot be created |
    #[instrument(skip_all, fields(dir = %output_dir.display(), experiment = %experiment))]
    pub fn new(output_dir: &Path, experiment: &str) -> Result<Self, IoError> {
        let valid = !experiment.is_empty()
            && experiment
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(IoError::InvalidExperimentName {
                name: experiment.to_string(),
            });
        }

        fs::create_dir_all(output_dir).map_err(|e| IoError::OutputDirCreate {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
        debug!("output directory ready");
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            experiment: experiment.to_string(),
        })
    }

    /// Write the rendered tree to `{experiment}_tree.txt`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::WriteFile`] if the file cannot be written.
    #[instrument(skip_all)]
    pub fn write_tree(&self, tree: &DecisionTree) -> Result<PathBuf, IoError> {
        let path = self.artifact_path("tree.txt");
        fs::write(&path, render_tree(tree)).map_err(|e| IoError::WriteFile {
            path: path.clone(),
            source: e,
        })?;

        info!(path = %path.display(), "tree written");
        Ok(path)
    }

    /// Write a cross-validation sweep to `{experiment}_evaluation.json`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::Serialize`] | The artifact cannot be encoded as JSON |
    /// | [`IoError::WriteFile`] | The file cannot be written |
    #[instrument(skip_all)]
    pub fn write_evaluation(
        &self,
        label: &str,
        classes: &[String],
        n_rows: usize,
        settings: &EvaluationSettings,
        sweep: &SweepReport,
    ) -> Result<PathBuf, IoError> {
        let path = self.artifact_path("evaluation.json");

        let artifact = EvaluationArtifact {
            experiment: &self.experiment,
            label,
            classes,
            n_rows,
            settings,
            elapsed_secs: sweep.elapsed.as_secs_f64(),
            results: &sweep.entries,
        };

        let json = serde_json::to_string_pretty(&artifact).map_err(|e| IoError::Serialize {
            path: path.clone(),
            source: e,
        })?;
        fs::write(&path, &json).map_err(|e| IoError::WriteFile {
            path: path.clone(),
            source: e,
        })?;

        info!(path = %path.display(), "evaluation result written");
        Ok(path)
    }

    fn artifact_path(&self, suffix: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}_{suffix}", self.experiment))
    }
}
