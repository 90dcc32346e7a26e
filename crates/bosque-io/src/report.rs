//! Human-readable validation reports.

use std::fmt;
use std::time::Duration;

use bosque_tree::CrossValidationResult;
use serde::Serialize;

/// Cross-validation outcome for one ensemble size.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    /// Number of trees in each fold's ensemble.
    pub n_trees: usize,
    /// Held-out rows evaluated across all folds.
    pub total: usize,
    /// Rows whose majority vote matched their class.
    pub correct: usize,
    /// Rows misclassified or left without a prediction.
    pub incorrect: usize,
    /// Rows no tree could classify (counted in `incorrect`).
    pub abstained: usize,
    /// Per-fold accuracies, in fold order.
    pub fold_accuracies: Vec<f64>,
    /// Mean fold accuracy.
    pub mean_accuracy: f64,
    /// Population standard deviation of fold accuracies.
    pub std_accuracy: f64,
    /// Predicted-row counts summed over folds, indexed `[true][predicted]`.
    pub confusion_matrix: Vec<Vec<usize>>,
    /// Per-class precision, recall, F1, support and abstentions.
    pub class_metrics: Vec<ClassReport>,
}

/// Per-class metrics of one [`ValidationReport`].
#[derive(Debug, Clone, Serialize)]
pub struct ClassReport {
    /// Class index into the dataset's class vocabulary.
    pub class: usize,
    /// Precision.
    pub precision: f64,
    /// Recall.
    pub recall: f64,
    /// F1 score.
    pub f1: f64,
    /// Held-out rows whose true class is this one.
    pub support: usize,
    /// Rows of this class that received no prediction.
    pub abstained: usize,
}

impl ValidationReport {
    /// Summarize a cross-validation run of `n_trees`-tree ensembles.
    #[must_use]
    pub fn new(n_trees: usize, result: &CrossValidationResult) -> Self {
        Self {
            n_trees,
            total: result.correct + result.incorrect,
            correct: result.correct,
            incorrect: result.incorrect,
            abstained: result.abstained,
            fold_accuracies: result.fold_accuracies.clone(),
            mean_accuracy: result.mean_accuracy,
            std_accuracy: result.std_accuracy,
            confusion_matrix: result.confusion_matrix.as_rows().to_vec(),
            class_metrics: result
                .confusion_matrix
                .class_metrics()
                .into_iter()
                .map(|m| ClassReport {
                    class: m.class,
                    precision: m.precision,
                    recall: m.recall,
                    f1: m.f1,
                    support: m.support,
                    abstained: m.abstained,
                })
                .collect(),
        }
    }

    /// Percentage of correct rows, 0.0 when nothing was evaluated.
    #[must_use]
    pub fn correct_percent(&self) -> f64 {
        percent(self.correct, self.total)
    }

    /// Percentage of incorrect rows, 0.0 when nothing was evaluated.
    #[must_use]
    pub fn incorrect_percent(&self) -> f64 {
        percent(self.incorrect, self.total)
    }
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 * 100.0 / total as f64
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total instances: {}", self.total)?;
        writeln!(
            f,
            "Correctly classified: {} ({:.2}%)",
            self.correct,
            self.correct_percent()
        )?;
        writeln!(
            f,
            "Incorrectly classified: {} ({:.2}%)",
            self.incorrect,
            self.incorrect_percent()
        )
    }
}

/// Reports for every ensemble size of one sweep, plus its wall-clock time.
#[derive(Debug, Clone)]
pub struct SweepReport {
    /// One report per ensemble size, in sweep order.
    pub entries: Vec<ValidationReport>,
    /// Wall-clock time for the whole sweep.
    pub elapsed: Duration,
}

impl fmt::Display for SweepReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(f, "=== {} tree(s) ===", entry.n_trees)?;
            write!(f, "{entry}")?;
            if entry.abstained > 0 {
                writeln!(f, "  ({} without prediction)", entry.abstained)?;
            }
            writeln!(f)?;
        }
        writeln!(f, "Elapsed: {:.3}s", self.elapsed.as_secs_f64())
    }
}
