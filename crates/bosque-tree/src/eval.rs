//! k-fold cross-validation of the bootstrap ensemble.

use rand::Rng;
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use tracing::{info, instrument};

use crate::config::RandomForestConfig;
use crate::confusion::ConfusionMatrix;
use crate::dataset::Dataset;
use crate::error::TreeError;

/// Cross-validation configuration.
///
/// Construct via [`CrossValidation::new`], then chain `with_seed` if desired.
#[derive(Debug, Clone)]
pub struct CrossValidation {
    n_folds: usize,
    seed: u64,
}

/// Results of k-fold cross-validation.
#[derive(Debug, Clone)]
pub struct CrossValidationResult {
    /// Held-out rows whose majority vote matched their class.
    pub correct: usize,
    /// Held-out rows that were misclassified or received no prediction.
    pub incorrect: usize,
    /// Held-out rows no tree could classify. Already included in `incorrect`.
    pub abstained: usize,
    /// Accuracy for each fold, in fold order.
    pub fold_accuracies: Vec<f64>,
    /// Mean accuracy across folds.
    pub mean_accuracy: f64,
    /// Population standard deviation of fold accuracies.
    pub std_accuracy: f64,
    /// Outcome counts summed over folds, abstentions kept per true class.
    pub confusion_matrix: ConfusionMatrix,
    /// Number of folds.
    pub n_folds: usize,
    /// Total number of rows evaluated.
    pub n_rows: usize,
}

impl CrossValidationResult {
    /// Share of all held-out rows classified correctly.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        let total = self.correct + self.incorrect;
        if total == 0 {
            0.0
        } else {
            self.correct as f64 / total as f64
        }
    }
}

/// Shuffle `0..n_rows` once and cut it into `k` contiguous folds.
///
/// Fold sizes are `n_rows / k` or one more; the larger folds come first.
/// Returns empty folds when `k` exceeds `n_rows`.
#[must_use]
pub fn k_fold_partition(n_rows: usize, k: usize, rng: &mut impl Rng) -> Vec<Vec<usize>> {
    if k == 0 {
        return Vec::new();
    }
    let mut order: Vec<usize> = (0..n_rows).collect();
    order.shuffle(rng);

    let base = n_rows / k;
    let remainder = n_rows % k;
    let mut folds = Vec::with_capacity(k);
    let mut start = 0;
    for fold in 0..k {
        let size = base + usize::from(fold < remainder);
        folds.push(order[start..start + size].to_vec());
        start += size;
    }
    folds
}

impl CrossValidation {
    /// Create a new cross-validation config with the given number of folds.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::InvalidFoldCount`] if `n_folds` < 2.
    pub fn new(n_folds: usize) -> Result<Self, TreeError> {
        if n_folds < 2 {
            return Err(TreeError::InvalidFoldCount { n_folds });
        }
        Ok(Self { n_folds, seed: 42 })
    }

    /// Set the random seed for fold shuffling.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Return the number of folds.
    #[must_use]
    pub fn n_folds(&self) -> usize {
        self.n_folds
    }

    /// Run k-fold cross-validation.
    ///
    /// Each fold is held out once while an ensemble trained on the other
    /// folds votes on every held-out row.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`TreeError::EmptyDataset`] | Zero rows |
    /// | [`TreeError::TooFewRowsForFolds`] | Fewer rows than folds |
    /// | Other tree errors | From underlying training |
    #[instrument(skip_all, fields(n_folds = self.n_folds, n_rows = dataset.n_rows()))]
    pub fn evaluate(
        &self,
        config: &RandomForestConfig,
        dataset: &Dataset,
    ) -> Result<CrossValidationResult, TreeError> {
        let n_rows = dataset.n_rows();
        if n_rows == 0 {
            return Err(TreeError::EmptyDataset);
        }
        if n_rows < self.n_folds {
            return Err(TreeError::TooFewRowsForFolds {
                n_rows,
                n_folds: self.n_folds,
            });
        }

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let folds = k_fold_partition(n_rows, self.n_folds, &mut rng);

        let mut fold_accuracies = Vec::with_capacity(self.n_folds);
        let mut confusion_matrix = ConfusionMatrix::new(dataset.n_classes());
        let mut correct = 0;
        let mut incorrect = 0;
        let mut abstained = 0;

        for (fold, test_rows) in folds.iter().enumerate() {
            let train_rows: Vec<usize> = folds
                .iter()
                .enumerate()
                .filter(|&(other, _)| other != fold)
                .flat_map(|(_, rows)| rows.iter().copied())
                .collect();

            // Each fold trains with its own randomness.
            let fold_config = config.clone().with_seed(config.seed.wrapping_add(fold as u64));
            let forest = fold_config.fit_rows(dataset, &train_rows)?;
            let predictions = forest.predict_batch(dataset, test_rows);

            let mut fold_correct = 0;
            for (&row, prediction) in test_rows.iter().zip(&predictions) {
                let truth = dataset.class_of(row);
                confusion_matrix.record(truth, *prediction);
                match *prediction {
                    Some(predicted) if predicted == truth => fold_correct += 1,
                    Some(_) => {}
                    None => abstained += 1,
                }
            }
            correct += fold_correct;
            incorrect += test_rows.len() - fold_correct;

            let fold_accuracy = fold_correct as f64 / test_rows.len() as f64;
            fold_accuracies.push(fold_accuracy);

            info!(
                fold,
                n_train = train_rows.len(),
                n_test = test_rows.len(),
                accuracy = fold_accuracy,
                "fold completed"
            );
        }

        let mean_accuracy = fold_accuracies.iter().sum::<f64>() / self.n_folds as f64;
        let std_accuracy = {
            let variance = fold_accuracies
                .iter()
                .map(|&a| (a - mean_accuracy).powi(2))
                .sum::<f64>()
                / self.n_folds as f64;
            variance.sqrt()
        };

        info!(
            correct,
            incorrect,
            abstained,
            mean_accuracy,
            std_accuracy,
            "cross-validation complete"
        );

        Ok(CrossValidationResult {
            correct,
            incorrect,
            abstained,
            fold_accuracies,
            mean_accuracy,
            std_accuracy,
            confusion_matrix,
            n_folds: self.n_folds,
            n_rows,
        })
    }
}
