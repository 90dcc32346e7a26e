//! Configuration builder for ensemble training.

use crate::dataset::Dataset;
use crate::error::TreeError;
use crate::forest::RandomForest;

/// Strategy for the number of candidate attributes drawn at each split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxFeatures {
    /// Square root of the attribute count, rounded to the nearest integer.
    Sqrt,
    /// A fixed count.
    Fixed(usize),
    /// Every attribute (no subsampling).
    All,
}

impl MaxFeatures {
    /// Resolve to a concrete candidate count for `n_attributes` attributes.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::InvalidMaxFeatures`] if the count is 0 or
    /// exceeds `n_attributes`.
    pub fn resolve(self, n_attributes: usize) -> Result<usize, TreeError> {
        let resolved = match self {
            MaxFeatures::Sqrt => ((n_attributes as f64).sqrt().round() as usize).max(1),
            MaxFeatures::Fixed(n) => n,
            MaxFeatures::All => n_attributes,
        };
        if resolved == 0 || resolved > n_attributes {
            return Err(TreeError::InvalidMaxFeatures {
                max_features: resolved,
                n_attributes,
            });
        }
        Ok(resolved)
    }
}

/// Configuration for bootstrap ensemble training.
///
/// Construct via [`RandomForestConfig::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter            | Default     |
/// |----------------------|-------------|
/// | `max_features`       | `Sqrt`      |
/// | `max_depth`          | `None`      |
/// | `min_samples_split`  | 2           |
/// | `seed`               | 42          |
/// | `bootstrap_fraction` | 0.632       |
#[derive(Debug, Clone)]
pub struct RandomForestConfig {
    pub(crate) n_trees: usize,
    pub(crate) max_features: MaxFeatures,
    pub(crate) max_depth: Option<usize>,
    pub(crate) min_samples_split: usize,
    pub(crate) seed: u64,
    pub(crate) bootstrap_fraction: f64,
}

impl RandomForestConfig {
    /// Default share of the training rows drawn for each tree.
    pub const DEFAULT_BOOTSTRAP_FRACTION: f64 = 0.632;

    /// Create a new config with the given number of trees.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::InvalidTreeCount`] if `n_trees` is zero.
    pub fn new(n_trees: usize) -> Result<Self, TreeError> {
        if n_trees == 0 {
            return Err(TreeError::InvalidTreeCount { n_trees });
        }
        Ok(Self {
            n_trees,
            max_features: MaxFeatures::Sqrt,
            max_depth: None,
            min_samples_split: 2,
            seed: 42,
            bootstrap_fraction: Self::DEFAULT_BOOTSTRAP_FRACTION,
        })
    }

    // --- Setters ---

    /// Set the max features strategy.
    #[must_use]
    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    /// Set the maximum tree depth. `None` means unlimited.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the minimum number of rows required to attempt a split.
    #[must_use]
    pub fn with_min_samples_split(mut self, min_samples_split: usize) -> Self {
        self.min_samples_split = min_samples_split;
        self
    }

    /// Set the random seed for reproducibility.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the bootstrap fraction (share of training rows drawn per tree).
    #[must_use]
    pub fn with_bootstrap_fraction(mut self, bootstrap_fraction: f64) -> Self {
        self.bootstrap_fraction = bootstrap_fraction;
        self
    }

    // --- Getters ---

    /// Return the number of trees.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.n_trees
    }

    /// Return the max features strategy.
    #[must_use]
    pub fn max_features(&self) -> MaxFeatures {
        self.max_features
    }

    /// Return the maximum depth limit, if any.
    #[must_use]
    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    /// Return the minimum rows required to split a node.
    #[must_use]
    pub fn min_samples_split(&self) -> usize {
        self.min_samples_split
    }

    /// Return the random seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Return the bootstrap fraction.
    #[must_use]
    pub fn bootstrap_fraction(&self) -> f64 {
        self.bootstrap_fraction
    }

    /// Train an ensemble on every row of `dataset`.
    ///
    /// # Errors
    ///
    /// See [`RandomForestConfig::fit_rows`].
    pub fn fit(&self, dataset: &Dataset) -> Result<RandomForest, TreeError> {
        let rows: Vec<usize> = (0..dataset.n_rows()).collect();
        self.fit_rows(dataset, &rows)
    }

    /// Train an ensemble on a subset of the rows of `dataset`.
    ///
    /// # Errors
    ///
    /// | Variant | When |
    /// |---|---|
    /// | [`TreeError::EmptyDataset`] | `rows` is empty |
    /// | [`TreeError::RowOutOfRange`] | a row index is past the end of `dataset` |
    /// | [`TreeError::InvalidMaxFeatures`] | resolved max_features is outside [1, n_attributes] |
    /// | [`TreeError::InvalidBootstrapFraction`] | bootstrap_fraction is not in (0.0, 1.0] |
    /// | [`TreeError::InvalidMaxDepth`] | `max_depth` is `Some(0)` |
    /// | [`TreeError::InvalidMinSamplesSplit`] | `min_samples_split` < 2 |
    pub fn fit_rows(&self, dataset: &Dataset, rows: &[usize]) -> Result<RandomForest, TreeError> {
        crate::forest::train(self, dataset, rows)
    }
}
