//! Information-gain decision trees: induce, classify, ensemble, validate.
//!
//! Provides a tagged-column [`Dataset`], ID3-style entropy and information
//! gain, recursive tree induction with mean-threshold numeric splits and
//! per-level categorical splits, bootstrap ensembles voting by simple
//! majority, and k-fold cross-validation with a confusion matrix.

mod config;
mod confusion;
mod dataset;
mod entropy;
mod error;
mod eval;
mod forest;
mod node;
mod predict;
mod split;
mod tree;

pub use config::{MaxFeatures, RandomForestConfig};
pub use confusion::{ClassMetrics, ConfusionMatrix};
pub use dataset::{Column, ColumnKind, Dataset, RowView};
pub use entropy::{class_entropy, conditional_entropy, entropy_from_counts};
pub use error::TreeError;
pub use eval::{CrossValidation, CrossValidationResult, k_fold_partition};
pub use forest::{RandomForest, bootstrap_sample};
pub use node::{AttributeIndex, Cell, Edge, TreeNode};
pub use predict::VoteTally;
pub use split::{SplitRule, information_gain, select_best_split};
pub use tree::{DecisionTree, DecisionTreeConfig};
