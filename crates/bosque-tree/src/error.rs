/// Errors from dataset construction, tree induction and evaluation.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// Returned when n_trees is zero.
    #[error("n_trees must be at least 1, got {n_trees}")]
    InvalidTreeCount {
        /// The invalid n_trees value provided.
        n_trees: usize,
    },

    /// Returned when max_depth is zero.
    #[error("max_depth must be at least 1, got {max_depth}")]
    InvalidMaxDepth {
        /// The invalid max_depth value provided.
        max_depth: usize,
    },

    /// Returned when min_samples_split is less than 2.
    #[error("min_samples_split must be at least 2, got {min_samples_split}")]
    InvalidMinSamplesSplit {
        /// The invalid min_samples_split value provided.
        min_samples_split: usize,
    },

    /// Returned when max_features resolves to 0 or exceeds the attribute count.
    #[error("max_features resolved to {max_features}, but must be in [1, {n_attributes}]")]
    InvalidMaxFeatures {
        /// The resolved max_features value.
        max_features: usize,
        /// The number of candidate attributes (label excluded).
        n_attributes: usize,
    },

    /// Returned when bootstrap_fraction is not in (0.0, 1.0].
    #[error("bootstrap_fraction must be in (0.0, 1.0], got {fraction}")]
    InvalidBootstrapFraction {
        /// The invalid bootstrap_fraction value provided.
        fraction: f64,
    },

    /// Returned when n_folds is less than 2.
    #[error("n_folds must be at least 2, got {n_folds}")]
    InvalidFoldCount {
        /// The invalid n_folds value provided.
        n_folds: usize,
    },

    /// Returned when the dataset has fewer rows than requested folds.
    #[error("{n_folds}-fold cross-validation needs at least {n_folds} rows, got {n_rows}")]
    TooFewRowsForFolds {
        /// Number of rows in the dataset.
        n_rows: usize,
        /// The requested number of folds.
        n_folds: usize,
    },

    /// Returned when a dataset or row selection has zero rows.
    #[error("dataset has zero rows")]
    EmptyDataset,

    /// Returned when the schema has no attribute besides the label.
    #[error("dataset has no attribute columns besides the label \"{label}\"")]
    NoAttributes {
        /// Name of the label attribute.
        label: String,
    },

    /// Returned when the label attribute is not part of the header.
    #[error("label attribute \"{label}\" not found in header")]
    UnknownLabel {
        /// The requested label attribute name.
        label: String,
    },

    /// Returned when two header columns share a name.
    #[error("duplicate attribute name \"{name}\" in header")]
    DuplicateAttribute {
        /// The duplicated attribute name.
        name: String,
    },

    /// Returned when a record has a different number of cells than the header.
    #[error("row {row_index} has {got} cells, expected {expected}")]
    RowLengthMismatch {
        /// Zero-based index of the offending record.
        row_index: usize,
        /// Number of header columns.
        expected: usize,
        /// Number of cells in the record.
        got: usize,
    },

    /// Returned when a row selection refers past the end of the dataset.
    #[error("row index {row_index} out of range for dataset with {n_rows} rows")]
    RowOutOfRange {
        /// The offending row index.
        row_index: usize,
        /// Number of rows in the dataset.
        n_rows: usize,
    },
}
