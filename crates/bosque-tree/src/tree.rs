use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, instrument};

use crate::{
    TreeError,
    dataset::Dataset,
    entropy::conditional_entropy,
    node::{AttributeIndex, Edge, TreeNode},
    split::{SplitRule, select_best_split},
};

/// Configuration for a single information-gain decision tree.
///
/// Construct via [`DecisionTreeConfig::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter           | Default               |
/// |---------------------|-----------------------|
/// | `max_features`      | `None` (all attributes) |
/// | `max_depth`         | `None` (unlimited)    |
/// | `min_samples_split` | 2                     |
/// | `seed`              | 42                    |
#[derive(Debug, Clone)]
pub struct DecisionTreeConfig {
    pub(crate) max_features: Option<usize>,
    pub(crate) max_depth: Option<usize>,
    pub(crate) min_samples_split: usize,
    pub(crate) seed: u64,
}

impl DecisionTreeConfig {
    /// Create a new config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_features: None,
            max_depth: None,
            min_samples_split: 2,
            seed: 42,
        }
    }

    /// Set how many candidate attributes are drawn at each node.
    ///
    /// `None` means every attribute is a candidate.
    #[must_use]
    pub fn with_max_features(mut self, max_features: Option<usize>) -> Self {
        self.max_features = max_features;
        self
    }

    /// Set the maximum tree depth (root is depth 0). `None` means unlimited.
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

    /// Set the random seed for candidate sampling.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    // --- Getters ---

    /// Return the candidate sample size per node, if set.
    #[must_use]
    pub fn max_features(&self) -> Option<usize> {
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

    /// Induce a tree from every row of `dataset`.
    ///
    /// # Errors
    ///
    /// See [`DecisionTreeConfig::fit_rows`].
    pub fn fit(&self, dataset: &Dataset) -> Result<DecisionTree, TreeError> {
        let rows: Vec<usize> = (0..dataset.n_rows()).collect();
        self.fit_rows(dataset, &rows)
    }

    /// Induce a tree from a subset of rows (duplicates allowed).
    ///
    /// # Errors
    ///
    /// | Variant | When |
    /// |---|---|
    /// | [`TreeError::EmptyDataset`]           | `rows` is empty                               |
    /// | [`TreeError::RowOutOfRange`]          | a row index is past the end of `dataset`      |
    /// | [`TreeError::InvalidMaxDepth`]        | `max_depth` is `Some(0)`                      |
    /// | [`TreeError::InvalidMinSamplesSplit`] | `min_samples_split` < 2                       |
    /// | [`TreeError::InvalidMaxFeatures`]     | `max_features` outside [1, n_attributes]      |
    #[instrument(skip(self, dataset, rows), fields(n_rows = rows.len()))]
    pub fn fit_rows(&self, dataset: &Dataset, rows: &[usize]) -> Result<DecisionTree, TreeError> {
        if rows.is_empty() {
            return Err(TreeError::EmptyDataset);
        }
        dataset.check_rows(rows)?;

        if let Some(d) = self.max_depth
            && d == 0
        {
            return Err(TreeError::InvalidMaxDepth { max_depth: 0 });
        }

        if self.min_samples_split < 2 {
            return Err(TreeError::InvalidMinSamplesSplit {
                min_samples_split: self.min_samples_split,
            });
        }

        let candidates = dataset.candidate_attributes();
        let n_attributes = candidates.len();
        let max_features = self.max_features.unwrap_or(n_attributes);
        if max_features == 0 || max_features > n_attributes {
            return Err(TreeError::InvalidMaxFeatures {
                max_features,
                n_attributes,
            });
        }

        debug!(
            n_rows = rows.len(),
            n_attributes,
            n_classes = dataset.n_classes(),
            max_features,
            "fitting decision tree"
        );

        let mut grower = Grower {
            dataset,
            config: self,
            candidates,
            max_features,
            rng: ChaCha8Rng::seed_from_u64(self.seed),
        };
        let root = grower.build_node(rows, rows, None, 0);

        debug!(
            n_nodes = root.n_nodes(),
            depth = root.depth(),
            "decision tree built"
        );

        Ok(DecisionTree {
            root,
            attribute_names: dataset.attribute_names().to_vec(),
            classes: dataset.classes().to_vec(),
            label: dataset.label_index(),
        })
    }
}

impl Default for DecisionTreeConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Recursion state shared by every node of one induction.
struct Grower<'a> {
    dataset: &'a Dataset,
    config: &'a DecisionTreeConfig,
    candidates: Vec<AttributeIndex>,
    max_features: usize,
    rng: ChaCha8Rng,
}

impl Grower<'_> {
    /// Build the subtree for `rows`, reached from its parent through `edge`.
    ///
    /// `parent_rows` supplies the fallback prediction for an empty branch.
    fn build_node(
        &mut self,
        rows: &[usize],
        parent_rows: &[usize],
        edge: Option<Edge>,
        depth: usize,
    ) -> TreeNode {
        let n_rows = rows.len();

        if rows.is_empty() {
            return TreeNode::Leaf {
                edge,
                prediction: self.dataset.majority_class(parent_rows).unwrap_or(0),
                n_rows,
            };
        }

        if conditional_entropy(self.dataset, rows) == 0.0 {
            return TreeNode::Leaf {
                edge,
                prediction: self.dataset.class_of(rows[0]),
                n_rows,
            };
        }

        let majority_leaf = |edge: Option<Edge>| TreeNode::Leaf {
            edge,
            prediction: self.dataset.majority_class(rows).unwrap_or(0),
            n_rows,
        };

        let depth_exceeded = self.config.max_depth.is_some_and(|max_d| depth >= max_d);
        if depth_exceeded || n_rows < self.config.min_samples_split {
            return majority_leaf(edge);
        }

        // Attributes constant over these rows cannot separate anything.
        let mut splittable: Vec<AttributeIndex> = self
            .candidates
            .iter()
            .copied()
            .filter(|&a| self.dataset.is_splittable(a, rows))
            .collect();
        if splittable.is_empty() {
            return majority_leaf(edge);
        }

        // Partial Fisher-Yates: shuffle only the first `take` positions.
        let take = self.max_features.min(splittable.len());
        for i in 0..take {
            let j = self.rng.gen_range(i..splittable.len());
            splittable.swap(i, j);
        }
        let selected = &splittable[..take];

        let Some((attribute, gain)) = select_best_split(self.dataset, selected, rows) else {
            return majority_leaf(edge);
        };
        let Some(rule) = SplitRule::for_attribute(self.dataset, attribute, rows) else {
            return majority_leaf(edge);
        };
        let branches = rule.partition(self.dataset, rows);

        // A mean that rounds onto the maximum leaves one branch holding every row.
        if branches.iter().any(|(_, branch)| branch.len() == n_rows) {
            return majority_leaf(edge);
        }

        let children = branches
            .into_iter()
            .map(|(child_edge, branch)| self.build_node(&branch, rows, Some(child_edge), depth + 1))
            .collect();

        TreeNode::Split {
            edge,
            attribute,
            gain,
            n_rows,
            children,
        }
    }
}

/// A fitted decision tree together with the schema needed to read it.
#[derive(Debug, Clone)]
pub struct DecisionTree {
    pub(crate) root: TreeNode,
    pub(crate) attribute_names: Vec<String>,
    pub(crate) classes: Vec<String>,
    pub(crate) label: AttributeIndex,
}

impl DecisionTree {
    /// Borrow the root node.
    #[must_use]
    pub fn root(&self) -> &TreeNode {
        &self.root
    }

    /// Return the name of an attribute of the training schema.
    #[must_use]
    pub fn attribute_name(&self, attribute: AttributeIndex) -> &str {
        &self.attribute_names[attribute.index()]
    }

    /// Return the name of the label attribute.
    #[must_use]
    pub fn label_name(&self) -> &str {
        self.attribute_name(self.label)
    }

    /// Return the class vocabulary predictions index into.
    #[must_use]
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Return the name of a predicted class.
    #[must_use]
    pub fn class_name(&self, class: usize) -> &str {
        &self.classes[class]
    }

    /// Return the total number of nodes (splits and leaves).
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.root.n_nodes()
    }

    /// Return the number of leaf nodes.
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.root.n_leaves()
    }

    /// Return the maximum depth; a single-leaf tree has depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.root.depth()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    fn dataset(header: &[&str], rows: &[&[&str]], label: &str) -> Dataset {
        let records = rows.iter().map(|r| strings(r)).collect();
        Dataset::from_records(strings(header), records, label).unwrap()
    }

    fn make_weather() -> Dataset {
        dataset(
            &["Weather", "Play"],
            &[
                &["Sunny", "No"],
                &["Rain", "Yes"],
                &["Rain", "Yes"],
                &["Sunny", "No"],
            ],
            "Play",
        )
    }

    #[test]
    fn empty_rows_error() {
        let ds = make_weather();
        let err = DecisionTreeConfig::new().fit_rows(&ds, &[]).unwrap_err();
        assert!(matches!(err, TreeError::EmptyDataset));
    }

    #[test]
    fn pure_dataset_single_leaf() {
        let ds = dataset(&["x", "y"], &[&["1", "A"], &["2", "A"], &["3", "A"]], "y");
        let tree = DecisionTreeConfig::new().fit(&ds).unwrap();
        assert_eq!(tree.n_nodes(), 1);
        assert!(matches!(tree.root(), TreeNode::Leaf { prediction: 0, edge: None, .. }));
        assert_eq!(tree.class_name(0), "A");
    }

    #[test]
    fn weather_splits_into_two_leaves() {
        let ds = make_weather();
        let tree = DecisionTreeConfig::new().fit(&ds).unwrap();
        let TreeNode::Split {
            attribute,
            gain,
            children,
            edge,
            ..
        } = tree.root()
        else {
            panic!("root should split");
        };
        assert!(edge.is_none());
        assert_eq!(tree.attribute_name(*attribute), "Weather");
        assert!((gain - 1.0).abs() < 1e-12);
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].edge(), Some(&Edge::Category("Sunny".into())));
        assert_eq!(children[1].edge(), Some(&Edge::Category("Rain".into())));
        assert!(matches!(children[0], TreeNode::Leaf { prediction: 0, .. }));
        assert!(matches!(children[1], TreeNode::Leaf { prediction: 1, .. }));
        assert_eq!(tree.class_name(0), "No");
        assert_eq!(tree.class_name(1), "Yes");
        assert_eq!(tree.label_name(), "Play");
    }

    #[test]
    fn contradictory_rows_become_majority_leaf() {
        let ds = dataset(
            &["x", "y"],
            &[&["1", "A"], &["1", "B"], &["1", "B"]],
            "y",
        );
        let tree = DecisionTreeConfig::new().fit(&ds).unwrap();
        assert!(matches!(tree.root(), TreeNode::Leaf { prediction: 1, n_rows: 3, .. }));
    }

    #[test]
    fn constant_attribute_is_skipped() {
        // `c` is constant; XOR on a/b still needs two levels of splits.
        let ds = dataset(
            &["c", "a", "b", "y"],
            &[
                &["k", "0", "0", "F"],
                &["k", "0", "1", "T"],
                &["k", "1", "0", "T"],
                &["k", "1", "1", "F"],
            ],
            "y",
        );
        let tree = DecisionTreeConfig::new().fit(&ds).unwrap();
        assert_eq!(tree.depth(), 2);
        assert_eq!(tree.n_leaves(), 4);
    }

    #[test]
    fn numeric_thresholds_recomputed_per_node() {
        // Root splits x at mean 5.5; the right subtree splits x again at
        // the mean of its own rows.
        let ds = dataset(
            &["x", "y"],
            &[
                &["1", "A"],
                &["2", "A"],
                &["8", "B"],
                &["9", "C"],
                &["10", "C"],
                &["3", "A"],
            ],
            "y",
        );
        let tree = DecisionTreeConfig::new().fit(&ds).unwrap();
        let root = tree.root();
        assert_eq!(root.children()[0].edge(), Some(&Edge::AtMost(5.5)));
        assert_eq!(root.children()[1].edge(), Some(&Edge::Above(5.5)));
        let right = &root.children()[1];
        assert_eq!(right.children()[0].edge(), Some(&Edge::AtMost(9.0)));
        assert!(matches!(right.children()[0], TreeNode::Split { .. }));
        let inner = &right.children()[0];
        assert_eq!(inner.children()[0].edge(), Some(&Edge::AtMost(8.5)));
    }

    #[test]
    fn sibling_subtrees_use_their_own_means() {
        // Root splits x at 4.5; both halves are mixed and re-split x, at
        // 2.5 on the left and 6.5 on the right.
        let ds = dataset(
            &["x", "y"],
            &[
                &["1", "a"],
                &["2", "b"],
                &["3", "a"],
                &["4", "a"],
                &["5", "b"],
                &["6", "b"],
                &["7", "a"],
                &["8", "b"],
            ],
            "y",
        );
        let tree = DecisionTreeConfig::new().fit(&ds).unwrap();
        let root = tree.root();
        assert_eq!(root.children()[0].edge(), Some(&Edge::AtMost(4.5)));

        let left = &root.children()[0];
        let right = &root.children()[1];
        assert!(matches!(left, TreeNode::Split { .. }));
        assert!(matches!(right, TreeNode::Split { .. }));
        assert_eq!(left.children()[0].edge(), Some(&Edge::AtMost(2.5)));
        assert_eq!(left.children()[1].edge(), Some(&Edge::Above(2.5)));
        assert_eq!(right.children()[0].edge(), Some(&Edge::AtMost(6.5)));
        assert_eq!(right.children()[1].edge(), Some(&Edge::Above(6.5)));
        assert_ne!(left.children()[0].edge(), right.children()[0].edge());
    }

    #[test]
    fn max_depth_limits_tree() {
        let ds = dataset(
            &["a", "b", "y"],
            &[
                &["0", "0", "F"],
                &["0", "1", "T"],
                &["1", "0", "T"],
                &["1", "1", "F"],
            ],
            "y",
        );
        let tree = DecisionTreeConfig::new()
            .with_max_depth(Some(1))
            .fit(&ds)
            .unwrap();
        assert!(tree.depth() <= 1);
    }

    #[test]
    fn invalid_config_errors() {
        let ds = make_weather();
        assert!(matches!(
            DecisionTreeConfig::new().with_max_depth(Some(0)).fit(&ds),
            Err(TreeError::InvalidMaxDepth { .. })
        ));
        assert!(matches!(
            DecisionTreeConfig::new().with_min_samples_split(1).fit(&ds),
            Err(TreeError::InvalidMinSamplesSplit { .. })
        ));
        assert!(matches!(
            DecisionTreeConfig::new().with_max_features(Some(2)).fit(&ds),
            Err(TreeError::InvalidMaxFeatures { max_features: 2, n_attributes: 1 })
        ));
    }

    #[test]
    fn deterministic_with_same_seed() {
        let ds = dataset(
            &["a", "b", "c", "y"],
            &[
                &["1", "x", "5", "P"],
                &["2", "y", "3", "Q"],
                &["3", "x", "4", "P"],
                &["4", "z", "1", "Q"],
                &["5", "y", "2", "P"],
                &["6", "x", "9", "Q"],
            ],
            "y",
        );
        let config = DecisionTreeConfig::new().with_max_features(Some(1)).with_seed(7);
        let t1 = config.fit(&ds).unwrap();
        let t2 = config.fit(&ds).unwrap();
        assert_eq!(t1.n_nodes(), t2.n_nodes());
        assert_eq!(t1.depth(), t2.depth());
    }
}
