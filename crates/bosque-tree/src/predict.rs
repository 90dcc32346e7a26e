//! Classification by a single tree and by majority vote over an ensemble.

use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

use crate::dataset::{Dataset, RowView};
use crate::forest::RandomForest;
use crate::node::TreeNode;
use crate::tree::DecisionTree;

impl DecisionTree {
    /// Classify one row, returning a class index.
    ///
    /// Descends from the root into the child whose edge the row's value
    /// satisfies. Returns `None` when no child matches, i.e. the row holds a
    /// categorical level unseen at that node or a cell of the wrong kind.
    #[must_use]
    pub fn classify(&self, row: RowView<'_>) -> Option<usize> {
        let mut node = &self.root;
        loop {
            match node {
                TreeNode::Leaf { prediction, .. } => return Some(*prediction),
                TreeNode::Split {
                    attribute,
                    children,
                    ..
                } => {
                    let cell = row.get(*attribute)?;
                    node = children
                        .iter()
                        .find(|child| child.edge().is_some_and(|edge| edge.admits(cell)))?;
                }
            }
        }
    }

    /// Classify one row, returning the class name.
    #[must_use]
    pub fn classify_label(&self, row: RowView<'_>) -> Option<&str> {
        self.classify(row).map(|class| self.class_name(class))
    }
}

/// Per-class vote counts for one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteTally {
    counts: Vec<usize>,
}

impl VoteTally {
    pub(crate) fn new(n_classes: usize) -> Self {
        Self {
            counts: vec![0; n_classes],
        }
    }

    pub(crate) fn record(&mut self, class: usize) {
        self.counts[class] += 1;
    }

    /// Return the class with the most votes, ties going to the lowest index.
    ///
    /// Returns `None` when no tree voted.
    #[must_use]
    pub fn winner(&self) -> Option<usize> {
        let mut best: Option<usize> = None;
        for (class, &count) in self.counts.iter().enumerate() {
            if count > 0 && best.is_none_or(|b| count > self.counts[b]) {
                best = Some(class);
            }
        }
        best
    }
}

impl RandomForest {
    /// Tally every tree's prediction for one row.
    ///
    /// Trees that cannot classify the row do not vote.
    #[must_use]
    pub fn votes(&self, row: RowView<'_>) -> VoteTally {
        let mut tally = VoteTally::new(self.classes.len());
        for class in self.trees.iter().filter_map(|tree| tree.classify(row)) {
            tally.record(class);
        }
        tally
    }

    /// Predict the majority-vote class for one row.
    #[must_use]
    pub fn predict(&self, row: RowView<'_>) -> Option<usize> {
        self.votes(row).winner()
    }

    /// Predict many rows of `dataset` in parallel.
    ///
    /// The result is aligned with `rows`.
    #[must_use]
    pub fn predict_batch(&self, dataset: &Dataset, rows: &[usize]) -> Vec<Option<usize>> {
        rows.par_iter()
            .map(|&r| self.predict(dataset.row(r)))
            .collect()
    }

    /// Return the class vocabulary predictions index into.
    #[must_use]
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Return the number of trees in the ensemble.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Borrow the trees in construction order.
    #[must_use]
    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::DecisionTreeConfig;

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    fn make_weather() -> Dataset {
        let records = vec![
            strings(&["Sunny", "30", "No"]),
            strings(&["Rain", "18", "Yes"]),
            strings(&["Rain", "20", "Yes"]),
            strings(&["Sunny", "28", "No"]),
            strings(&["Snow", "-2", "No"]),
        ];
        Dataset::from_records(strings(&["Weather", "Temp", "Play"]), records, "Play").unwrap()
    }

    #[test]
    fn classify_training_rows() {
        let ds = make_weather();
        let tree = DecisionTreeConfig::new().fit(&ds).unwrap();
        for r in 0..ds.n_rows() {
            assert_eq!(tree.classify(ds.row(r)), Some(ds.class_of(r)));
        }
        assert_eq!(tree.classify_label(ds.row(1)), Some("Yes"));
    }

    #[test]
    fn unseen_level_gives_no_prediction() {
        let train = Dataset::from_records(
            strings(&["Weather", "Play"]),
            vec![
                strings(&["Sunny", "No"]),
                strings(&["Rain", "Yes"]),
                strings(&["Rain", "Yes"]),
            ],
            "Play",
        )
        .unwrap();
        let tree = DecisionTreeConfig::new().fit(&train).unwrap();
        let snow = Dataset::from_records(
            strings(&["Weather", "Play"]),
            vec![strings(&["Snow", "No"])],
            "Play",
        )
        .unwrap();
        assert_eq!(tree.classify(snow.row(0)), None);
    }

    #[test]
    fn wrong_cell_kind_gives_no_prediction() {
        let train = Dataset::from_records(
            strings(&["Weather", "Play"]),
            vec![strings(&["Rain", "Yes"]), strings(&["Snow", "No"])],
            "Play",
        )
        .unwrap();
        let tree = DecisionTreeConfig::new().fit(&train).unwrap();
        // Weather parses as numeric here, so no categorical edge admits it.
        let numeric_weather = Dataset::from_records(
            strings(&["Weather", "Play"]),
            vec![strings(&["3", "No"])],
            "Play",
        )
        .unwrap();
        assert_eq!(tree.classify(numeric_weather.row(0)), None);
    }

    #[test]
    fn tally_winner_prefers_lowest_on_tie() {
        let mut tally = VoteTally::new(3);
        assert_eq!(tally.winner(), None);
        tally.record(2);
        tally.record(1);
        assert_eq!(tally.winner(), Some(1));
        tally.record(2);
        assert_eq!(tally.winner(), Some(2));
        tally.record(1);
        assert_eq!(tally.winner(), Some(1));
    }
}
