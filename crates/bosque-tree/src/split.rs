use crate::dataset::{Column, Dataset};
use crate::entropy::{class_entropy, conditional_entropy};
use crate::node::{AttributeIndex, Edge};

/// How the rows of one node are partitioned on an attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum SplitRule {
    /// Two branches around the mean of the node's rows: `<=` then `>`.
    Numeric {
        /// Attribute being split.
        attribute: AttributeIndex,
        /// Mean of the attribute over the node's rows.
        threshold: f64,
    },
    /// One branch per observed level, in order of first appearance.
    Categorical {
        /// Attribute being split.
        attribute: AttributeIndex,
        /// Level codes observed in the node's rows.
        levels: Vec<usize>,
    },
}

impl SplitRule {
    /// Derive the split policy for `attribute` from the rows of one node.
    ///
    /// The numeric threshold is recomputed from `rows` on every call, so the
    /// same attribute may split at different values in different subtrees.
    /// Returns `None` for an empty row set.
    #[must_use]
    pub fn for_attribute(
        dataset: &Dataset,
        attribute: AttributeIndex,
        rows: &[usize],
    ) -> Option<Self> {
        if rows.is_empty() {
            return None;
        }
        match dataset.column(attribute) {
            Column::Numeric(_) => Some(SplitRule::Numeric {
                attribute,
                threshold: dataset.mean(attribute, rows)?,
            }),
            Column::Categorical { .. } => Some(SplitRule::Categorical {
                attribute,
                levels: dataset.distinct_levels(attribute, rows),
            }),
        }
    }

    /// Return the attribute this rule splits on.
    #[must_use]
    pub fn attribute(&self) -> AttributeIndex {
        match self {
            SplitRule::Numeric { attribute, .. } | SplitRule::Categorical { attribute, .. } => {
                *attribute
            }
        }
    }

    /// Partition `rows` into labeled branches, in enumeration order.
    ///
    /// Rows equal to a numeric threshold go to the `<=` branch.
    #[must_use]
    pub fn partition(&self, dataset: &Dataset, rows: &[usize]) -> Vec<(Edge, Vec<usize>)> {
        match (self, dataset.column(self.attribute())) {
            (SplitRule::Numeric { threshold, .. }, Column::Numeric(values)) => {
                let (at_most, above): (Vec<usize>, Vec<usize>) =
                    rows.iter().partition(|&&r| values[r] <= *threshold);
                vec![
                    (Edge::AtMost(*threshold), at_most),
                    (Edge::Above(*threshold), above),
                ]
            }
            (SplitRule::Categorical { attribute, levels }, Column::Categorical { codes, .. }) => {
                let mut slot = vec![None; dataset.level_count(*attribute)];
                for (branch, &code) in levels.iter().enumerate() {
                    slot[code] = Some(branch);
                }
                let mut branches: Vec<Vec<usize>> = vec![Vec::new(); levels.len()];
                for &r in rows {
                    if let Some(branch) = slot[codes[r]] {
                        branches[branch].push(r);
                    }
                }
                levels
                    .iter()
                    .zip(branches)
                    .map(|(&code, branch_rows)| {
                        (
                            Edge::Category(dataset.level(*attribute, code).to_string()),
                            branch_rows,
                        )
                    })
                    .collect()
            }
            _ => Vec::new(),
        }
    }
}

/// Information gain of splitting `rows` on `attribute`, in bits.
///
/// `class_entropy(rows) − Σ_b (|b|/n)·conditional_entropy(b)` over the
/// branches of the attribute's [`SplitRule`]. Never negative; 0 for an
/// empty row set.
#[must_use]
pub fn information_gain(dataset: &Dataset, attribute: AttributeIndex, rows: &[usize]) -> f64 {
    let Some(rule) = SplitRule::for_attribute(dataset, attribute, rows) else {
        return 0.0;
    };
    gain_of(dataset, &rule, rows)
}

pub(crate) fn gain_of(dataset: &Dataset, rule: &SplitRule, rows: &[usize]) -> f64 {
    let n = rows.len() as f64;
    let remainder: f64 = rule
        .partition(dataset, rows)
        .iter()
        .map(|(_, branch)| branch.len() as f64 / n * conditional_entropy(dataset, branch))
        .sum();
    // Conditioning cannot raise entropy; clamp float round-off.
    (class_entropy(dataset, rows) - remainder).max(0.0)
}

/// Pick the candidate with the strictly greatest information gain.
///
/// The comparison starts at −1 so the first candidate always wins over
/// nothing; ties keep the earlier candidate. Returns `None` when
/// `candidates` or `rows` is empty. `candidates` must not contain the label.
#[must_use]
pub fn select_best_split(
    dataset: &Dataset,
    candidates: &[AttributeIndex],
    rows: &[usize],
) -> Option<(AttributeIndex, f64)> {
    if rows.is_empty() {
        return None;
    }
    debug_assert!(
        !candidates.contains(&dataset.label_index()),
        "label attribute among split candidates"
    );
    let mut best_gain = -1.0;
    let mut best = None;
    for &attribute in candidates {
        let gain = information_gain(dataset, attribute, rows);
        if gain > best_gain {
            best_gain = gain;
            best = Some((attribute, gain));
        }
    }
    best
}
