//! Per-class outcome counts of held-out classification, abstentions included.

use std::fmt;

/// Outcome counts of classifying held-out rows, indexed by true class.
///
/// `as_rows()[t][p]` counts rows of true class `t` predicted as `p`.
/// Rows that received no prediction are kept per true class in a separate
/// column, so each row sum plus its abstentions is the true class count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfusionMatrix {
    predicted: Vec<Vec<usize>>,
    abstained: Vec<usize>,
}

/// Per-class precision, recall, and F1 score.
#[derive(Debug, Clone)]
pub struct ClassMetrics {
    /// The class index.
    pub class: usize,
    /// Share of rows predicted as this class that truly are. 0.0 if never predicted.
    pub precision: f64,
    /// Share of this class's rows predicted correctly. Abstentions count as misses.
    pub recall: f64,
    /// Harmonic mean of precision and recall, 0.0 if both are zero.
    pub f1: f64,
    /// Rows whose true class is this one, predicted or not.
    pub support: usize,
    /// Rows of this class that received no prediction.
    pub abstained: usize,
}

impl ConfusionMatrix {
    /// Create an all-zero matrix for `n_classes` classes.
    #[must_use]
    pub fn new(n_classes: usize) -> Self {
        Self {
            predicted: vec![vec![0; n_classes]; n_classes],
            abstained: vec![0; n_classes],
        }
    }

    /// Count one held-out row. `None` records an abstention.
    pub fn record(&mut self, true_class: usize, prediction: Option<usize>) {
        match prediction {
            Some(class) => self.predicted[true_class][class] += 1,
            None => self.abstained[true_class] += 1,
        }
    }

    /// Share of recorded rows predicted correctly; abstentions count as wrong.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        let correct: usize = (0..self.n_classes()).map(|c| self.predicted[c][c]).sum();
        let n_rows = self.n_rows();
        if n_rows == 0 {
            0.0
        } else {
            correct as f64 / n_rows as f64
        }
    }

    /// Per-class precision, recall, F1, support and abstentions.
    #[must_use]
    pub fn class_metrics(&self) -> Vec<ClassMetrics> {
        (0..self.n_classes())
            .map(|c| {
                let hits = self.predicted[c][c];
                let predicted_as: usize = self.predicted.iter().map(|row| row[c]).sum();
                let support = self.predicted[c].iter().sum::<usize>() + self.abstained[c];
                let precision = ratio(hits, predicted_as);
                let recall = ratio(hits, support);
                let f1 = if precision + recall == 0.0 {
                    0.0
                } else {
                    2.0 * precision * recall / (precision + recall)
                };
                ClassMetrics {
                    class: c,
                    precision,
                    recall,
                    f1,
                    support,
                    abstained: self.abstained[c],
                }
            })
            .collect()
    }

    /// Return the predicted-row counts, indexed `[true][predicted]`.
    #[must_use]
    pub fn as_rows(&self) -> &[Vec<usize>] {
        &self.predicted
    }

    /// Return the abstentions recorded for `true_class`.
    #[must_use]
    pub fn abstained(&self, true_class: usize) -> usize {
        self.abstained[true_class]
    }

    /// Return the number of classes.
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.abstained.len()
    }

    /// Return the number of rows that received a prediction.
    #[must_use]
    pub fn n_predicted(&self) -> usize {
        self.predicted.iter().flatten().sum()
    }

    /// Return the number of rows that received no prediction.
    #[must_use]
    pub fn n_abstained(&self) -> usize {
        self.abstained.iter().sum()
    }

    /// Return the number of recorded rows.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.n_predicted() + self.n_abstained()
    }
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>8}", "")?;
        for p in 0..self.n_classes() {
            write!(f, " pred_{p:>3}")?;
        }
        writeln!(f, " {:>8}", "none")?;

        for (t, row) in self.predicted.iter().enumerate() {
            write!(f, "true_{t:>3}")?;
            for count in row {
                write!(f, " {count:>8}")?;
            }
            writeln!(f, " {:>8}", self.abstained[t])?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(n_classes: usize, outcomes: &[(usize, Option<usize>)]) -> ConfusionMatrix {
        let mut cm = ConfusionMatrix::new(n_classes);
        for &(truth, prediction) in outcomes {
            cm.record(truth, prediction);
        }
        cm
    }

    #[test]
    fn perfect_predictions() {
        let cm = matrix(3, &[(0, Some(0)), (1, Some(1)), (2, Some(2)), (2, Some(2))]);
        assert!((cm.accuracy() - 1.0).abs() < f64::EPSILON);
        for m in cm.class_metrics() {
            assert!((m.precision - 1.0).abs() < f64::EPSILON);
            assert!((m.recall - 1.0).abs() < f64::EPSILON);
            assert!((m.f1 - 1.0).abs() < f64::EPSILON);
            assert_eq!(m.abstained, 0);
        }
    }

    #[test]
    fn mixed_outcomes() {
        // Class 0: 2 hits, 1 predicted as 1. Class 1: 1 hit, 2 abstentions.
        let cm = matrix(
            2,
            &[
                (0, Some(0)),
                (0, Some(0)),
                (0, Some(1)),
                (1, Some(1)),
                (1, None),
                (1, None),
            ],
        );
        assert_eq!(cm.as_rows(), &[vec![2, 1], vec![0, 1]]);
        assert_eq!(cm.n_predicted(), 4);
        assert_eq!(cm.n_abstained(), 2);
        assert_eq!(cm.n_rows(), 6);
        assert!((cm.accuracy() - 0.5).abs() < 1e-12);

        let metrics = cm.class_metrics();
        assert_eq!(metrics[0].support, 3);
        assert!((metrics[0].precision - 1.0).abs() < 1e-12);
        assert!((metrics[0].recall - 2.0 / 3.0).abs() < 1e-12);

        assert_eq!(metrics[1].support, 3);
        assert_eq!(metrics[1].abstained, 2);
        assert!((metrics[1].precision - 0.5).abs() < 1e-12);
        assert!((metrics[1].recall - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn support_matches_true_class_counts() {
        let truths = [0, 1, 1, 2, 2, 2];
        let mut cm = ConfusionMatrix::new(3);
        for (i, &t) in truths.iter().enumerate() {
            cm.record(t, if i % 2 == 0 { None } else { Some(0) });
        }
        let support: Vec<usize> = cm.class_metrics().iter().map(|m| m.support).collect();
        assert_eq!(support, vec![1, 2, 3]);
        assert_eq!(cm.abstained(2), 2);
    }

    #[test]
    fn empty_matrix_has_zero_accuracy() {
        let cm = ConfusionMatrix::new(2);
        assert_eq!(cm.n_rows(), 0);
        assert!(cm.accuracy().abs() < f64::EPSILON);
    }

    #[test]
    fn all_abstentions() {
        let cm = matrix(2, &[(0, None), (1, None), (1, None)]);
        assert!(cm.accuracy().abs() < f64::EPSILON);
        let metrics = cm.class_metrics();
        assert_eq!(metrics[1].support, 2);
        assert!(metrics[1].precision.abs() < f64::EPSILON);
        assert!(metrics[1].recall.abs() < f64::EPSILON);
        assert!(metrics[1].f1.abs() < f64::EPSILON);
    }

    #[test]
    fn display_has_abstention_column() {
        let cm = matrix(2, &[(0, Some(0)), (1, None)]);
        assert_eq!(
            cm.to_string(),
            "         pred_  0 pred_  1     none\n\
             true_  0        1        0        0\n\
             true_  1        0        0        1\n"
        );
    }
}
