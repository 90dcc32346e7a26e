//! Bootstrap ensemble training.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, instrument};

use crate::config::RandomForestConfig;
use crate::dataset::Dataset;
use crate::error::TreeError;
use crate::tree::{DecisionTree, DecisionTreeConfig};

/// A fitted ensemble of decision trees voting by simple majority.
#[derive(Debug, Clone)]
pub struct RandomForest {
    pub(crate) trees: Vec<DecisionTree>,
    pub(crate) classes: Vec<String>,
}

/// Draw `round(|rows| * fraction)` rows (at least one) uniformly with replacement.
#[must_use]
pub fn bootstrap_sample(rows: &[usize], fraction: f64, rng: &mut impl Rng) -> Vec<usize> {
    if rows.is_empty() {
        return Vec::new();
    }
    let draw_count = ((rows.len() as f64 * fraction).round() as usize).max(1);
    (0..draw_count)
        .map(|_| rows[rng.gen_range(0..rows.len())])
        .collect()
}

/// Train the ensemble: one tree per bootstrap sample, built in sequence.
#[instrument(skip_all, fields(n_trees = config.n_trees, n_rows = rows.len()))]
pub(crate) fn train(
    config: &RandomForestConfig,
    dataset: &Dataset,
    rows: &[usize],
) -> Result<RandomForest, TreeError> {
    if rows.is_empty() {
        return Err(TreeError::EmptyDataset);
    }
    dataset.check_rows(rows)?;

    let n_attributes = dataset.candidate_attributes().len();
    let max_features = config.max_features.resolve(n_attributes)?;

    // Written as a negated range so NaN is rejected too.
    if !(config.bootstrap_fraction > 0.0 && config.bootstrap_fraction <= 1.0) {
        return Err(TreeError::InvalidBootstrapFraction {
            fraction: config.bootstrap_fraction,
        });
    }

    info!(
        n_trees = config.n_trees,
        n_rows = rows.len(),
        n_attributes,
        n_classes = dataset.n_classes(),
        max_features,
        bootstrap_fraction = config.bootstrap_fraction,
        "training ensemble"
    );

    let mut master_rng = ChaCha8Rng::seed_from_u64(config.seed);
    let mut trees = Vec::with_capacity(config.n_trees);
    for tree_index in 0..config.n_trees {
        let mut rng = ChaCha8Rng::seed_from_u64(master_rng.r#gen());
        let sample = bootstrap_sample(rows, config.bootstrap_fraction, &mut rng);

        let tree = DecisionTreeConfig::new()
            .with_max_features(Some(max_features))
            .with_max_depth(config.max_depth)
            .with_min_samples_split(config.min_samples_split)
            .with_seed(rng.r#gen())
            .fit_rows(dataset, &sample)?;

        debug!(
            tree_index,
            n_sampled = sample.len(),
            n_nodes = tree.n_nodes(),
            depth = tree.depth(),
            "tree trained"
        );
        trees.push(tree);
    }

    Ok(RandomForest {
        trees,
        classes: dataset.classes().to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MaxFeatures;

    /// Three well-separated classes on `x`, plus a constant-ish noise column.
    fn make_separable_data() -> Dataset {
        let mut records = Vec::new();
        for (class, base) in [("a", 0.0), ("b", 10.0), ("c", 20.0)] {
            for i in 0..20 {
                let x = base + i as f64 * 0.15;
                let noise = if i % 2 == 0 { "odd" } else { "even" };
                records.push(vec![x.to_string(), noise.to_string(), class.to_string()]);
            }
        }
        let header = vec!["x".to_string(), "noise".to_string(), "y".to_string()];
        Dataset::from_records(header, records, "y").unwrap()
    }

    fn training_accuracy(forest: &RandomForest, dataset: &Dataset) -> f64 {
        let rows: Vec<usize> = (0..dataset.n_rows()).collect();
        let correct = forest
            .predict_batch(dataset, &rows)
            .iter()
            .zip(&rows)
            .filter(|&(p, &r)| *p == Some(dataset.class_of(r)))
            .count();
        correct as f64 / rows.len() as f64
    }

    #[test]
    fn bootstrap_draw_count_and_membership() {
        let rows: Vec<usize> = (100..200).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let sample = bootstrap_sample(&rows, 0.632, &mut rng);
        assert_eq!(sample.len(), 63);
        assert!(sample.iter().all(|r| (100..200).contains(r)));
    }

    #[test]
    fn bootstrap_draws_with_replacement() {
        let rows: Vec<usize> = (0..50).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut sample = bootstrap_sample(&rows, 1.0, &mut rng);
        assert_eq!(sample.len(), 50);
        sample.sort_unstable();
        sample.dedup();
        // 50 draws from 50 rows repeat with near certainty.
        assert!(sample.len() < 50);
    }

    #[test]
    fn bootstrap_small_input_draws_one() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert_eq!(bootstrap_sample(&[9], 0.1, &mut rng), vec![9]);
        assert!(bootstrap_sample(&[], 0.5, &mut rng).is_empty());
    }

    #[test]
    fn three_class_separable_accuracy() {
        let ds = make_separable_data();
        let forest = RandomForestConfig::new(25)
            .unwrap()
            .with_max_features(MaxFeatures::All)
            .fit(&ds)
            .unwrap();
        assert_eq!(forest.n_trees(), 25);
        let accuracy = training_accuracy(&forest, &ds);
        assert!(accuracy > 0.9, "accuracy = {accuracy}");
    }

    #[test]
    fn deterministic_with_same_seed() {
        let ds = make_separable_data();
        let rows: Vec<usize> = (0..ds.n_rows()).collect();
        let config = RandomForestConfig::new(10).unwrap().with_seed(99);
        let p1 = config.fit(&ds).unwrap().predict_batch(&ds, &rows);
        let p2 = config.fit(&ds).unwrap().predict_batch(&ds, &rows);
        assert_eq!(p1, p2);
    }

    #[test]
    fn invalid_bootstrap_fraction() {
        let ds = make_separable_data();
        for fraction in [0.0, -0.5, 1.5, f64::NAN, f64::INFINITY] {
            let err = RandomForestConfig::new(2)
                .unwrap()
                .with_bootstrap_fraction(fraction)
                .fit(&ds)
                .unwrap_err();
            assert!(matches!(err, TreeError::InvalidBootstrapFraction { .. }));
        }
    }

    #[test]
    fn empty_rows_error() {
        let ds = make_separable_data();
        let err = RandomForestConfig::new(2).unwrap().fit_rows(&ds, &[]).unwrap_err();
        assert!(matches!(err, TreeError::EmptyDataset));
    }
}
