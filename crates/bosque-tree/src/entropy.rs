//! Shannon entropy of label distributions, in bits.

use crate::dataset::Dataset;

/// Entropy `−Σ (c/n)·log2(c/n)` of a class histogram.
///
/// Zero counts contribute nothing and `n == 0` yields 0.
#[must_use]
pub fn entropy_from_counts(counts: &[usize], n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let n = n as f64;
    -counts
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f64 / n;
            p * p.log2()
        })
        .sum::<f64>()
}

/// Label entropy of a non-empty row set.
#[must_use]
pub fn class_entropy(dataset: &Dataset, rows: &[usize]) -> f64 {
    debug_assert!(!rows.is_empty(), "class entropy of an empty row set");
    entropy_from_counts(&dataset.class_counts(rows), rows.len())
}

/// Label entropy of one partition of a split (rows sharing an attribute value).
///
/// An empty partition has entropy 0.
#[must_use]
pub fn conditional_entropy(dataset: &Dataset, partition: &[usize]) -> f64 {
    if partition.is_empty() {
        return 0.0;
    }
    entropy_from_counts(&dataset.class_counts(partition), partition.len())
}
